use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;
use void_application::ItemService;
use void_domain::ItemStatus;
use void_errors::{VoidError, VoidResult};

use crate::dependencies::WorkerDependencies;
use crate::task_registry::{TaskHandler, TaskRegistry};

pub const PROCESS_ITEM: &str = "process_item";

/// 根据消息数据创建一个 Item
///
/// `data`: `{"name": str?, "description": str?, "metadata": object?}`
pub struct ProcessItemTask {
    item_service: ItemService,
}

impl ProcessItemTask {
    pub fn new(item_service: ItemService) -> Self {
        Self { item_service }
    }
}

fn optional_str<'a>(data: &'a Value, key: &str) -> VoidResult<Option<&'a str>> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(VoidError::validation_error(format!(
            "Field '{key}' must be a string, got {other}"
        ))),
    }
}

#[async_trait]
impl TaskHandler for ProcessItemTask {
    async fn handle(&self, data: Value) -> VoidResult<()> {
        let name = optional_str(&data, "name")?.unwrap_or("Unnamed Item");
        let description = optional_str(&data, "description")?.map(str::to_string);

        let mut metadata = match data.get("metadata") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(VoidError::validation_error(format!(
                    "Field 'metadata' must be an object, got {other}"
                )))
            }
        };
        metadata.insert("created_by".to_string(), Value::from("worker"));
        metadata.insert("task_type".to_string(), Value::from(PROCESS_ITEM));

        let id = self
            .item_service
            .create_item(name, description, ItemStatus::Active, Some(metadata))
            .await?;
        info!(item_id = %id, "Processed item '{}'", name);
        Ok(())
    }
}

pub fn register(registry: &mut TaskRegistry, deps: &WorkerDependencies) -> VoidResult<()> {
    registry.register(
        PROCESS_ITEM,
        Arc::new(ProcessItemTask::new(deps.item_service().clone())),
    )
}
