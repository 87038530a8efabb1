use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;
use void_domain::{
    with_unit_of_work, ItemEntity, ItemRepository, ItemStatus, UnitOfWorkFactory,
};
use void_errors::{VoidError, VoidResult};

/// Item 应用服务
///
/// 写操作走工作单元；读操作使用不绑定会话的仓储。
#[derive(Clone)]
pub struct ItemService {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    reader: Arc<dyn ItemRepository>,
}

impl ItemService {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, reader: Arc<dyn ItemRepository>) -> Self {
        Self {
            uow_factory,
            reader,
        }
    }

    /// 创建 Item 并提交，返回新 id
    pub async fn create_item(
        &self,
        name: &str,
        description: Option<String>,
        status: ItemStatus,
        metadata: Option<Map<String, Value>>,
    ) -> VoidResult<String> {
        let entity = ItemEntity::create(name, description, Some(status), metadata)?;

        let id = with_unit_of_work(self.uow_factory.as_ref(), |uow| {
            Box::pin(async move {
                let id = uow.items().create(&entity).await?;
                uow.commit().await?;
                Ok(id)
            })
        })
        .await?;

        info!(item_id = %id, "Item created");
        Ok(id)
    }

    pub async fn get_item(&self, id: &str) -> VoidResult<ItemEntity> {
        self.reader
            .get_by_id(id)
            .await?
            .ok_or_else(|| VoidError::not_found(format!("Item {id} not found")))
    }
}
