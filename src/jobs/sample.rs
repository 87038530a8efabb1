use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use void_application::ItemService;
use void_errors::VoidResult;

use super::{required_arg, JobArgs, JobContext, JobHandler, JobRegistry};

pub const PROCESS_ITEM: &str = "process_item";

/// 查询一个 Item 并记录其名称和状态
///
/// 参数：`item_id`
pub struct ProcessItemJob {
    item_service: ItemService,
}

impl ProcessItemJob {
    pub fn new(item_service: ItemService) -> Self {
        Self { item_service }
    }
}

#[async_trait]
impl JobHandler for ProcessItemJob {
    async fn run(&self, args: &JobArgs) -> VoidResult<()> {
        let item_id = required_arg(args, "item_id")?;
        let item = self.item_service.get_item(item_id).await?;
        info!(item_id, "Item '{}' has status {}", item.name, item.status);
        Ok(())
    }
}

pub fn register(registry: &mut JobRegistry, ctx: &JobContext) -> VoidResult<()> {
    registry.register(
        PROCESS_ITEM,
        Arc::new(ProcessItemJob::new(ctx.item_service.clone())),
    )
}
