//! 领域仓储抽象
//!
//! 仓储实例在构造时绑定到一个事务会话（或不绑定，用于只读查询），
//! 所有操作都在该会话上执行。

use async_trait::async_trait;
use crate::entities::ItemEntity;
use void_errors::VoidResult;

/// Item 仓储抽象
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// 持久化实体，返回存储分配的 id
    async fn create(&self, entity: &ItemEntity) -> VoidResult<String>;

    /// 按 id 查询
    ///
    /// 格式非法的 id 返回 `Ok(None)` 而不是错误；
    /// 存储的文档缺少必填字段时返回 `VoidError::Validation`。
    async fn get_by_id(&self, id: &str) -> VoidResult<Option<ItemEntity>>;
}
