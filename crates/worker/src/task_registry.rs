use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use void_application::Registry;
use void_errors::VoidResult;

/// 队列任务处理器
///
/// 只接收消息中的 `data` 部分，不会看到 `task_type` 或 `metadata`。
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, data: Value) -> VoidResult<()>;
}

/// 任务名 → 处理器
pub type TaskRegistry = Registry<dyn TaskHandler>;

pub fn new_task_registry() -> TaskRegistry {
    Registry::new("Task handler")
}

/// 用闭包实现的处理器
pub struct FnTaskHandler<F> {
    func: F,
}

#[async_trait]
impl<F> TaskHandler for FnTaskHandler<F>
where
    F: Fn(Value) -> BoxFuture<'static, VoidResult<()>> + Send + Sync,
{
    async fn handle(&self, data: Value) -> VoidResult<()> {
        (self.func)(data).await
    }
}

/// 把异步闭包包装成 [`TaskHandler`]
pub fn task_fn<F>(func: F) -> Arc<dyn TaskHandler>
where
    F: Fn(Value) -> BoxFuture<'static, VoidResult<()>> + Send + Sync + 'static,
{
    Arc::new(FnTaskHandler { func })
}
