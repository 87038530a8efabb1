use std::sync::Arc;

use tracing::{debug, error, info, Instrument};
use void_domain::{QueueMessage, TaskPayload};
use void_errors::{VoidError, VoidResult};

use crate::task_registry::TaskRegistry;

/// 把队列消息路由到已注册的任务处理器
///
/// 只负责 解析 → 路由 → 处理；确认（删除）消息由消费循环负责。
#[derive(Clone)]
pub struct TaskDispatcher {
    registry: Arc<TaskRegistry>,
}

impl TaskDispatcher {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// 处理一条消息，返回处理结果；失败时已记录完整上下文
    pub async fn dispatch(&self, message: &QueueMessage) -> VoidResult<()> {
        let payload = match TaskPayload::from_body(&message.body) {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    message_id = %message.message_id,
                    "无法解析任务消息: {} body={:?}", e, message.body
                );
                return Err(e);
            }
        };

        let Some(handler) = self.registry.get(&payload.task_type) else {
            let err = VoidError::routing_error(format!(
                "Unknown task name: {}. Registered tasks: [{}]",
                payload.task_type,
                self.registry.list().join(", ")
            ));
            error!(message_id = %message.message_id, "{}", err);
            return Err(err);
        };

        let span = tracing::info_span!(
            "task",
            task_type = %payload.task_type,
            message_id = %message.message_id
        );
        debug!(parent: &span, "Dispatching task");

        let data_for_log = payload.data.to_string();
        match handler.handle(payload.data).instrument(span.clone()).await {
            Ok(()) => {
                info!(parent: &span, "Task completed");
                Ok(())
            }
            Err(e) => {
                error!(
                    parent: &span,
                    "任务 {} 执行失败: {} data={} metadata={}",
                    payload.task_type, e, data_for_log, payload.metadata
                );
                Err(e)
            }
        }
    }
}
