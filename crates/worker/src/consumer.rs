use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};
use void_config::SqsConfig;
use void_domain::{validate_wait_seconds, MessageQueue, QueueMessage};
use void_errors::{VoidError, VoidResult};

use crate::dispatcher::TaskDispatcher;

/// 消费循环状态：`Stopped → Running → Stopping → Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Stopped,
    Running,
    Stopping,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConsumerState::Stopped => "stopped",
            ConsumerState::Running => "running",
            ConsumerState::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// 长轮询等待时间（秒），0..=20
    pub wait_time_seconds: u64,
    /// 仅用于日志与统计
    pub queue_url: String,
}

impl From<&SqsConfig> for ConsumerConfig {
    fn from(sqs: &SqsConfig) -> Self {
        Self {
            wait_time_seconds: sqs.wait_time_seconds,
            queue_url: sqs.queue_url.clone(),
        }
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            wait_time_seconds: 20,
            queue_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queue_url: String,
    pub approximate_depth: u64,
}

/// 单消费者循环：拉取 → 分派 → 删除，一次只处理一条消息
///
/// 每条收到的消息无论处理结果如何都恰好删除一次，不做重试。
/// 停止信号只在两次迭代之间生效，不会中断正在处理的消息。
pub struct QueueConsumer {
    queue: Arc<dyn MessageQueue>,
    dispatcher: TaskDispatcher,
    config: ConsumerConfig,
    state: Arc<RwLock<ConsumerState>>,
    shutdown_tx: watch::Sender<bool>,
}

impl QueueConsumer {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        dispatcher: TaskDispatcher,
        config: ConsumerConfig,
    ) -> VoidResult<Self> {
        validate_wait_seconds(config.wait_time_seconds)?;
        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            queue,
            dispatcher,
            config,
            state: Arc::new(RwLock::new(ConsumerState::Stopped)),
            shutdown_tx,
        })
    }

    pub async fn state(&self) -> ConsumerState {
        *self.state.read().await
    }

    /// 运行消费循环，直到 `stop()` 被调用或拉取消息失败
    ///
    /// 拉取失败是致命错误，直接返回给调用方；单条消息的处理失败只记录日志。
    pub async fn start(&self) -> VoidResult<()> {
        {
            let mut state = self.state.write().await;
            if *state != ConsumerState::Stopped {
                return Err(VoidError::internal(format!(
                    "Consumer cannot start while {}",
                    *state
                )));
            }
            *state = ConsumerState::Running;
        }
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(
            "开始消费队列 {} (wait_time_seconds={}, tasks=[{}])",
            self.display_url(),
            self.config.wait_time_seconds,
            self.dispatcher.registry().list().join(", ")
        );

        let result = loop {
            if *shutdown_rx.borrow_and_update() {
                break Ok(());
            }

            let received = tokio::select! {
                biased;
                _ = shutdown_rx.changed() => continue,
                received = self.queue.receive(self.config.wait_time_seconds) => received,
            };

            match received {
                Ok(Some(message)) => self.process_message(message).await,
                Ok(None) => debug!("No message received"),
                Err(e) => {
                    error!("拉取消息失败，停止消费: {}", e);
                    break Err(e);
                }
            }
        };

        *self.state.write().await = ConsumerState::Stopped;
        // 复位，允许再次 start
        self.shutdown_tx.send_replace(false);
        info!("Consumer stopped");
        result
    }

    /// 请求停止；当前消息处理完后循环退出。在 `start` 之前调用时，`start` 立即返回。
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if *state == ConsumerState::Running {
            *state = ConsumerState::Stopping;
            info!("Consumer stopping");
        }
        self.shutdown_tx.send_replace(true);
    }

    /// 拉取并处理至多一条消息，返回是否处理了消息
    pub async fn run_once(&self) -> VoidResult<bool> {
        match self.queue.receive(self.config.wait_time_seconds).await? {
            Some(message) => {
                self.process_message(message).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 分派一条消息，然后无条件删除一次
    ///
    /// 处理器在独立任务中运行，panic 只会终结该任务，删除照常执行。
    async fn process_message(&self, message: QueueMessage) {
        let dispatcher = self.dispatcher.clone();
        let task_message = message.clone();
        let outcome = tokio::spawn(async move { dispatcher.dispatch(&task_message).await })
            .await
            .unwrap_or_else(|e| {
                let err = if e.is_panic() {
                    VoidError::internal(format!("Task handler panicked: {e}"))
                } else {
                    VoidError::internal(format!("Task handler was cancelled: {e}"))
                };
                error!(message_id = %message.message_id, "任务处理异常终止: {}", err);
                Err(err)
            });

        if let Err(e) = outcome {
            debug!(message_id = %message.message_id, "Dispatch failed, dropping message: {}", e);
        }

        if let Err(e) = self.queue.delete(&message.receipt_handle).await {
            warn!(message_id = %message.message_id, "删除消息失败: {}", e);
        }
    }

    pub async fn queue_stats(&self) -> VoidResult<QueueStats> {
        Ok(QueueStats {
            queue_url: self.config.queue_url.clone(),
            approximate_depth: self.queue.get_queue_depth().await?,
        })
    }

    fn display_url(&self) -> &str {
        if self.config.queue_url.is_empty() {
            "<in-memory>"
        } else {
            &self.config.queue_url
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_registry::new_task_registry;
    use void_testing_utils::ScriptedQueue;

    fn consumer(queue: Arc<ScriptedQueue>, wait_time_seconds: u64) -> VoidResult<QueueConsumer> {
        QueueConsumer::new(
            queue,
            TaskDispatcher::new(Arc::new(new_task_registry())),
            ConsumerConfig {
                wait_time_seconds,
                queue_url: "https://sqs.example/q.fifo".to_string(),
            },
        )
    }

    #[test]
    fn test_wait_time_validated() {
        let queue = Arc::new(ScriptedQueue::default());
        assert!(matches!(
            consumer(queue, 21),
            Err(VoidError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_initial_state_and_stats() {
        let queue = Arc::new(ScriptedQueue::default());
        let consumer = consumer(queue, 0).unwrap();
        assert_eq!(consumer.state().await, ConsumerState::Stopped);

        let stats = consumer.queue_stats().await.unwrap();
        assert_eq!(stats.approximate_depth, 0);
        assert_eq!(stats.queue_url, "https://sqs.example/q.fifo");
    }

    #[test]
    fn test_config_from_sqs() {
        let sqs = SqsConfig::default();
        let config = ConsumerConfig::from(&sqs);
        assert_eq!(config.wait_time_seconds, sqs.wait_time_seconds);
    }
}
