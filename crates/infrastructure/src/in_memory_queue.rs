use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;
use void_domain::{validate_wait_seconds, MessageBody, MessageQueue, QueueMessage};
use void_errors::{VoidError, VoidResult};

/// 内存消息队列实现
///
/// 进程内的 FIFO 队列，语义与 SQS FIFO 队列对齐：
/// 接收时长轮询、每次投递生成新的 receipt handle、同一消息组在有消息
/// 处于处理中时不会投递下一条。用于本地运行和测试。
#[derive(Debug)]
pub struct InMemoryMessageQueue {
    state: Mutex<QueueState>,
    /// 有新消息可见时唤醒等待中的接收者
    notify: Notify,
    config: InMemoryQueueConfig,
}

#[derive(Debug, Clone)]
pub struct InMemoryQueueConfig {
    /// 队列最大容量（0表示无限制）
    pub max_queue_size: usize,
}

impl Default for InMemoryQueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 10000, // 默认最大10000条消息
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<StoredMessage>,
    /// receipt handle -> 处理中的消息
    in_flight: HashMap<String, StoredMessage>,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
    group_id: String,
    attributes: HashMap<String, String>,
    sent_at_ms: i64,
    receive_count: u32,
}

impl QueueState {
    /// 取出第一条所在消息组没有处理中消息的可见消息
    fn take_next(&mut self) -> Option<QueueMessage> {
        let busy_groups: HashSet<&str> = self
            .in_flight
            .values()
            .map(|m| m.group_id.as_str())
            .collect();
        let index = self
            .visible
            .iter()
            .position(|m| !busy_groups.contains(m.group_id.as_str()))?;
        let mut stored = self.visible.remove(index)?;
        stored.receive_count += 1;

        let receipt_handle = Uuid::new_v4().to_string();
        let message = QueueMessage {
            body: MessageBody::parse(&stored.body),
            receipt_handle: receipt_handle.clone(),
            message_id: stored.message_id.clone(),
            attributes: HashMap::from([
                ("MessageGroupId".to_string(), stored.group_id.clone()),
                ("SentTimestamp".to_string(), stored.sent_at_ms.to_string()),
                (
                    "ApproximateReceiveCount".to_string(),
                    stored.receive_count.to_string(),
                ),
            ]),
            message_attributes: stored.attributes.clone(),
        };
        self.in_flight.insert(receipt_handle, stored);
        Some(message)
    }
}

impl InMemoryMessageQueue {
    /// 创建新的内存消息队列实例
    pub fn new() -> Self {
        Self::with_config(InMemoryQueueConfig::default())
    }

    /// 使用指定配置创建内存消息队列实例
    pub fn with_config(config: InMemoryQueueConfig) -> Self {
        info!("Creating in-memory message queue with config: {:?}", config);
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            config,
        }
    }

    /// 处理中（已投递未删除）的消息数
    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn receive(&self, wait_seconds: u64) -> VoidResult<Option<QueueMessage>> {
        let wait = validate_wait_seconds(wait_seconds)?;
        let deadline = Instant::now() + Duration::from_secs(wait);

        loop {
            // 先登记等待再检查队列，避免错过检查与等待之间的通知
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(message) = self.state.lock().await.take_next() {
                debug!(message_id = %message.message_id, "Received message");
                return Ok(Some(message));
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn delete(&self, receipt_handle: &str) -> VoidResult<()> {
        let removed = self.state.lock().await.in_flight.remove(receipt_handle);
        match removed {
            Some(message) => {
                debug!(message_id = %message.message_id, "Deleted message");
                // 同组的下一条消息现在可以投递
                self.notify.notify_waiters();
                Ok(())
            }
            None => {
                warn!("Delete with unknown receipt handle: {}", receipt_handle);
                Err(VoidError::queue_error(format!(
                    "ReceiptHandleIsInvalid: {receipt_handle}"
                )))
            }
        }
    }

    async fn send(
        &self,
        body: &str,
        group_id: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> VoidResult<String> {
        let message_id = Uuid::new_v4().to_string();
        {
            let mut state = self.state.lock().await;
            if self.config.max_queue_size > 0
                && state.visible.len() + state.in_flight.len() >= self.config.max_queue_size
            {
                return Err(VoidError::queue_error(format!(
                    "Queue is full ({} messages)",
                    self.config.max_queue_size
                )));
            }
            state.visible.push_back(StoredMessage {
                message_id: message_id.clone(),
                body: body.to_string(),
                group_id: group_id.to_string(),
                attributes: attributes.cloned().unwrap_or_default(),
                sent_at_ms: Utc::now().timestamp_millis(),
                receive_count: 0,
            });
        }
        self.notify.notify_waiters();
        debug!(message_id = %message_id, group_id, "Message sent");
        Ok(message_id)
    }

    async fn get_queue_depth(&self) -> VoidResult<u64> {
        Ok(self.state.lock().await.visible.len() as u64)
    }
}
