use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use void_errors::{VoidError, VoidResult};

/// 长轮询等待上限（秒），与 SQS 的限制一致
pub const MAX_WAIT_SECONDS: u64 = 20;

/// 校验长轮询等待时间
pub fn validate_wait_seconds(wait_seconds: u64) -> VoidResult<u64> {
    if wait_seconds > MAX_WAIT_SECONDS {
        return Err(VoidError::validation_error(format!(
            "wait_seconds must be between 0 and {MAX_WAIT_SECONDS}, got {wait_seconds}"
        )));
    }
    Ok(wait_seconds)
}

/// 消息体：能解析为 JSON 就按 JSON 处理，否则保留原始字符串
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Json(Value),
    Raw(String),
}

impl MessageBody {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => MessageBody::Json(value),
            Err(_) => MessageBody::Raw(raw.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            MessageBody::Json(value) => Some(value),
            MessageBody::Raw(_) => None,
        }
    }
}

/// 从队列取出的一条消息
///
/// `receipt_handle` 只对本次投递有效，用于删除（确认）消息。
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: MessageBody,
    pub receipt_handle: String,
    pub message_id: String,
    pub attributes: HashMap<String, String>,
    pub message_attributes: HashMap<String, String>,
}

/// 任务消息的线上格式：`{"task_type": ..., "data": {...}, "metadata": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_type: String,
    #[serde(default = "empty_object")]
    pub data: Value,
    #[serde(default = "empty_object")]
    pub metadata: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl TaskPayload {
    pub fn new(task_type: impl Into<String>, data: Value) -> Self {
        Self {
            task_type: task_type.into(),
            data,
            metadata: empty_object(),
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// 从消息体提取路由键、数据和元数据
    ///
    /// 缺少 `task_type` 或消息体不是 JSON 对象时返回 `VoidError::Routing`；
    /// `data`/`metadata` 缺失或为 null 时补成空对象。
    pub fn from_body(body: &MessageBody) -> VoidResult<Self> {
        let object = match body {
            MessageBody::Json(Value::Object(object)) => object,
            MessageBody::Json(other) => {
                return Err(VoidError::routing_error(format!(
                    "Message body is not a task envelope: {other}"
                )))
            }
            MessageBody::Raw(raw) => {
                return Err(VoidError::routing_error(format!(
                    "Message body is not valid JSON: {raw}"
                )))
            }
        };

        let task_type = object
            .get("task_type")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| VoidError::routing_error("Message is missing 'task_type'"))?;

        let field = |key: &str| match object.get(key) {
            None | Some(Value::Null) => empty_object(),
            Some(value) => value.clone(),
        };

        Ok(Self {
            task_type: task_type.to_string(),
            data: field("data"),
            metadata: field("metadata"),
        })
    }

    pub fn to_body(&self) -> VoidResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 消息队列端口
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 拉取至多一条消息，最多阻塞 `wait_seconds`（0..=20）；超时返回 `None`
    async fn receive(&self, wait_seconds: u64) -> VoidResult<Option<QueueMessage>>;

    /// 确认并永久删除消息；无效或过期的 handle 返回传输错误
    async fn delete(&self, receipt_handle: &str) -> VoidResult<()>;

    /// 发送到 FIFO 队列，每次调用生成新的去重 id；返回消息 id
    async fn send(
        &self,
        body: &str,
        group_id: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> VoidResult<String>;

    /// 近似的可见消息数
    async fn get_queue_depth(&self) -> VoidResult<u64>;
}
