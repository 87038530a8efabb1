//! Test data builders for creating test entities

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use void_domain::{ItemEntity, ItemStatus, MessageBody, QueueMessage, TaskPayload};

/// Builder for creating test Item entities
pub struct ItemBuilder {
    id: Option<String>,
    name: String,
    description: String,
    status: ItemStatus,
    created_at: DateTime<Utc>,
    metadata: Option<Map<String, Value>>,
}

impl ItemBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: "test_item".to_string(),
            description: "test description".to_string(),
            status: ItemStatus::Active,
            created_at: Utc::now(),
            metadata: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata.as_object().cloned();
        self
    }

    pub fn build(self) -> ItemEntity {
        let entity = ItemEntity::new(self.name, self.description, self.status, self.created_at)
            .expect("ItemBuilder produced an invalid item")
            .with_metadata(self.metadata);
        match self.id {
            Some(id) => entity.with_id(id),
            None => entity,
        }
    }
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for queue envelopes as a consumer would receive them
pub struct QueueMessageBuilder {
    message: QueueMessage,
}

impl QueueMessageBuilder {
    pub fn new(receipt_handle: &str) -> Self {
        Self {
            message: QueueMessage {
                body: MessageBody::Json(Value::Object(Map::new())),
                receipt_handle: receipt_handle.to_string(),
                message_id: format!("msg-{receipt_handle}"),
                attributes: HashMap::new(),
                message_attributes: HashMap::new(),
            },
        }
    }

    /// Body in the task wire format
    pub fn with_task(mut self, task_type: &str, data: Value) -> Self {
        let body = serde_json::to_value(TaskPayload::new(task_type, data))
            .expect("task payload serializes");
        self.message.body = MessageBody::Json(body);
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.message.body = MessageBody::Json(body);
        self
    }

    pub fn with_raw(mut self, body: &str) -> Self {
        self.message.body = MessageBody::Raw(body.to_string());
        self
    }

    pub fn with_message_attribute(mut self, key: &str, value: &str) -> Self {
        self.message
            .message_attributes
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> QueueMessage {
        self.message
    }
}

/// Shorthand for a task envelope
pub fn task_message(receipt_handle: &str, task_type: &str, data: Value) -> QueueMessage {
    QueueMessageBuilder::new(receipt_handle)
        .with_task(task_type, data)
        .build()
}
