use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use void_domain::{ItemEntity, ItemStatus};
use void_errors::{VoidError, VoidResult};

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// 创建 Item 请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl CreateItemRequest {
    pub fn validate(&self) -> VoidResult<()> {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > NAME_MAX_LEN {
            return Err(VoidError::validation_error(format!(
                "name must be between 1 and {NAME_MAX_LEN} characters"
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                return Err(VoidError::validation_error(format!(
                    "description must be at most {DESCRIPTION_MAX_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Map<String, Value>>,
}

impl From<ItemEntity> for ItemResponse {
    fn from(entity: ItemEntity) -> Self {
        Self {
            id: entity.id.unwrap_or_default(),
            name: entity.name,
            description: entity.description,
            status: entity.status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            metadata: entity.metadata,
        }
    }
}
