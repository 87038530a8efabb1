use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use void_errors::{VoidError, VoidResult};

/// Item 状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Draft,
    #[default]
    Active,
    Archived,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Draft => "draft",
            ItemStatus::Active => "active",
            ItemStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = VoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ItemStatus::Draft),
            "active" => Ok(ItemStatus::Active),
            "archived" => Ok(ItemStatus::Archived),
            other => Err(VoidError::validation_error(format!(
                "Invalid status: {other}. Valid values: draft, active, archived"
            ))),
        }
    }
}

/// 示例领域实体
///
/// 所有构造路径都会校验；相等性只比较 id，两个都没有 id 的实体永不相等。
#[derive(Debug, Clone, Serialize)]
pub struct ItemEntity {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub metadata: Option<Map<String, Value>>,
}

impl ItemEntity {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        status: ItemStatus,
        created_at: DateTime<Utc>,
    ) -> VoidResult<Self> {
        let entity = Self {
            id: None,
            name: name.into(),
            description: description.into(),
            status,
            created_at,
            updated_at: None,
            metadata: None,
        };
        entity.validate()?;
        Ok(entity)
    }

    /// 新建实体：描述默认为空串，状态默认 active，创建时间取当前 UTC
    pub fn create(
        name: impl Into<String>,
        description: Option<String>,
        status: Option<ItemStatus>,
        metadata: Option<Map<String, Value>>,
    ) -> VoidResult<Self> {
        let entity = Self::new(
            name,
            description.unwrap_or_default(),
            status.unwrap_or_default(),
            Utc::now(),
        )?;
        Ok(entity.with_metadata(metadata))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_updated_at(mut self, updated_at: Option<DateTime<Utc>>) -> Self {
        self.updated_at = updated_at;
        self
    }

    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn validate(&self) -> VoidResult<()> {
        if self.name.trim().is_empty() {
            return Err(VoidError::validation_error(
                "Name must be a non-empty string",
            ));
        }
        if let Some(updated_at) = self.updated_at {
            if updated_at < self.created_at {
                return Err(VoidError::validation_error(
                    "updated_at must not be earlier than created_at",
                ));
            }
        }
        Ok(())
    }
}

impl PartialEq for ItemEntity {
    fn eq(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
