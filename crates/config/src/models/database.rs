use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// MongoDB 连接配置
///
/// 事务依赖副本集，`uri` 通常需要带 `replicaSet` 参数。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub max_idle_time_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0".to_string(),
            name: "void".to_string(),
            max_pool_size: 50,
            min_pool_size: 10,
            max_idle_time_ms: 60_000,
        }
    }
}

impl ConfigValidator for DatabaseConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_url(&self.uri, &["mongodb", "mongodb+srv"], "database.uri")?;
        ValidationUtils::validate_not_empty(&self.name, "database.name")?;
        ValidationUtils::validate_count(self.max_pool_size as usize, "database.max_pool_size")?;

        if self.min_pool_size > self.max_pool_size {
            return Err(crate::ConfigError::Validation(
                "database.min_pool_size must be less than or equal to max_pool_size".to_string(),
            ));
        }

        Ok(())
    }
}
