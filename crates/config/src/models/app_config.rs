use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    database::DatabaseConfig,
    message_queue::{AwsConfig, SqsConfig},
};
use crate::validation::{ConfigValidator, ValidationUtils};
use crate::ConfigError;

/// 环境变量前缀，嵌套字段用双下划线分隔，例如 `VOID_DATABASE__URI`
pub const ENV_PREFIX: &str = "VOID";

/// 应用元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInfoConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    pub contact_name: String,
    pub contact_email: String,
    pub environment: String,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            name: "VOID".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "VOID API, worker and CLI template".to_string(),
            contact_name: "VOID Team".to_string(),
            contact_email: "void@example.com".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl ConfigValidator for AppInfoConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.name, "app.name")?;
        ValidationUtils::validate_not_empty(&self.environment, "app.environment")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppInfoConfig,
    pub database: DatabaseConfig,
    pub aws: AwsConfig,
    pub sqs: SqsConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 加载顺序：内置默认值 → TOML 文件 → `VOID_` 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(ConfigError::File(format!("配置文件不存在: {path}")).into());
            }
        } else {
            let default_paths = ["config/void.toml", "void.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("api.cors_origins")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Configuration(e.to_string()))
            .context("加载配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn is_development(&self) -> bool {
        self.app.environment.eq_ignore_ascii_case("development")
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.app.validate()?;
        self.database.validate()?;
        self.aws.validate()?;
        self.sqs.validate()?;
        self.api.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}
