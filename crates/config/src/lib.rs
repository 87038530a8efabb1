pub mod models;
pub mod validation;

pub use models::{
    ApiConfig, AppConfig, AppInfoConfig, AwsConfig, DatabaseConfig, LogLevel,
    ObservabilityConfig, OutputFormat, SqsConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 配置加载与校验错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 字段取值不合法，消息中带字段路径，例如 `sqs.wait_time_seconds`
    #[error("配置校验失败: {0}")]
    Validation(String),

    #[error("配置文件错误: {0}")]
    File(String),

    #[error("配置解析错误: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
