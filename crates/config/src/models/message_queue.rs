use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

/// AWS 凭证与区域
///
/// 未配置 access key 时交给 SDK 默认凭证链处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// 本地模拟器（如 LocalStack / ElasticMQ）地址
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "ap-northeast-2".to_string(),
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
        }
    }
}

impl AwsConfig {
    /// 同时配置了 key id 和 secret 才视为静态凭证
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

impl ConfigValidator for AwsConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.region, "aws.region")?;

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(crate::ConfigError::Validation(
                "aws.access_key_id and aws.secret_access_key must be set together".to_string(),
            ));
        }

        if let Some(endpoint) = &self.endpoint_url {
            ValidationUtils::validate_url(endpoint, &["http", "https"], "aws.endpoint_url")?;
        }

        Ok(())
    }
}

/// SQS FIFO 队列配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SqsConfig {
    pub queue_url: String,
    pub wait_time_seconds: u64,
    pub message_group_id: String,
}

impl Default for SqsConfig {
    fn default() -> Self {
        Self {
            queue_url: String::new(),
            wait_time_seconds: 20,
            message_group_id: "default".to_string(),
        }
    }
}

impl ConfigValidator for SqsConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        // 空 queue_url 表示使用进程内队列
        if !self.queue_url.is_empty() {
            ValidationUtils::validate_url(&self.queue_url, &["http", "https"], "sqs.queue_url")?;
        }
        ValidationUtils::validate_wait_seconds(self.wait_time_seconds, "sqs.wait_time_seconds")?;
        ValidationUtils::validate_not_empty(&self.message_group_id, "sqs.message_group_id")?;
        Ok(())
    }
}
