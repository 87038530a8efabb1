use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::{Credentials, Region};
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{
    Message, MessageAttributeValue, MessageSystemAttributeName, QueueAttributeName,
};
use aws_sdk_sqs::Client;
use tracing::{debug, error, info};
use uuid::Uuid;
use void_config::{AwsConfig, SqsConfig};
use void_domain::{validate_wait_seconds, MessageBody, MessageQueue, QueueMessage};
use void_errors::{VoidError, VoidResult};

/// SQS FIFO 队列实现
///
/// 每次只拉取一条消息；每次发送都生成新的去重 id，重试的发送不会被 SQS 去重。
#[derive(Clone, Debug)]
pub struct SqsMessageQueue {
    client: Client,
    queue_url: String,
}

impl SqsMessageQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// 按配置构建 SDK 客户端；未配置静态凭证时使用默认凭证链
    pub async fn from_config(aws: &AwsConfig, sqs: &SqsConfig) -> VoidResult<Self> {
        if sqs.queue_url.is_empty() {
            return Err(VoidError::config_error("sqs.queue_url is not configured"));
        }

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));
        if let Some((key_id, secret)) = aws.static_credentials() {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "void-config",
            ));
        }
        if let Some(endpoint) = &aws.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        info!("SQS 客户端已创建: region={}, queue={}", aws.region, sqs.queue_url);
        Ok(Self::new(Client::new(&shared), sqs.queue_url.clone()))
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

fn queue_error<E: std::error::Error>(action: &str, err: E) -> VoidError {
    let message = format!("{action}失败: {}", DisplayErrorContext(&err));
    error!("{}", message);
    VoidError::queue_error(message)
}

/// SDK 消息 → 领域消息
pub(crate) fn to_queue_message(message: Message) -> VoidResult<QueueMessage> {
    let receipt_handle = message
        .receipt_handle
        .ok_or_else(|| VoidError::queue_error("Received message without receipt handle"))?;

    let attributes = message
        .attributes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.as_str().to_string(), value))
        .collect();

    let message_attributes = message
        .message_attributes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| value.string_value.map(|v| (name, v)))
        .collect();

    Ok(QueueMessage {
        body: MessageBody::parse(message.body.as_deref().unwrap_or_default()),
        receipt_handle,
        message_id: message.message_id.unwrap_or_default(),
        attributes,
        message_attributes,
    })
}

pub(crate) fn parse_depth(attributes: Option<&HashMap<QueueAttributeName, String>>) -> VoidResult<u64> {
    match attributes.and_then(|a| a.get(&QueueAttributeName::ApproximateNumberOfMessages)) {
        None => Ok(0),
        Some(value) => value.parse::<u64>().map_err(|e| {
            VoidError::queue_error(format!("无效的 ApproximateNumberOfMessages '{value}': {e}"))
        }),
    }
}

#[async_trait]
impl MessageQueue for SqsMessageQueue {
    async fn receive(&self, wait_seconds: u64) -> VoidResult<Option<QueueMessage>> {
        let wait = validate_wait_seconds(wait_seconds)?;

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait as i32)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|e| queue_error("接收消息", e))?;

        match output.messages.unwrap_or_default().into_iter().next() {
            None => Ok(None),
            Some(message) => {
                let message = to_queue_message(message)?;
                debug!(message_id = %message.message_id, "Received message");
                Ok(Some(message))
            }
        }
    }

    async fn delete(&self, receipt_handle: &str) -> VoidResult<()> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| queue_error("删除消息", e))?;
        debug!("Deleted message");
        Ok(())
    }

    async fn send(
        &self,
        body: &str,
        group_id: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> VoidResult<String> {
        let mut request = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(group_id)
            .message_deduplication_id(Uuid::new_v4().to_string());

        for (name, value) in attributes.into_iter().flatten() {
            let value = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|e| queue_error("构建消息属性", e))?;
            request = request.message_attributes(name, value);
        }

        let output = request.send().await.map_err(|e| queue_error("发送消息", e))?;
        let message_id = output.message_id.unwrap_or_default();
        info!(message_id = %message_id, group_id, "Message sent");
        Ok(message_id)
    }

    async fn get_queue_depth(&self) -> VoidResult<u64> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(&self.queue_url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| queue_error("获取队列属性", e))?;

        parse_depth(output.attributes.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_queue_message_json_body() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body(r#"{"task_type":"process_item","data":{"name":"Widget"}}"#)
            .attributes(MessageSystemAttributeName::MessageGroupId, "default")
            .message_attributes(
                "source",
                MessageAttributeValue::builder()
                    .data_type("String")
                    .string_value("api")
                    .build()
                    .unwrap(),
            )
            .build();

        let converted = to_queue_message(message).unwrap();
        assert_eq!(converted.message_id, "m-1");
        assert_eq!(converted.receipt_handle, "rh-1");
        assert_eq!(
            converted.body,
            MessageBody::Json(json!({"task_type": "process_item", "data": {"name": "Widget"}}))
        );
        assert_eq!(converted.attributes.get("MessageGroupId").unwrap(), "default");
        assert_eq!(converted.message_attributes.get("source").unwrap(), "api");
    }

    #[test]
    fn test_to_queue_message_raw_body() {
        let message = Message::builder()
            .receipt_handle("rh-2")
            .body("plain text")
            .build();
        let converted = to_queue_message(message).unwrap();
        assert_eq!(converted.body, MessageBody::Raw("plain text".to_string()));
    }

    #[test]
    fn test_to_queue_message_requires_receipt_handle() {
        let message = Message::builder().body("{}").build();
        assert!(matches!(
            to_queue_message(message),
            Err(VoidError::MessageQueue(_))
        ));
    }

    #[test]
    fn test_parse_depth() {
        let mut attributes = HashMap::new();
        assert_eq!(parse_depth(None).unwrap(), 0);
        assert_eq!(parse_depth(Some(&attributes)).unwrap(), 0);

        attributes.insert(QueueAttributeName::ApproximateNumberOfMessages, "7".to_string());
        assert_eq!(parse_depth(Some(&attributes)).unwrap(), 7);

        attributes.insert(QueueAttributeName::ApproximateNumberOfMessages, "many".to_string());
        assert!(parse_depth(Some(&attributes)).is_err());
    }

    #[tokio::test]
    async fn test_from_config_requires_queue_url() {
        let result = SqsMessageQueue::from_config(&AwsConfig::default(), &SqsConfig::default()).await;
        assert!(matches!(result, Err(VoidError::Configuration(_))));
    }
}
