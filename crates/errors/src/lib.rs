use thiserror::Error;

/// 全局错误分类
///
/// 业务层只区分五类：验证、未找到、传输（数据库/消息队列）、路由、事务。
/// 其余变体用于启动期和外部调用。
#[derive(Debug, Error)]
pub enum VoidError {
    #[error("数据验证失败: {0}")]
    Validation(String),
    #[error("资源未找到: {0}")]
    NotFound(String),
    #[error("数据库错误: {0}")]
    Database(String),
    #[error("消息队列错误: {0}")]
    MessageQueue(String),
    #[error("任务路由失败: {0}")]
    Routing(String),
    #[error("事务错误: {0}")]
    Transaction(String),
    #[error("重复注册: {0}")]
    Registration(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("外部服务错误: {0}")]
    Network(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type VoidResult<T> = Result<T, VoidError>;

impl VoidError {
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }
    pub fn queue_error<S: Into<String>>(msg: S) -> Self {
        Self::MessageQueue(msg.into())
    }
    pub fn routing_error<S: Into<String>>(msg: S) -> Self {
        Self::Routing(msg.into())
    }
    pub fn transaction_error<S: Into<String>>(msg: S) -> Self {
        Self::Transaction(msg.into())
    }
    pub fn registration_error<S: Into<String>>(msg: S) -> Self {
        Self::Registration(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn network_error<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// 传输层错误：数据库和消息队列
    pub fn is_transport(&self) -> bool {
        matches!(self, VoidError::Database(_) | VoidError::MessageQueue(_))
    }

    /// 编程错误或启动期配置错误，不应被吞掉
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VoidError::Internal(_)
                | VoidError::Configuration(_)
                | VoidError::Transaction(_)
                | VoidError::Registration(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VoidError::Database(_) | VoidError::MessageQueue(_) | VoidError::Network(_)
        )
    }

    pub fn user_message(&self) -> &str {
        match self {
            VoidError::Validation(_) => "输入数据验证失败",
            VoidError::NotFound(_) => "请求的资源不存在",
            VoidError::Network(_) => "外部服务暂时不可用",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for VoidError {
    fn from(err: serde_json::Error) -> Self {
        VoidError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for VoidError {
    fn from(err: anyhow::Error) -> Self {
        VoidError::Internal(err.to_string())
    }
}
