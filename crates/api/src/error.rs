use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};
use void_errors::VoidError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Void(#[from] VoidError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Void(VoidError::validation_error(message))
    }

    /// 状态码、错误标题和对外可见的详情；内部错误不暴露原始信息
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Void(VoidError::Validation(msg)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation Error",
                msg.clone(),
            ),
            ApiError::Void(VoidError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not Found", msg.clone())
            }
            ApiError::Void(VoidError::Network(msg)) => {
                (StatusCode::BAD_GATEWAY, "External API Error", msg.clone())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg.clone()),
            ApiError::Void(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An unexpected error occurred".to_string(),
            ),
        }
    }
}

/// 请求体字段类型不符按校验错误处理（422），其余 JSON 问题为 400
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::validation(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title, detail) = self.parts();

        if status.is_server_error() {
            error!("请求处理失败: {}", self);
        } else {
            warn!("请求被拒绝 ({}): {}", status.as_u16(), detail);
        }

        (status, Json(json!({ "error": title, "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ApiError::from(VoidError::not_found("Item x not found")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(VoidError::network_error("timeout")),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(VoidError::database_error("connection refused")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::BadRequest("malformed".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = ApiError::from(VoidError::database_error("password=secret"));
        let (_, title, detail) = err.parts();
        assert_eq!(title, "Internal Server Error");
        assert_eq!(detail, "An unexpected error occurred");
    }
}
