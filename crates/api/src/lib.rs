//! # VOID API
//!
//! 基于 Axum 的 HTTP 入口，只做请求校验、调用应用服务和错误映射。
//!
//! ## API 端点
//!
//! - `GET /` - 就绪信息
//! - `GET /health` - 健康检查
//! - `POST /api/v1/items` - 创建 Item
//! - `GET /api/v1/items/{id}` - 查询 Item
//!
//! ## 错误响应
//!
//! ```json
//! { "error": "Validation Error", "detail": "name must be between 1 and 255 characters" }
//! ```
//!
//! 校验错误返回 422，资源不存在返回 404，外部服务错误返回 502，
//! 其余一律返回 500 且不暴露内部信息。

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use routes::{create_app, create_routes, AppState};
pub use types::{CreateItemRequest, ItemResponse};
