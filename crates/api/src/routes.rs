use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use void_application::ItemService;
use void_config::AppConfig;

use crate::handlers::{health::health_check, items, root::root};
use crate::middleware::{cors_layer, request_logging, trace_layer};

/// 请求处理共享的状态
#[derive(Clone)]
pub struct AppState {
    pub item_service: ItemService,
    pub config: Arc<AppConfig>,
}

/// 只含路由，不带中间件
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/v1/items", post(items::create_item))
        .route("/api/v1/items/{id}", get(items::get_item))
        .with_state(state)
}

/// 完整应用：路由 + 追踪、CORS、请求日志中间件
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.api.cors_origins);
    create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(cors)
            .layer(middleware::from_fn(request_logging)),
    )
}
