use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use void_api::{create_app, create_routes, AppState};
use void_application::ItemService;
use void_config::AppConfig;
use void_testing_utils::{
    InMemoryItemRepository, InMemoryItemStore, InMemoryUnitOfWorkFactory, ItemBuilder,
};

/// 创建测试用的应用状态
fn create_test_app_state(store: &InMemoryItemStore) -> AppState {
    AppState {
        item_service: ItemService::new(
            Arc::new(InMemoryUnitOfWorkFactory::new(store.clone())),
            Arc::new(InMemoryItemRepository::new(store.clone())),
        ),
        config: Arc::new(AppConfig::default()),
    }
}

fn test_app() -> (Router, InMemoryItemStore) {
    let store = InMemoryItemStore::new();
    (create_routes(create_test_app_state(&store)), store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_item(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/items")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "VOID API - Ready to serve"})
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app();
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "VOID");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_create_item() {
    let (app, store) = test_app();
    let response = app
        .oneshot(post_item(json!({
            "name": "Widget",
            "description": "A blue widget",
            "metadata": {"color": "blue"}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Widget");
    assert_eq!(json["description"], "A blue widget");
    assert_eq!(json["status"], "active");
    assert_eq!(json["metadata"], json!({"color": "blue"}));
    assert!(json["created_at"].is_string());
    assert!(json["updated_at"].is_null());

    let id = json["id"].as_str().unwrap();
    assert_eq!(store.get(id).unwrap().name, "Widget");
}

#[tokio::test]
async fn test_create_item_with_status() {
    let (app, _) = test_app();
    let response = app
        .oneshot(post_item(json!({"name": "Draft", "status": "draft"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["status"], "draft");
}

#[tokio::test]
async fn test_create_item_validation_errors() {
    let long_description = "d".repeat(1001);
    for body in [
        json!({"name": ""}),
        json!({"name": "n".repeat(256)}),
        json!({"name": "ok", "description": long_description}),
    ] {
        let (app, store) = test_app();
        let response = app.oneshot(post_item(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Validation Error");
        assert!(json["detail"].is_string());
        assert_eq!(store.count(), 0);
    }
}

#[tokio::test]
async fn test_malformed_body_uses_error_format() {
    let (app, store) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/items")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Bad Request");
    assert!(json["detail"].is_string());

    let (app, _) = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/items")
        .body(Body::from(json!({"name": "Widget"}).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Bad Request");

    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_missing_field_is_validation_error() {
    let (app, store) = test_app();
    let response = app
        .oneshot(post_item(json!({"description": "no name"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"], "Validation Error");
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_blank_name_rejected_by_entity() {
    let (app, store) = test_app();
    let response = app.oneshot(post_item(json!({"name": "   "}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_get_item() {
    let (app, store) = test_app();
    let id = store.insert(ItemBuilder::new().with_name("Stored").build());

    let response = app
        .oneshot(get(&format!("/api/v1/items/{id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["name"], "Stored");
}

#[tokio::test]
async fn test_get_item_not_found() {
    for id in ["5f1d7f8e9a1b2c3d4e5f6a7b", "not-an-id"] {
        let (app, _) = test_app();
        let response = app
            .oneshot(get(&format!("/api/v1/items/{id}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["detail"], format!("Item {id} not found"));
    }
}

#[tokio::test]
async fn test_storage_failure_is_opaque_500() {
    let store = InMemoryItemStore::new();
    let state = create_test_app_state(&store);
    let factory = InMemoryUnitOfWorkFactory::new(store.clone());
    factory.fail_begin(true);
    let state = AppState {
        item_service: ItemService::new(
            Arc::new(factory),
            Arc::new(InMemoryItemRepository::new(store)),
        ),
        ..state
    };

    let response = create_routes(state)
        .oneshot(post_item(json!({"name": "Widget"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Internal Server Error", "detail": "An unexpected error occurred"})
    );
}

#[tokio::test]
async fn test_full_app_sets_process_time_header() {
    let store = InMemoryItemStore::new();
    let app = create_app(create_test_app_state(&store));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers().get("x-process-time").unwrap();
    assert!(header.to_str().unwrap().parse::<f64>().unwrap() >= 0.0);
}
