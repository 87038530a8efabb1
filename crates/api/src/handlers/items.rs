use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use void_domain::ItemStatus;

use crate::{
    error::ApiResult,
    routes::AppState,
    types::{CreateItemRequest, ItemResponse},
};

/// 创建 Item，返回 201 和新建的实体
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let Json(request) = payload?;
    request.validate()?;

    let id = state
        .item_service
        .create_item(
            &request.name,
            request.description,
            request.status.unwrap_or(ItemStatus::Active),
            request.metadata,
        )
        .await?;

    let item = state.item_service.get_item(&id).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ItemResponse>> {
    debug!(item_id = %id, "Fetching item");
    let item = state.item_service.get_item(&id).await?;
    Ok(Json(item.into()))
}
