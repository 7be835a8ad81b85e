use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidatedJson;
use crate::models::{CreateItem, ItemResponse};
use crate::routes;
use crate::service;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// POST /items handler - Create an item
#[utoipa::path(
    post,
    path = routes::ITEMS,
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 409, description = "An item with this name already exists", body = ErrorResponse),
        (status = 422, description = "Malformed or invalid body", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let item = service::create_item(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}
