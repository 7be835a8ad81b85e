use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidatedJson;
use crate::handlers::parse_id;
use crate::models::{ItemResponse, UpdateItem};
use crate::routes;
use crate::service;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// PATCH /items/{id} handler - Partially update an item
///
/// Only the keys present in the body are applied. `"description": null`
/// clears the description; `name` may be changed but not nulled.
#[utoipa::path(
    patch,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 409, description = "Another item already has this name", body = ErrorResponse),
        (status = 422, description = "Malformed or invalid body", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let id = parse_id(&id_str)?;
    let item = service::update_item(state.store.as_ref(), id, input).await?;
    Ok((StatusCode::OK, Json(item.into())))
}
