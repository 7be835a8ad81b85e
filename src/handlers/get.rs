use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_id;
use crate::models::ItemResponse;
use crate::routes;
use crate::service;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode, Json};

/// GET /items/{id} handler - Retrieve one item
#[utoipa::path(
    get,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 422, description = "Id is not an integer", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let id = parse_id(&id_str)?;
    let item = service::get_item(state.store.as_ref(), id).await?;
    Ok((StatusCode::OK, Json(item.into())))
}
