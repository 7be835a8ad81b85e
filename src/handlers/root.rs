use crate::models::RootResponse;
use crate::routes;
use axum::{http::StatusCode, Json};

/// GET / handler - Service banner
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Service is running", body = RootResponse)
    ),
    tag = "health"
)]
pub async fn root_handler() -> (StatusCode, Json<RootResponse>) {
    (
        StatusCode::OK,
        Json(RootResponse {
            message: "Data API is running".to_string(),
        }),
    )
}
