use crate::error::ErrorResponse;
use crate::models::{DataResponse, LegacyDataResponse, SampleRowResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /data handler - Legacy sample query
///
/// Kept for older clients. Failures are reported in-band with 200 OK and the
/// raw database error.
#[utoipa::path(
    get,
    path = routes::DATA,
    responses(
        (status = 200, description = "Sample rows, or the error that prevented reading them", body = LegacyDataResponse)
    ),
    tag = "legacy"
)]
pub async fn data_handler(State(state): State<AppState>) -> (StatusCode, Json<LegacyDataResponse>) {
    let body = match state.store.sample().await {
        Ok(rows) => LegacyDataResponse::Data(DataResponse {
            data: rows.into_iter().map(SampleRowResponse::from).collect(),
        }),
        Err(e) => {
            tracing::error!("Sample query failed: {}", e);
            LegacyDataResponse::Error(ErrorResponse {
                error: e.to_string(),
            })
        }
    };

    (StatusCode::OK, Json(body))
}
