use crate::models::{HealthResponse, HealthStatus, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /health handler - Health check endpoint
///
/// Performs a trivial query to verify database connectivity. Always answers
/// 200 OK; an unreachable database is reported in the body together with the
/// driver's error message.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Health report, healthy or unhealthy", body = HealthStatus)
    ),
    tag = "health"
)]
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let status = match state.store.ping().await {
        Ok(()) => {
            tracing::debug!("Health check passed");
            HealthStatus::Healthy(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            HealthStatus::Unhealthy(UnhealthyResponse {
                status: "unhealthy".to_string(),
                error: e.to_string(),
            })
        }
    };

    (StatusCode::OK, Json(status))
}
