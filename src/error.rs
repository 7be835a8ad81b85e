use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Custom error type for API endpoints
///
/// Every failure a handler can produce ends up as one of these variants,
/// which decides the status code and the JSON body sent to the caller.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body, failed field validation or non-integer path id
    Validation(String),
    /// An item with this name already exists
    Conflict(String),
    /// No live item has this id
    NotFound(i64),
    /// Database operation error
    Store(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Validation error: {}", details),
            ),
            ApiError::Conflict(name) => (
                StatusCode::CONFLICT,
                format!("Item with name '{}' already exists", name),
            ),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                format!("Item not found: {}", id),
            ),
            ApiError::Store(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(name) => ApiError::Conflict(name),
            StoreError::Unavailable(err) => ApiError::Store(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
