use crate::error::{ApiError, ErrorResponse};
use crate::handlers::parse_id;
use crate::routes;
use crate::service;
use crate::state::AppState;
use axum::{extract::Path, extract::State, http::StatusCode};

/// DELETE /items/{id} handler - Permanently remove an item
#[utoipa::path(
    delete,
    path = routes::ITEM,
    params(
        ("id" = i64, Path, description = "Item id")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 422, description = "Id is not an integer", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id_str)?;
    service::delete_item(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{create, empty_request, read_json, test_app};
    use crate::models::ItemResponse;
    use crate::store::memory::MemoryStore;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let app = test_app(MemoryStore::new());
        let created = create(&app, "old", None).await;
        let uri = format!("/items/{}", created.id);

        let response = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());

        let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(empty_request("GET", "/items")).await.unwrap();
        let items: Vec<ItemResponse> = read_json(response).await;
        assert!(items.iter().all(|item| item.id != created.id));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let app = test_app(MemoryStore::new());
        let created = create(&app, "once", None).await;
        let uri = format!("/items/{}", created.id);

        let response = app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_missing_item() {
        let app = test_app(MemoryStore::new());

        let response = app
            .oneshot(empty_request("DELETE", "/items/999999"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error_response: ErrorResponse = read_json(response).await;
        assert!(error_response.error.contains("999999"));
    }
}
