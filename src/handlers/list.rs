use crate::error::{ApiError, ErrorResponse};
use crate::models::ItemResponse;
use crate::routes;
use crate::service;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /items handler - List all items, newest id first
#[utoipa::path(
    get,
    path = routes::ITEMS,
    responses(
        (status = 200, description = "All items ordered by id descending", body = [ItemResponse]),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn list_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<ItemResponse>>), ApiError> {
    let items = service::list_items(state.store.as_ref()).await?;

    tracing::info!("Listed {} items", items.len());
    Ok((
        StatusCode::OK,
        Json(items.into_iter().map(ItemResponse::from).collect()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{create, empty_request, read_json, test_app};
    use crate::store::memory::MemoryStore;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_empty() {
        let app = test_app(MemoryStore::new());

        let response = app.oneshot(empty_request("GET", "/items")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let items: Vec<ItemResponse> = read_json(response).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let app = test_app(MemoryStore::new());
        let first = create(&app, "first", None).await;
        let second = create(&app, "second", Some("two")).await;
        let third = create(&app, "third", None).await;

        let response = app.oneshot(empty_request("GET", "/items")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let items: Vec<ItemResponse> = read_json(response).await;
        let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
        assert_eq!(items[1].description.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_list_database_error() {
        let app = test_app(MemoryStore::unavailable());

        let response = app.oneshot(empty_request("GET", "/items")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error_response: ErrorResponse = read_json(response).await;
        assert_eq!(error_response.error, "Internal server error");
    }
}
