use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

// Route path constants - single source of truth for all API paths
pub const ROOT: &str = "/";
pub const HEALTH: &str = "/health";
pub const DATA: &str = "/data";
pub const ITEMS: &str = "/items";
pub const ITEM: &str = "/items/{id}";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Build the application router with every endpoint and the API docs
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(ROOT, get(handlers::root_handler))
        .route(HEALTH, get(handlers::health_handler))
        .route(DATA, get(handlers::data_handler))
        .route(
            ITEMS,
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            ITEM,
            get(handlers::get_handler)
                .patch(handlers::update_handler)
                .delete(handlers::delete_handler),
        )
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
