use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::models::{
    CreateItem, DataResponse, HealthResponse, HealthStatus, ItemResponse, LegacyDataResponse,
    RootResponse, SampleRowResponse, UnhealthyResponse, UpdateItem,
};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "items-api",
        version = "1.0.0",
        description = "CRUD service for named items backed by MySQL/MariaDB"
    ),
    paths(
        handlers::root::root_handler,
        handlers::health::health_handler,
        handlers::data::data_handler,
        handlers::create::create_handler,
        handlers::list::list_handler,
        handlers::get::get_handler,
        handlers::update::update_handler,
        handlers::delete::delete_handler
    ),
    components(
        schemas(
            CreateItem,
            UpdateItem,
            ItemResponse,
            RootResponse,
            HealthStatus,
            HealthResponse,
            UnhealthyResponse,
            LegacyDataResponse,
            DataResponse,
            SampleRowResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "health", description = "Service status"),
        (name = "items", description = "Item operations"),
        (name = "legacy", description = "Endpoints kept for older clients")
    )
)]
pub struct ApiDoc;
