pub mod root;
pub mod health;
pub mod data;
pub mod create;
pub mod list;
pub mod get;
pub mod update;
pub mod delete;

pub use root::root_handler;
pub use health::health_handler;
pub use data::data_handler;
pub use create::create_handler;
pub use list::list_handler;
pub use get::get_handler;
pub use update::update_handler;
pub use delete::delete_handler;

use crate::error::ApiError;

/// Parse the `{id}` path segment of `/items/{id}`
fn parse_id(id_str: &str) -> Result<i64, ApiError> {
    id_str.parse::<i64>().map_err(|_| {
        ApiError::Validation(format!("id must be an integer, got '{}'", id_str))
    })
}
