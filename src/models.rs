use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::store::{Item, SampleRow};

/// Longest accepted item name, matching the `VARCHAR(100)` column
pub const NAME_MAX_LEN: usize = 100;

/// Response body for `GET /`
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct RootResponse {
    pub message: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Health report; always returned with 200 OK
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum HealthStatus {
    Healthy(HealthResponse),
    Unhealthy(UnhealthyResponse),
}

/// Request body for `POST /items`
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateItem {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for `PATCH /items/{id}`
///
/// Each field is `None` when the key is missing from the body and
/// `Some(None)` when it is sent as an explicit `null`.
#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
#[validate(schema(function = "validate_update"))]
pub struct UpdateItem {
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

/// Marks a key that appears in the body, even when its value is `null`
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Name rule shared by create and update
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(ValidationError::new("length").with_message(
            format!("name must be between 1 and {} characters", NAME_MAX_LEN).into(),
        ));
    }
    Ok(())
}

fn validate_update(update: &UpdateItem) -> Result<(), ValidationError> {
    match &update.name {
        Some(None) => {
            Err(ValidationError::new("required").with_message("name cannot be null".into()))
        }
        Some(Some(name)) => validate_name(name),
        None => Ok(()),
    }
}

/// Item as returned by the API
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        ItemResponse {
            id: item.id,
            name: item.name,
            description: item.description,
            created_at: item.created_at.to_rfc3339(),
        }
    }
}

/// Row of the legacy sample query
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SampleRowResponse {
    pub id: i64,
    pub name: String,
}

impl From<SampleRow> for SampleRowResponse {
    fn from(row: SampleRow) -> Self {
        SampleRowResponse {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct DataResponse {
    pub data: Vec<SampleRowResponse>,
}

/// Body of `GET /data`, which reports failures in-band
#[derive(Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum LegacyDataResponse {
    Data(DataResponse),
    Error(crate::error::ErrorResponse),
}
