//! Item operations.
//!
//! Each operation opens its own session, and commits it only when every step
//! succeeded. Any early return drops the session, which rolls back whatever
//! it had written.

use tracing::instrument;

use crate::error::ApiError;
use crate::models::{CreateItem, UpdateItem};
use crate::store::{Item, ItemStore, NewItem};

pub type ServiceResult<T> = Result<T, ApiError>;

/// Insert a new item unless its name is already taken
#[instrument(skip(store, input), fields(item_name = %input.name))]
pub async fn create_item(store: &dyn ItemStore, input: CreateItem) -> ServiceResult<Item> {
    let mut session = store.begin().await?;

    if session.find_by_name(&input.name).await?.is_some() {
        return Err(ApiError::Conflict(input.name));
    }

    // uq_items_name still catches a concurrent insert of the same name here
    let item = session
        .insert(&NewItem {
            name: input.name,
            description: input.description,
        })
        .await?;
    session.commit().await?;

    tracing::info!(item_id = item.id, "Created item");
    Ok(item)
}

#[instrument(skip(store))]
pub async fn list_items(store: &dyn ItemStore) -> ServiceResult<Vec<Item>> {
    let mut session = store.begin().await?;
    let items = session.list().await?;
    session.commit().await?;
    Ok(items)
}

#[instrument(skip(store))]
pub async fn get_item(store: &dyn ItemStore, id: i64) -> ServiceResult<Item> {
    let mut session = store.begin().await?;
    let item = session.find_by_id(id).await?.ok_or(ApiError::NotFound(id))?;
    session.commit().await?;
    Ok(item)
}

/// Apply the fields present in `input` to item `id`
///
/// A rename onto another item's name fails before anything is written, so the
/// description is not touched either.
#[instrument(skip(store, input))]
pub async fn update_item(store: &dyn ItemStore, id: i64, input: UpdateItem) -> ServiceResult<Item> {
    let mut session = store.begin().await?;

    let mut item = session
        .find_by_id_for_update(id)
        .await?
        .ok_or(ApiError::NotFound(id))?;

    if let Some(Some(name)) = input.name {
        if let Some(other) = session.find_by_name(&name).await? {
            if other.id != id {
                return Err(ApiError::Conflict(name));
            }
        }
        item.name = name;
    }

    if let Some(description) = input.description {
        item.description = description;
    }

    session.update(&item).await?;
    session.commit().await?;

    tracing::info!(item_id = id, "Updated item");
    Ok(item)
}

#[instrument(skip(store))]
pub async fn delete_item(store: &dyn ItemStore, id: i64) -> ServiceResult<()> {
    let mut session = store.begin().await?;

    if !session.delete(id).await? {
        return Err(ApiError::NotFound(id));
    }
    session.commit().await?;

    tracing::info!(item_id = id, "Deleted item");
    Ok(())
}
