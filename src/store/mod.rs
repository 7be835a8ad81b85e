//! Item persistence.
//!
//! The service talks to storage through two traits: an [`ItemStore`] handle
//! that is created once at startup and injected into the handlers, and an
//! [`ItemSession`] that represents one request's unit of work. A session is a
//! transaction: [`ItemSession::commit`] consumes it, and dropping it without
//! committing rolls every change back and releases the underlying connection.

pub mod mysql;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use mysql::MySqlStore;

/// A stored item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller when inserting a new item
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

/// A single row returned by the legacy sample query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub id: i64,
    pub name: String,
}

/// Errors raised by the storage layer
#[derive(Debug)]
pub enum StoreError {
    /// The write collided with the unique constraint on `name`
    UniqueViolation(String),
    /// The store could not be reached or the statement failed
    Unavailable(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::UniqueViolation(name) => {
                write!(f, "unique constraint violated for name '{}'", name)
            }
            StoreError::Unavailable(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Unavailable(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to the item store, shared by every request
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Open a new transactional session
    async fn begin(&self) -> StoreResult<Box<dyn ItemSession>>;

    /// Trivial round-trip used by the health check
    async fn ping(&self) -> StoreResult<()>;

    /// Fixed sample query served by `GET /data`
    async fn sample(&self) -> StoreResult<Vec<SampleRow>>;
}

/// One request's unit of work against the store
#[async_trait]
pub trait ItemSession: Send {
    async fn find_by_id(&mut self, id: i64) -> StoreResult<Option<Item>>;

    /// Like [`ItemSession::find_by_id`], but keeps other sessions from
    /// changing or deleting the row until this one ends
    async fn find_by_id_for_update(&mut self, id: i64) -> StoreResult<Option<Item>>;

    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<Item>>;

    /// All live items, highest id first
    async fn list(&mut self) -> StoreResult<Vec<Item>>;

    /// Insert a row and return it with the store-assigned `id` and `created_at`
    async fn insert(&mut self, item: &NewItem) -> StoreResult<Item>;

    /// Overwrite the mutable columns of an existing row
    async fn update(&mut self, item: &Item) -> StoreResult<()>;

    /// Remove a row, returning whether one existed
    async fn delete(&mut self, id: i64) -> StoreResult<bool>;

    /// Make every change of this session durable
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
