use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Item, ItemSession, ItemStore, NewItem, SampleRow, StoreError, StoreResult};

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: i64,
    items: BTreeMap<i64, Item>,
}

/// In-process item store used in place of MySQL in tests
///
/// A session takes the store lock for its whole lifetime and works on a copy
/// of the tables, which replaces the shared state only on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails, as if the database were down
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Committed items, lowest id first
    pub async fn snapshot(&self) -> Vec<Item> {
        self.tables.lock().await.items.values().cloned().collect()
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable {
            Err(StoreError::Unavailable(anyhow::anyhow!(
                "Connection refused (os error 111)"
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn ItemSession>> {
        self.check()?;
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemorySession { guard, working }))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }

    async fn sample(&self) -> StoreResult<Vec<SampleRow>> {
        self.check()?;
        Ok(vec![SampleRow {
            id: 1,
            name: "sample".to_string(),
        }])
    }
}

struct MemorySession {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl MemorySession {
    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.working
            .items
            .values()
            .any(|item| item.name == name && Some(item.id) != except)
    }
}

#[async_trait]
impl ItemSession for MemorySession {
    async fn find_by_id(&mut self, id: i64) -> StoreResult<Option<Item>> {
        Ok(self.working.items.get(&id).cloned())
    }

    async fn find_by_id_for_update(&mut self, id: i64) -> StoreResult<Option<Item>> {
        // Sessions already hold the store lock for their whole lifetime
        self.find_by_id(id).await
    }

    async fn find_by_name(&mut self, name: &str) -> StoreResult<Option<Item>> {
        Ok(self
            .working
            .items
            .values()
            .find(|item| item.name == name)
            .cloned())
    }

    async fn list(&mut self) -> StoreResult<Vec<Item>> {
        Ok(self.working.items.values().rev().cloned().collect())
    }

    async fn insert(&mut self, item: &NewItem) -> StoreResult<Item> {
        if self.name_taken(&item.name, None) {
            return Err(StoreError::UniqueViolation(item.name.clone()));
        }

        self.working.last_id += 1;
        let stored = Item {
            id: self.working.last_id,
            name: item.name.clone(),
            description: item.description.clone(),
            created_at: Utc::now(),
        };
        self.working.items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&mut self, item: &Item) -> StoreResult<()> {
        if self.name_taken(&item.name, Some(item.id)) {
            return Err(StoreError::UniqueViolation(item.name.clone()));
        }

        if let Some(existing) = self.working.items.get_mut(&item.id) {
            existing.name = item.name.clone();
            existing.description = item.description.clone();
        }
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> StoreResult<bool> {
        Ok(self.working.items.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemorySession { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str) -> NewItem {
        NewItem {
            name: name.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_session_is_discarded() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        session.insert(&new_item("draft")).await.unwrap();
        drop(session);

        assert!(store.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        let item = session.insert(&new_item("kept")).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(store.snapshot().await, vec![item]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        let first = session.insert(&new_item("a")).await.unwrap();
        assert!(session.delete(first.id).await.unwrap());
        let second = session.insert(&new_item("b")).await.unwrap();
        session.commit().await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_unique_violation_on_insert_and_update() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        session.insert(&new_item("taken")).await.unwrap();
        let mut other = session.insert(&new_item("free")).await.unwrap();

        let err = session.insert(&new_item("taken")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        other.name = "taken".to_string();
        let err = session.update(&other).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::unavailable();

        assert!(store.ping().await.is_err());
        assert!(store.sample().await.is_err());
        assert!(store.begin().await.is_err());
    }
}
