//! In-memory session storage using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::SessionStorage;
use crate::error::StorageError;

/// Session storage that lives only as long as the process.
///
/// # Example
///
/// ```
/// use bookshelf_lib::session::MemoryStorage;
///
/// let storage = MemoryStorage::new().with("token", "abc");
/// assert_eq!(storage.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    store: DashMap<String, String>,
}

impl MemoryStorage {
    /// Creates a new empty storage.
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Seeds a value, for tests and restored sessions.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.store.insert(key.into(), value.into());
        self
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key);
        Ok(())
    }
}
