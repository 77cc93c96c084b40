//! Persisted session state

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::StorageError;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Key holding the signed-in user, serialized as JSON.
pub const USER_KEY: &str = "user";

/// String key-value storage that survives between runs of the client.
///
/// The HTTP client reads [`TOKEN_KEY`] before every request and clears both
/// keys when the backend answers 401.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
