//! Session storage error types

/// Errors raised by [`SessionStorage`](crate::session::SessionStorage) backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
