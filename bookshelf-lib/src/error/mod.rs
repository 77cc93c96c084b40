//! Error types

mod api;
mod storage;

pub use api::*;
pub use storage::*;

/// Top-level error for client and store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A request body or stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Form data could not be turned into a payload.
    #[error(transparent)]
    Form(#[from] bookshelf_forms::FormError),
}

impl Error {
    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => e.status_code(),
            _ => None,
        }
    }

    /// Returns `true` if the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }
}
