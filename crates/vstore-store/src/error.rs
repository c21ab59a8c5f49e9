use std::path::PathBuf;

use vstore_refs::RefError;
use vstore_types::TypeError;

/// Errors from version store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A reference with this name already exists.
    #[error("reference already exists: {0}")]
    ReferenceAlreadyExists(String),

    /// The reference, or the hash a new reference should point at, does
    /// not exist.
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// The reference name is malformed.
    #[error("invalid reference: {0}")]
    InvalidReference(#[from] RefError),

    /// The request is well-formed but not meaningful (e.g. a tag with no
    /// target).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A backing table is missing and the connection may not create it.
    #[error("table does not exist: {0}")]
    TableMissing(String),

    /// The adapter was assembled from incomplete parts.
    #[error("store configuration error: {0}")]
    Config(String),

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a disk-backed repository.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        Self::Backend(format!("lock poisoned: {err}"))
    }
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
