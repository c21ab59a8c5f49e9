//! Error types for reference names.

use thiserror::Error;

/// Errors raised while validating or parsing references.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The reference name breaks the naming rules.
    #[error("invalid reference name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A canonical name did not start with `refs/heads/` or `refs/tags/`.
    #[error("unrecognized canonical reference name: {0}")]
    UnknownNamespace(String),
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;
