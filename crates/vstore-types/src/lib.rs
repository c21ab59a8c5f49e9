//! Foundation types for vstore.
//!
//! Every other vstore crate depends on `vstore-types`.
//!
//! # Key Types
//!
//! - [`Hash`] - Position in a commit history that a named reference points at
//! - [`RepositoryId`] - Identity of a local object-graph repository

pub mod error;
pub mod hash;
pub mod repository;

pub use error::TypeError;
pub use hash::Hash;
pub use repository::RepositoryId;
