//! Named references for vstore.
//!
//! A named reference is a human-readable, mutable pointer into a commit
//! history, analogous to a git ref. Storage backends own them; this crate
//! only defines their shape and naming rules.
//!
//! # Modules
//!
//! - [`error`] - Error types for reference names
//! - [`types`] - [`NamedRef`] and [`WithHash`]
//! - [`names`] - git-style name validation

pub mod error;
pub mod names;
pub mod types;

pub use error::{RefError, Result};
pub use names::validate_ref_name;
pub use types::{NamedRef, WithHash};
