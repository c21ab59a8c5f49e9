//! Version store contract and backend adapters for vstore.
//!
//! The serving layer only ever sees an `Arc<dyn VersionStore>`. Three
//! adapters implement it:
//!
//! - [`InMemoryVersionStore`] - process-local, lost on exit
//! - [`LocalGraphVersionStore`] - over a [`Repository`] handle, either a
//!   directory on disk or an ephemeral in-memory repository
//! - [`TieredVersionStore`] - over a [`RemoteConnection`] to a table store
//!
//! # Design Rules
//!
//! 1. Creating a reference is an atomic create-if-absent in every adapter.
//! 2. A reference may only point at [`Hash::NO_ANCESTOR`] or at a position
//!    some existing reference already points at.
//! 3. Listing is lazy and restartable: every call starts a fresh sequence.
//! 4. Backend failures surface as [`StoreError`], never as panics.
//!
//! The adapters deliberately stop at reference management. Commits, merges
//! and history traversal belong to the full engines.

pub mod connection;
pub mod error;
pub mod graph;
pub mod memory;
pub mod repository;
pub mod table;
pub mod tiered;
pub mod traits;
pub mod worker;

pub use connection::{ConnectionConfig, RemoteConnection, REFS_TABLE};
pub use error::{StoreError, StoreResult};
pub use graph::LocalGraphVersionStore;
pub use memory::{InMemoryVersionStore, InMemoryVersionStoreBuilder};
pub use repository::Repository;
pub use table::{InMemoryTables, TableStore};
pub use tiered::{TieredVersionStore, SCAN_PAGE_SIZE};
pub use traits::{RefIter, VersionStore};
pub use worker::{CommitMeta, Contents, JsonSerializer, Serializer, StoreWorker};

pub use vstore_refs::{NamedRef, WithHash};
pub use vstore_types::Hash;
