//! Version store provisioning for vstore.
//!
//! Turns a [`VersionStoreConfig`] into the one live `VersionStore` a
//! process serves from:
//!
//! 1. [`select`] picks the backend kind and constructs its adapter, calling
//!    the [`RepositoryProvider`] or [`BackendConnector`] only for the kind
//!    that needs it.
//! 2. [`StartupRetryGate`] wraps construction and refuses to retry for
//!    [`START_RETRY_MIN_INTERVAL`] after a failure.
//! 3. [`ensure_default_branch`] gives an empty store its first branch.
//!
//! [`StoreProvider`] runs the three steps once, on first demand.
//!
//! ```no_run
//! use vstore_provision::{BackendKind, StoreProvider, VersionStoreConfig};
//!
//! let provider = StoreProvider::new(VersionStoreConfig::for_kind(BackendKind::InMemory));
//! let store = provider.get()?;
//! assert_eq!(store.named_refs()?.count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bootstrap;
pub mod config;
pub mod connector;
pub mod error;
pub mod gate;
pub mod kind;
pub mod provider;
pub mod repository;
pub mod selector;

pub use bootstrap::{ensure_default_branch, BootstrapOutcome};
pub use config::{BackendConfig, BackendSection, LocalSettings, RemoteSettings, VersionStoreConfig};
pub use connector::{BackendConnector, TableConnector};
pub use error::{ProvisionError, ProvisionResult};
pub use gate::{
    Clock, FailureWindow, ManualClock, StartupRetryGate, SystemClock, START_RETRY_MIN_INTERVAL,
};
pub use kind::BackendKind;
pub use provider::StoreProvider;
pub use repository::{RepositoryMode, RepositoryProvider, RepositoryProvisioner};
pub use selector::select;
