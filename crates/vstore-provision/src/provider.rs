use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;
use vstore_store::{StoreError, StoreWorker, VersionStore};

use crate::bootstrap::{ensure_default_branch, BootstrapOutcome};
use crate::config::VersionStoreConfig;
use crate::connector::{BackendConnector, TableConnector};
use crate::error::ProvisionResult;
use crate::gate::StartupRetryGate;
use crate::repository::{RepositoryProvider, RepositoryProvisioner};
use crate::selector::select;

/// Lazily provisions the process's version store and hands out the same
/// handle on every later call.
///
/// The first [`get`](StoreProvider::get) runs the selector behind the
/// startup gate and then bootstraps the default branch. Failures are not
/// cached; the next call tries again, subject to the gate.
pub struct StoreProvider {
    config: VersionStoreConfig,
    worker: StoreWorker,
    repositories: Arc<dyn RepositoryProvider>,
    connector: Arc<dyn BackendConnector>,
    gate: StartupRetryGate,
    slot: Mutex<Option<Provisioned>>,
}

struct Provisioned {
    store: Arc<dyn VersionStore>,
    outcome: BootstrapOutcome,
}

impl StoreProvider {
    /// A provider with JSON serializers, the default repository provisioner
    /// and a connector over in-process tables.
    pub fn new(config: VersionStoreConfig) -> Self {
        Self {
            config,
            worker: StoreWorker::json(),
            repositories: Arc::new(RepositoryProvisioner),
            connector: Arc::new(TableConnector::in_memory()),
            gate: StartupRetryGate::new(),
            slot: Mutex::new(None),
        }
    }

    pub fn with_worker(mut self, worker: StoreWorker) -> Self {
        self.worker = worker;
        self
    }

    pub fn with_repositories(mut self, repositories: Arc<dyn RepositoryProvider>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn BackendConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_gate(mut self, gate: StartupRetryGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn config(&self) -> &VersionStoreConfig {
        &self.config
    }

    pub fn gate(&self) -> &StartupRetryGate {
        &self.gate
    }

    /// The provisioned store, constructing and bootstrapping it on first use.
    pub fn get(&self) -> ProvisionResult<Arc<dyn VersionStore>> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| StoreError::Backend(format!("store slot poisoned: {e}")))?;
        if let Some(provisioned) = slot.as_ref() {
            return Ok(Arc::clone(&provisioned.store));
        }

        let store = self.gate.attempt(self.config.kind_label(), || {
            select(
                &self.config,
                &self.worker,
                self.repositories.as_ref(),
                self.connector.as_ref(),
            )
        })?;
        let outcome = ensure_default_branch(store.as_ref(), &self.config.default_branch)?;
        info!(backend = store.backend(), ?outcome, "version store ready");

        *slot = Some(Provisioned {
            store: Arc::clone(&store),
            outcome,
        });
        Ok(store)
    }

    /// What the bootstrap did when the store was provisioned.
    pub fn bootstrap_outcome(&self) -> Option<BootstrapOutcome> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|p| p.outcome))
    }

    /// Whether a store has been provisioned yet.
    pub fn is_initialized(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

impl fmt::Debug for StoreProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreProvider")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}
