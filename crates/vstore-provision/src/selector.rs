//! Backend selection.

use std::sync::Arc;

use tracing::info;
use vstore_store::{
    InMemoryVersionStore, LocalGraphVersionStore, StoreWorker, TieredVersionStore, VersionStore,
};

use crate::config::{BackendConfig, VersionStoreConfig};
use crate::connector::BackendConnector;
use crate::error::ProvisionResult;
use crate::repository::RepositoryProvider;

/// Construct the one version store `config` asks for.
///
/// Only the provider matching the selected kind is invoked: `repositories`
/// for local-graph, `connector` for remote-tiered. An unset or unknown kind
/// fails with [`ProvisionError::Configuration`](crate::ProvisionError)
/// before anything is constructed.
pub fn select(
    config: &VersionStoreConfig,
    worker: &StoreWorker,
    repositories: &dyn RepositoryProvider,
    connector: &dyn BackendConnector,
) -> ProvisionResult<Arc<dyn VersionStore>> {
    let store: Arc<dyn VersionStore> = match config.backend_config()? {
        BackendConfig::RemoteTiered(settings) => {
            info!("Using remote tiered version store");
            let connection = connector.connect(&settings)?;
            Arc::new(TieredVersionStore::new(connection, worker.clone())?)
        }
        BackendConfig::LocalGraph(settings) => {
            info!("Using local graph version store");
            let repository = repositories.provision(&settings)?;
            Arc::new(LocalGraphVersionStore::new(repository, worker.clone())?)
        }
        BackendConfig::InMemory => {
            info!("Using in-memory version store");
            Arc::new(
                InMemoryVersionStore::builder()
                    .value_serializer(worker.value_serializer())
                    .metadata_serializer(worker.metadata_serializer())
                    .build()?,
            )
        }
    };
    Ok(store)
}
