use std::sync::Arc;

use tracing::info;
use url::Url;
use vstore_store::{ConnectionConfig, InMemoryTables, RemoteConnection, TableStore};

use crate::config::RemoteSettings;
use crate::error::{ProvisionError, ProvisionResult};

/// Produces started connections for the remote tiered backend.
pub trait BackendConnector: Send + Sync {
    fn connect(&self, settings: &RemoteSettings) -> ProvisionResult<RemoteConnection>;
}

/// Connects to a [`TableStore`], applying region, endpoint, table prefix
/// and tracing settings, then starts the connection.
#[derive(Clone)]
pub struct TableConnector {
    tables: Arc<dyn TableStore>,
}

impl TableConnector {
    pub fn new(tables: Arc<dyn TableStore>) -> Self {
        Self { tables }
    }

    /// A connector over fresh process-local tables.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTables::new()))
    }

    fn connection_config(settings: &RemoteSettings) -> ProvisionResult<ConnectionConfig> {
        let endpoint = settings
            .endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ProvisionError::config(format!("invalid endpoint override {raw:?}: {e}"))
                })
            })
            .transpose()?;
        Ok(ConnectionConfig {
            region: settings.region.clone(),
            endpoint,
            table_prefix: settings.table_prefix.clone(),
            tracing: settings.tracing,
            initialize_database: settings.initialize_database,
        })
    }
}

impl Default for TableConnector {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl BackendConnector for TableConnector {
    fn connect(&self, settings: &RemoteSettings) -> ProvisionResult<RemoteConnection> {
        let config = Self::connection_config(settings)?;
        info!(region = %config.region, "connecting to remote table store");
        let connection = RemoteConnection::new(config, Arc::clone(&self.tables));
        connection.start()?;
        Ok(connection)
    }
}
