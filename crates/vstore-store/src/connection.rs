use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::table::TableStore;

/// Base name of the table holding named references.
pub const REFS_TABLE: &str = "refs";

const TABLES: &[&str] = &[REFS_TABLE];

/// Settings for a connection to the remote table service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub region: String,
    /// Overrides the region's default endpoint (e.g. a local emulator).
    pub endpoint: Option<Url>,
    /// Prepended to every table name.
    pub table_prefix: String,
    /// Emit a debug event for every table operation.
    pub tracing: bool,
    /// Create missing tables on start instead of failing.
    pub initialize_database: bool,
}

impl ConnectionConfig {
    /// Fully qualified name of table `base`.
    pub fn table_name(&self, base: &str) -> String {
        format!("{}{}", self.table_prefix, base)
    }
}

/// Connection handle to the remote table service.
///
/// A connection must be [started](RemoteConnection::start) before a store
/// can use it.
pub struct RemoteConnection {
    config: ConnectionConfig,
    tables: Arc<dyn TableStore>,
    started: AtomicBool,
}

impl RemoteConnection {
    pub fn new(config: ConnectionConfig, tables: Arc<dyn TableStore>) -> Self {
        Self {
            config,
            tables,
            started: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Check (or create) the backing tables and mark the connection usable.
    pub fn start(&self) -> StoreResult<()> {
        for base in TABLES {
            let table = self.config.table_name(base);
            if self.config.initialize_database {
                self.tables.create_table(&table)?;
            } else if !self.tables.table_exists(&table)? {
                return Err(StoreError::TableMissing(table));
            }
        }
        self.started.store(true, Ordering::Release);
        info!(
            region = %self.config.region,
            endpoint = self.config.endpoint.as_ref().map(Url::as_str).unwrap_or("default"),
            prefix = %self.config.table_prefix,
            "remote table connection started"
        );
        Ok(())
    }

    fn ensure_started(&self) -> StoreResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(StoreError::Backend("remote connection has not been started".into()))
        }
    }

    fn trace(&self, op: &str, table: &str, key: Option<&str>) {
        if self.config.tracing {
            debug!(op, table, key, "table operation");
        }
    }

    pub(crate) fn get(&self, base: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_started()?;
        let table = self.config.table_name(base);
        self.trace("get", &table, Some(key));
        self.tables.get(&table, key)
    }

    pub(crate) fn put_if_absent(&self, base: &str, key: &str, value: Vec<u8>) -> StoreResult<bool> {
        self.ensure_started()?;
        let table = self.config.table_name(base);
        self.trace("put_if_absent", &table, Some(key));
        self.tables.put_if_absent(&table, key, value)
    }

    pub(crate) fn scan_page(
        &self,
        base: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<(String, Vec<u8>)>> {
        self.ensure_started()?;
        let table = self.config.table_name(base);
        self.trace("scan", &table, start_after);
        self.tables.scan_page(&table, start_after, limit)
    }
}

impl fmt::Debug for RemoteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConnection")
            .field("config", &self.config)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}
