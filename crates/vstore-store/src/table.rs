//! Key-value table storage used by the tiered store.
//!
//! [`TableStore`] is the seam to the remote table service. The only bundled
//! implementation is [`InMemoryTables`], which keeps tables in process
//! memory for tests and single-node deployments.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// A set of named tables of byte rows keyed by string.
///
/// Implementations must make [`put_if_absent`](TableStore::put_if_absent)
/// atomic: of two concurrent writers of the same key exactly one succeeds.
pub trait TableStore: Send + Sync {
    fn table_exists(&self, table: &str) -> StoreResult<bool>;

    /// Create `table` if it does not exist. Idempotent.
    fn create_table(&self, table: &str) -> StoreResult<()>;

    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert a row unless `key` is present. Returns `false` if it was.
    fn put_if_absent(&self, table: &str, key: &str, value: Vec<u8>) -> StoreResult<bool>;

    /// Up to `limit` rows of `table` with keys after `start_after`, ordered
    /// by key. A page shorter than `limit` is the last one.
    fn scan_page(
        &self,
        table: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<(String, Vec<u8>)>>;
}

#[derive(Debug, Default)]
pub struct InMemoryTables {
    tables: RwLock<HashMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(table: &str) -> StoreError {
    StoreError::TableMissing(table.to_string())
}

impl TableStore for InMemoryTables {
    fn table_exists(&self, table: &str) -> StoreResult<bool> {
        let tables = self.tables.read().map_err(StoreError::poisoned)?;
        Ok(tables.contains_key(table))
    }

    fn create_table(&self, table: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(StoreError::poisoned)?;
        tables.entry(table.to_string()).or_default();
        Ok(())
    }

    fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let tables = self.tables.read().map_err(StoreError::poisoned)?;
        let rows = tables.get(table).ok_or_else(|| missing(table))?;
        Ok(rows.get(key).cloned())
    }

    fn put_if_absent(&self, table: &str, key: &str, value: Vec<u8>) -> StoreResult<bool> {
        let mut tables = self.tables.write().map_err(StoreError::poisoned)?;
        let rows = tables.get_mut(table).ok_or_else(|| missing(table))?;
        if rows.contains_key(key) {
            return Ok(false);
        }
        rows.insert(key.to_string(), value);
        Ok(true)
    }

    fn scan_page(
        &self,
        table: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let tables = self.tables.read().map_err(StoreError::poisoned)?;
        let rows = tables.get(table).ok_or_else(|| missing(table))?;
        let lower = match start_after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        Ok(rows
            .range::<str, _>((lower, Bound::Unbounded))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
