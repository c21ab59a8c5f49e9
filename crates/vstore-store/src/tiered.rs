use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use vstore_refs::{NamedRef, WithHash};
use vstore_types::Hash;

use crate::connection::{RemoteConnection, REFS_TABLE};
use crate::error::{StoreError, StoreResult};
use crate::traits::{ensure_known, ensure_no_nesting, resolve_target, RefIter, VersionStore};
use crate::worker::StoreWorker;

/// One row of the refs table, keyed by canonical name.
#[derive(Debug, Serialize, Deserialize)]
struct RefRow {
    reference: NamedRef,
    hash: Hash,
}

fn decode(bytes: &[u8]) -> StoreResult<WithHash<NamedRef>> {
    let row: RefRow = serde_json::from_slice(bytes)?;
    Ok(WithHash::new(row.reference, row.hash))
}

/// Rows fetched per table scan request.
pub const SCAN_PAGE_SIZE: usize = 100;

/// Lazily pages through the refs table, one scan request at a time.
struct RefPages<'a> {
    connection: &'a RemoteConnection,
    page_size: usize,
    buffered: VecDeque<(String, Vec<u8>)>,
    last_key: Option<String>,
    exhausted: bool,
}

impl<'a> RefPages<'a> {
    fn open(connection: &'a RemoteConnection, page_size: usize) -> StoreResult<Self> {
        let mut pages = Self {
            connection,
            page_size,
            buffered: VecDeque::new(),
            last_key: None,
            exhausted: false,
        };
        pages.fetch()?;
        Ok(pages)
    }

    fn fetch(&mut self) -> StoreResult<()> {
        let page = self.connection.scan_page(
            REFS_TABLE,
            self.last_key.as_deref(),
            self.page_size,
        )?;
        self.exhausted = page.len() < self.page_size;
        if let Some((key, _)) = page.last() {
            self.last_key = Some(key.clone());
        }
        self.buffered.extend(page);
        Ok(())
    }
}

impl Iterator for RefPages<'_> {
    type Item = StoreResult<WithHash<NamedRef>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffered.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffered.pop_front().map(|(_, bytes)| decode(&bytes))
    }
}

/// Version store over a started [`RemoteConnection`].
#[derive(Debug)]
pub struct TieredVersionStore {
    connection: RemoteConnection,
    worker: StoreWorker,
    page_size: usize,
}

impl TieredVersionStore {
    pub fn new(connection: RemoteConnection, worker: StoreWorker) -> StoreResult<Self> {
        if !connection.is_started() {
            return Err(StoreError::Config(
                "tiered store needs a started connection".into(),
            ));
        }
        Ok(Self {
            connection,
            worker,
            page_size: SCAN_PAGE_SIZE,
        })
    }

    /// Rows requested per scan when listing references. At least one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn connection(&self) -> &RemoteConnection {
        &self.connection
    }
}

impl VersionStore for TieredVersionStore {
    fn backend(&self) -> &'static str {
        "remote-tiered"
    }

    fn named_refs(&self) -> StoreResult<RefIter<'_>> {
        Ok(Box::new(RefPages::open(&self.connection, self.page_size)?))
    }

    fn create(&self, reference: &NamedRef, target: Option<Hash>) -> StoreResult<Hash> {
        let hash = resolve_target(reference, target)?;
        let key = reference.canonical_name();
        if self.connection.get(REFS_TABLE, &key)?.is_some() {
            return Err(StoreError::ReferenceAlreadyExists(key));
        }
        ensure_no_nesting(reference, self.named_refs()?.map(|r| r.map(|with| with.value)))?;
        ensure_known(hash, self.named_refs()?.map(|r| r.map(|with| with.hash)))?;

        let row = RefRow {
            reference: reference.clone(),
            hash,
        };
        let bytes = serde_json::to_vec(&row)?;
        if !self.connection.put_if_absent(REFS_TABLE, &key, bytes)? {
            return Err(StoreError::ReferenceAlreadyExists(key));
        }
        Ok(hash)
    }

    fn to_hash(&self, reference: &NamedRef) -> StoreResult<Hash> {
        let key = reference.canonical_name();
        match self.connection.get(REFS_TABLE, &key)? {
            Some(bytes) => Ok(decode(&bytes)?.hash),
            None => Err(StoreError::ReferenceNotFound(key)),
        }
    }

    fn worker(&self) -> &StoreWorker {
        &self.worker
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::connection::ConnectionConfig;
    use crate::table::{InMemoryTables, TableStore};

    fn connection(tables: Arc<InMemoryTables>) -> RemoteConnection {
        let conn = RemoteConnection::new(
            ConnectionConfig {
                region: "eu-central-1".into(),
                endpoint: None,
                table_prefix: "vs_".into(),
                tracing: false,
                initialize_database: true,
            },
            tables,
        );
        conn.start().unwrap();
        conn
    }

    #[test]
    fn requires_started_connection() {
        let conn = RemoteConnection::new(
            ConnectionConfig {
                region: "r".into(),
                endpoint: None,
                table_prefix: String::new(),
                tracing: false,
                initialize_database: true,
            },
            Arc::new(InMemoryTables::new()),
        );
        let err = TieredVersionStore::new(conn, StoreWorker::json()).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn create_writes_a_row_in_the_prefixed_table() {
        let tables = Arc::new(InMemoryTables::new());
        let store = TieredVersionStore::new(connection(tables.clone()), StoreWorker::json()).unwrap();
        store.create(&NamedRef::branch("main"), None).unwrap();

        let rows = tables.scan_page("vs_refs", None, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "refs/heads/main");
    }

    #[test]
    fn stores_sharing_tables_see_each_other() {
        let tables = Arc::new(InMemoryTables::new());
        let a = TieredVersionStore::new(connection(tables.clone()), StoreWorker::json()).unwrap();
        let b = TieredVersionStore::new(connection(tables), StoreWorker::json()).unwrap();

        a.create(&NamedRef::branch("main"), None).unwrap();
        let err = b.create(&NamedRef::branch("main"), None).unwrap_err();
        assert!(matches!(err, StoreError::ReferenceAlreadyExists(_)));
        assert_eq!(b.named_refs().unwrap().count(), 1);
    }

    #[test]
    fn nested_branch_names_are_rejected() {
        let store = TieredVersionStore::new(
            connection(Arc::new(InMemoryTables::new())),
            StoreWorker::json(),
        )
        .unwrap();
        store.create(&NamedRef::branch("main"), None).unwrap();
        let err = store.create(&NamedRef::branch("main/x"), None).unwrap_err();
        assert!(matches!(err, StoreError::ReferenceAlreadyExists(_)));
    }

    #[test]
    fn to_hash_round_trips_through_rows() {
        let store = TieredVersionStore::new(
            connection(Arc::new(InMemoryTables::new())),
            StoreWorker::json(),
        )
        .unwrap();
        let tip = store.create(&NamedRef::branch("main"), None).unwrap();
        store.create(&NamedRef::tag("v1"), Some(tip)).unwrap();
        assert_eq!(store.to_hash(&NamedRef::tag("v1")).unwrap(), tip);
        assert!(matches!(
            store.to_hash(&NamedRef::tag("v2")),
            Err(StoreError::ReferenceNotFound(_))
        ));
    }

    /// Counts scan requests made against the wrapped tables.
    #[derive(Default)]
    struct CountingTables {
        inner: InMemoryTables,
        scans: AtomicUsize,
    }

    impl TableStore for CountingTables {
        fn table_exists(&self, table: &str) -> StoreResult<bool> {
            self.inner.table_exists(table)
        }

        fn create_table(&self, table: &str) -> StoreResult<()> {
            self.inner.create_table(table)
        }

        fn get(&self, table: &str, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(table, key)
        }

        fn put_if_absent(&self, table: &str, key: &str, value: Vec<u8>) -> StoreResult<bool> {
            self.inner.put_if_absent(table, key, value)
        }

        fn scan_page(
            &self,
            table: &str,
            start_after: Option<&str>,
            limit: usize,
        ) -> StoreResult<Vec<(String, Vec<u8>)>> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.scan_page(table, start_after, limit)
        }
    }

    fn paged_store(tables: Arc<CountingTables>) -> TieredVersionStore {
        let conn = RemoteConnection::new(
            ConnectionConfig {
                region: "eu-central-1".into(),
                endpoint: None,
                table_prefix: "vs_".into(),
                tracing: false,
                initialize_database: true,
            },
            tables,
        );
        conn.start().unwrap();
        TieredVersionStore::new(conn, StoreWorker::json())
            .unwrap()
            .with_page_size(2)
    }

    #[test]
    fn listing_walks_every_page_in_order() {
        let store = paged_store(Arc::new(CountingTables::default()));
        for name in ["e", "a", "d", "b", "c"] {
            store.create(&NamedRef::branch(name), None).unwrap();
        }
        let names: Vec<String> = store
            .named_refs()
            .unwrap()
            .map(|r| r.unwrap().value.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn first_item_needs_only_one_scan() {
        let tables = Arc::new(CountingTables::default());
        let store = paged_store(tables.clone());
        for name in ["a", "b", "c", "d", "e"] {
            store.create(&NamedRef::branch(name), None).unwrap();
        }
        let before = tables.scans.load(Ordering::SeqCst);
        assert!(store.named_refs().unwrap().next().unwrap().is_ok());
        assert_eq!(tables.scans.load(Ordering::SeqCst) - before, 1);
    }

    #[test]
    fn undecodable_row_is_an_error_item() {
        let tables = Arc::new(InMemoryTables::new());
        let store = TieredVersionStore::new(connection(tables.clone()), StoreWorker::json()).unwrap();
        tables
            .put_if_absent("vs_refs", "refs/heads/junk", b"{".to_vec())
            .unwrap();
        let item = store.named_refs().unwrap().next().unwrap();
        assert!(matches!(item, Err(StoreError::Serialization(_))));
    }
}
