//! In-memory version store for tests and ephemeral deployments.
//!
//! [`InMemoryVersionStore`] keeps every reference in a `BTreeMap` behind a
//! `RwLock`. Data is lost when the store is dropped.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use vstore_refs::{NamedRef, WithHash};
use vstore_types::Hash;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ensure_known, ensure_no_nesting, resolve_target, RefIter, VersionStore};
use crate::worker::{CommitMeta, Contents, Serializer, StoreWorker};

#[derive(Debug)]
pub struct InMemoryVersionStore {
    refs: RwLock<BTreeMap<NamedRef, Hash>>,
    worker: StoreWorker,
}

impl InMemoryVersionStore {
    /// Create an empty store using `worker` for payload serialization.
    pub fn new(worker: StoreWorker) -> Self {
        Self {
            refs: RwLock::new(BTreeMap::new()),
            worker,
        }
    }

    pub fn builder() -> InMemoryVersionStoreBuilder {
        InMemoryVersionStoreBuilder::default()
    }
}

impl VersionStore for InMemoryVersionStore {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    fn named_refs(&self) -> StoreResult<RefIter<'_>> {
        let refs = self.refs.read().map_err(StoreError::poisoned)?;
        let snapshot: Vec<WithHash<NamedRef>> = refs
            .iter()
            .map(|(reference, hash)| WithHash::new(reference.clone(), *hash))
            .collect();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn create(&self, reference: &NamedRef, target: Option<Hash>) -> StoreResult<Hash> {
        let hash = resolve_target(reference, target)?;

        let mut refs = self.refs.write().map_err(StoreError::poisoned)?;
        if refs.contains_key(reference) {
            return Err(StoreError::ReferenceAlreadyExists(reference.canonical_name()));
        }
        ensure_no_nesting(reference, refs.keys().cloned().map(Ok))?;
        ensure_known(hash, refs.values().copied().map(Ok))?;

        refs.insert(reference.clone(), hash);
        Ok(hash)
    }

    fn to_hash(&self, reference: &NamedRef) -> StoreResult<Hash> {
        let refs = self.refs.read().map_err(StoreError::poisoned)?;
        refs.get(reference)
            .copied()
            .ok_or_else(|| StoreError::ReferenceNotFound(reference.canonical_name()))
    }

    fn worker(&self) -> &StoreWorker {
        &self.worker
    }
}

/// Assembles an [`InMemoryVersionStore`] from its two serializers.
#[derive(Default)]
pub struct InMemoryVersionStoreBuilder {
    values: Option<Arc<dyn Serializer<Contents>>>,
    metadata: Option<Arc<dyn Serializer<CommitMeta>>>,
}

impl InMemoryVersionStoreBuilder {
    pub fn value_serializer(mut self, serializer: Arc<dyn Serializer<Contents>>) -> Self {
        self.values = Some(serializer);
        self
    }

    pub fn metadata_serializer(mut self, serializer: Arc<dyn Serializer<CommitMeta>>) -> Self {
        self.metadata = Some(serializer);
        self
    }

    /// Both serializers are required.
    pub fn build(self) -> StoreResult<InMemoryVersionStore> {
        let values = self
            .values
            .ok_or_else(|| StoreError::Config("value serializer is not set".into()))?;
        let metadata = self
            .metadata
            .ok_or_else(|| StoreError::Config("metadata serializer is not set".into()))?;
        Ok(InMemoryVersionStore::new(StoreWorker::new(values, metadata)))
    }
}
