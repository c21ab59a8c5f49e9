use tracing::info;

use vstore_refs::NamedRef;
use vstore_types::Hash;

use crate::error::{StoreError, StoreResult};
use crate::repository::Repository;
use crate::traits::{ensure_known, ensure_no_nesting, resolve_target, RefIter, VersionStore};
use crate::worker::StoreWorker;

/// Version store over a local object-graph [`Repository`].
#[derive(Debug)]
pub struct LocalGraphVersionStore {
    repository: Repository,
    worker: StoreWorker,
}

impl LocalGraphVersionStore {
    /// Open `repository`, laying out its reference directories if needed.
    ///
    /// This is where an unusable directory (for example a path that is a
    /// regular file) is reported.
    pub fn new(repository: Repository, worker: StoreWorker) -> StoreResult<Self> {
        repository.init()?;
        match repository.directory() {
            Some(dir) => info!(id = %repository.id(), dir = %dir.display(), "opened local graph repository"),
            None => info!(id = %repository.id(), "opened ephemeral local graph repository"),
        }
        Ok(Self { repository, worker })
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}

impl VersionStore for LocalGraphVersionStore {
    fn backend(&self) -> &'static str {
        "local-graph"
    }

    fn named_refs(&self) -> StoreResult<RefIter<'_>> {
        self.repository.list_refs()
    }

    fn create(&self, reference: &NamedRef, target: Option<Hash>) -> StoreResult<Hash> {
        let hash = resolve_target(reference, target)?;
        if self.repository.read_ref(reference)?.is_some() {
            return Err(StoreError::ReferenceAlreadyExists(reference.canonical_name()));
        }
        ensure_no_nesting(
            reference,
            self.repository.list_refs()?.map(|r| r.map(|with| with.value)),
        )?;
        ensure_known(
            hash,
            self.repository.list_refs()?.map(|r| r.map(|with| with.hash)),
        )?;
        self.repository.create_ref(reference, hash)?;
        Ok(hash)
    }

    fn to_hash(&self, reference: &NamedRef) -> StoreResult<Hash> {
        self.repository
            .read_ref(reference)?
            .ok_or_else(|| StoreError::ReferenceNotFound(reference.canonical_name()))
    }

    fn worker(&self) -> &StoreWorker {
        &self.worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_store_creates_and_lists() {
        let store =
            LocalGraphVersionStore::new(Repository::ephemeral(), StoreWorker::json()).unwrap();
        store.create(&NamedRef::branch("main"), None).unwrap();
        let refs: Vec<_> = store.named_refs().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].value, NamedRef::branch("main"));
        assert_eq!(refs[0].hash, Hash::NO_ANCESTOR);
    }

    #[test]
    fn disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store =
                LocalGraphVersionStore::new(Repository::disk(dir.path()), StoreWorker::json())
                    .unwrap();
            store.create(&NamedRef::branch("main"), None).unwrap();
        }
        let reopened =
            LocalGraphVersionStore::new(Repository::disk(dir.path()), StoreWorker::json())
                .unwrap();
        assert_eq!(
            reopened.to_hash(&NamedRef::branch("main")).unwrap(),
            Hash::NO_ANCESTOR
        );
    }

    #[test]
    fn disk_store_on_regular_file_fails_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "not a repository").unwrap();
        let err =
            LocalGraphVersionStore::new(Repository::disk(&file), StoreWorker::json()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn tag_at_existing_branch_tip() {
        let store =
            LocalGraphVersionStore::new(Repository::ephemeral(), StoreWorker::json()).unwrap();
        let tip = store.create(&NamedRef::branch("main"), None).unwrap();
        store.create(&NamedRef::tag("v1"), Some(tip)).unwrap();
        assert_eq!(store.to_hash(&NamedRef::tag("v1")).unwrap(), tip);
    }

    #[test]
    fn nested_branch_names_are_rejected_like_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let disk =
            LocalGraphVersionStore::new(Repository::disk(dir.path()), StoreWorker::json()).unwrap();
        let ephemeral =
            LocalGraphVersionStore::new(Repository::ephemeral(), StoreWorker::json()).unwrap();

        for store in [&disk, &ephemeral] {
            store.create(&NamedRef::branch("main"), None).unwrap();
            let below = store.create(&NamedRef::branch("main/x"), None).unwrap_err();
            assert!(matches!(below, StoreError::ReferenceAlreadyExists(_)));

            store.create(&NamedRef::branch("dev/x"), None).unwrap();
            let above = store.create(&NamedRef::branch("dev"), None).unwrap_err();
            assert!(matches!(above, StoreError::ReferenceAlreadyExists(_)));
            assert!(matches!(
                store.to_hash(&NamedRef::branch("dev")),
                Err(StoreError::ReferenceNotFound(_))
            ));
        }
    }

    #[test]
    fn duplicate_and_unknown_target_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            LocalGraphVersionStore::new(Repository::disk(dir.path()), StoreWorker::json()).unwrap();
        store.create(&NamedRef::branch("main"), None).unwrap();

        let dup = store.create(&NamedRef::branch("main"), None).unwrap_err();
        assert!(matches!(dup, StoreError::ReferenceAlreadyExists(_)));

        let missing = store
            .create(&NamedRef::branch("dev"), Some(Hash::of(b"gone")))
            .unwrap_err();
        assert!(matches!(missing, StoreError::ReferenceNotFound(_)));
    }
}
