//! Local object-graph repository handles.
//!
//! A [`Repository`] is either a directory on disk or a transient in-memory
//! repository. Disk repositories keep one file per reference, git-style:
//!
//! ```text
//! <root>/refs/heads/<branch>   -> "<64 hex chars>\n"
//! <root>/refs/tags/<tag>       -> "<64 hex chars>\n"
//! ```
//!
//! Reference files are written to a temporary file first and then linked
//! into place without clobbering, so two processes creating the same
//! reference race safely: exactly one wins, the other sees
//! [`StoreError::ReferenceAlreadyExists`].

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use vstore_refs::{NamedRef, WithHash};
use vstore_types::{Hash, RepositoryId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RefIter;

const REFS_DIR: &str = "refs";

/// Handle to a local repository.
#[derive(Debug)]
pub enum Repository {
    Disk(DiskRepository),
    Ephemeral(EphemeralRepository),
}

impl Repository {
    /// Bind a handle to `root`. Nothing is touched on disk until the
    /// repository is opened by a store.
    pub fn disk(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let id = RepositoryId::for_directory(&root);
        Repository::Disk(DiskRepository { root, id })
    }

    /// A transient repository with a fresh identity.
    pub fn ephemeral() -> Self {
        Repository::Ephemeral(EphemeralRepository {
            id: RepositoryId::ephemeral(),
            refs: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn id(&self) -> &RepositoryId {
        match self {
            Repository::Disk(repo) => &repo.id,
            Repository::Ephemeral(repo) => &repo.id,
        }
    }

    /// The root directory, for disk repositories.
    pub fn directory(&self) -> Option<&Path> {
        match self {
            Repository::Disk(repo) => Some(&repo.root),
            Repository::Ephemeral(_) => None,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Repository::Ephemeral(_))
    }

    /// Prepare the repository layout. Idempotent.
    pub(crate) fn init(&self) -> StoreResult<()> {
        match self {
            Repository::Disk(repo) => repo.init(),
            Repository::Ephemeral(_) => Ok(()),
        }
    }

    pub(crate) fn read_ref(&self, reference: &NamedRef) -> StoreResult<Option<Hash>> {
        match self {
            Repository::Disk(repo) => repo.read_ref(reference),
            Repository::Ephemeral(repo) => {
                let refs = repo.refs.read().map_err(StoreError::poisoned)?;
                Ok(refs.get(reference).copied())
            }
        }
    }

    pub(crate) fn create_ref(&self, reference: &NamedRef, hash: Hash) -> StoreResult<()> {
        match self {
            Repository::Disk(repo) => repo.create_ref(reference, hash),
            Repository::Ephemeral(repo) => {
                let mut refs = repo.refs.write().map_err(StoreError::poisoned)?;
                if refs.contains_key(reference) {
                    return Err(StoreError::ReferenceAlreadyExists(reference.canonical_name()));
                }
                refs.insert(reference.clone(), hash);
                Ok(())
            }
        }
    }

    pub(crate) fn list_refs(&self) -> StoreResult<RefIter<'_>> {
        match self {
            Repository::Disk(repo) => Ok(repo.list_refs()),
            Repository::Ephemeral(repo) => {
                let refs = repo.refs.read().map_err(StoreError::poisoned)?;
                let snapshot: Vec<_> = refs
                    .iter()
                    .map(|(reference, hash)| WithHash::new(reference.clone(), *hash))
                    .collect();
                Ok(Box::new(snapshot.into_iter().map(Ok)))
            }
        }
    }
}

#[derive(Debug)]
pub struct DiskRepository {
    root: PathBuf,
    id: RepositoryId,
}

impl DiskRepository {
    fn init(&self) -> StoreResult<()> {
        for namespace in ["heads", "tags"] {
            let dir = self.root.join(REFS_DIR).join(namespace);
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        Ok(())
    }

    fn ref_path(&self, reference: &NamedRef) -> PathBuf {
        reference
            .canonical_name()
            .split('/')
            .fold(self.root.clone(), |path, component| path.join(component))
    }

    fn read_ref(&self, reference: &NamedRef) -> StoreResult<Option<Hash>> {
        let path = self.ref_path(reference);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(Hash::from_hex(&text)?)),
            // A directory, or a path below a ref file, is no ref.
            Err(e) if e.kind() == io::ErrorKind::NotFound || !path.is_file() => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn create_ref(&self, reference: &NamedRef, hash: Hash) -> StoreResult<()> {
        let path = self.ref_path(reference);
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::Backend(format!("no parent for {}", path.display())))?;
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        writeln!(staged, "{}", hash.to_hex()).map_err(|e| StoreError::io(staged.path(), e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| StoreError::io(staged.path(), e))?;

        staged.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                StoreError::ReferenceAlreadyExists(reference.canonical_name())
            } else {
                StoreError::io(&path, e.error)
            }
        })?;
        Ok(())
    }

    fn list_refs(&self) -> RefIter<'_> {
        let refs_dir = self.root.join(REFS_DIR);
        let walker = WalkDir::new(refs_dir.clone()).sort_by_file_name().into_iter();
        Box::new(walker.filter_map(move |entry| match entry {
            Ok(entry) => {
                // Staged temp files are dot-prefixed.
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if entry.file_type().is_file() && !hidden {
                    Some(self.load(entry.path()))
                } else {
                    None
                }
            }
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| refs_dir.clone());
                Some(Err(StoreError::io(path, io::Error::from(err))))
            }
        }))
    }

    fn load(&self, path: &Path) -> StoreResult<WithHash<NamedRef>> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let canonical = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let reference = NamedRef::from_canonical(&canonical)?;
        let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        Ok(WithHash::new(reference, Hash::from_hex(&text)?))
    }
}

#[derive(Debug)]
pub struct EphemeralRepository {
    id: RepositoryId,
    refs: RwLock<BTreeMap<NamedRef, Hash>>,
}
