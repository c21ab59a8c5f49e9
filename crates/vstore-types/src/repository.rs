use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Identity of a local object-graph repository.
///
/// Disk repositories derive their identity from the directory they live in,
/// so reopening the same directory yields the same id. Ephemeral repositories
/// get a fresh random identity every time one is created.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepositoryId {
    hash: [u8; 32],
}

impl RepositoryId {
    /// Derive the identity of a disk repository rooted at `dir`.
    pub fn for_directory(dir: &Path) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vstore-repository-v1:");
        hasher.update(b"disk:");
        hasher.update(dir.to_string_lossy().as_bytes());
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Generate a fresh identity for a transient repository.
    pub fn ephemeral() -> Self {
        let mut seed = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut seed);
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vstore-repository-v1:");
        hasher.update(b"ephemeral:");
        hasher.update(&seed);
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Short identifier (`repo:` plus the first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("repo:{}", hex::encode(&self.hash[..4]))
    }
}

impl fmt::Debug for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepositoryId({})", self.short_id())
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_identity_is_stable() {
        let a = RepositoryId::for_directory(Path::new("/var/lib/vstore"));
        let b = RepositoryId::for_directory(Path::new("/var/lib/vstore"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_directories_differ() {
        let a = RepositoryId::for_directory(Path::new("/a"));
        let b = RepositoryId::for_directory(Path::new("/b"));
        assert_ne!(a, b);
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        assert_ne!(RepositoryId::ephemeral(), RepositoryId::ephemeral());
    }

    #[test]
    fn short_id_format() {
        let id = RepositoryId::for_directory(Path::new("/x"));
        let short = id.short_id();
        assert!(short.starts_with("repo:"));
        assert_eq!(short.len(), 13);
    }
}
