//! Local repository provisioning for the local-graph backend.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use vstore_store::Repository;

use crate::config::LocalSettings;
use crate::error::{ProvisionError, ProvisionResult};

/// Where a local repository lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepositoryMode {
    OnDisk(PathBuf),
    Ephemeral,
}

impl RepositoryMode {
    /// Resolve the configured mode. Unknown modes and a disk mode without a
    /// directory are configuration errors.
    pub fn from_settings(settings: &LocalSettings) -> ProvisionResult<Self> {
        let mode = settings.mode.trim();
        if mode.eq_ignore_ascii_case("disk") {
            match &settings.directory {
                Some(dir) if !dir.as_os_str().is_empty() => Ok(RepositoryMode::OnDisk(dir.clone())),
                _ => Err(ProvisionError::config(
                    "local.directory must be set when local.mode is \"disk\"",
                )),
            }
        } else if mode.eq_ignore_ascii_case("in-memory") {
            Ok(RepositoryMode::Ephemeral)
        } else {
            Err(ProvisionError::config(format!(
                "unknown local repository mode {:?}",
                settings.mode
            )))
        }
    }
}

/// Produces repository handles for the local-graph backend.
pub trait RepositoryProvider: Send + Sync {
    fn provision(&self, settings: &LocalSettings) -> ProvisionResult<Repository>;
}

/// Creates disk directories on demand or hands out ephemeral repositories.
#[derive(Clone, Copy, Debug, Default)]
pub struct RepositoryProvisioner;

impl RepositoryProvisioner {
    pub fn provision_mode(&self, mode: &RepositoryMode) -> ProvisionResult<Repository> {
        match mode {
            RepositoryMode::OnDisk(path) => {
                info!("local graph store configured with the disk backend");
                let dir = ensure_directory(path)?;
                info!(dir = %dir.display(), "disk backend location");
                Ok(Repository::disk(dir))
            }
            RepositoryMode::Ephemeral => {
                info!("local graph store configured with the in-memory backend");
                Ok(Repository::ephemeral())
            }
        }
    }
}

impl RepositoryProvider for RepositoryProvisioner {
    fn provision(&self, settings: &LocalSettings) -> ProvisionResult<Repository> {
        self.provision_mode(&RepositoryMode::from_settings(settings)?)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ProvisionError {
    ProvisionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `path` and its parents if missing and return it as an absolute
/// path. An existing path is returned as-is, whatever it contains.
///
/// On failure the directories this call created are removed again, as long
/// as they are still empty.
fn ensure_directory(path: &Path) -> ProvisionResult<PathBuf> {
    let path = std::path::absolute(path).map_err(|e| io_error(path, e))?;
    if path.exists() {
        return Ok(path);
    }

    // Deepest first.
    let missing: Vec<PathBuf> = path
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
        .map(Path::to_path_buf)
        .collect();

    if let Err(source) = fs::create_dir_all(&path) {
        remove_created(&missing);
        return Err(io_error(&path, source));
    }
    Ok(path)
}

/// Remove the directories in `created`, deepest first, while they are empty.
/// A directory that gained content from elsewhere stops the walk, along with
/// every parent above it.
fn remove_created(created: &[PathBuf]) {
    for dir in created {
        if !dir.exists() {
            continue;
        }
        // Best effort: the creation error is what gets reported.
        if fs::remove_dir(dir).is_err() {
            break;
        }
    }
}
