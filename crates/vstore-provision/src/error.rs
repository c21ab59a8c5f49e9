use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vstore_store::StoreError;

/// Errors raised while provisioning a version store.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Unknown or unset backend kind, unknown repository mode, or a setting
    /// the selected backend cannot do without.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A construction attempt came too soon after a failed one.
    #[error("{kind} version store failed to start recently, try again in {retry_in:?}")]
    StartupThrottled { kind: String, retry_in: Duration },

    /// A local repository directory could not be created or accessed.
    #[error("couldn't create directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend itself failed. Carried unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ProvisionError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
