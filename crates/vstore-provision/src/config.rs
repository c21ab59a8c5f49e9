//! Version store configuration.
//!
//! The file form is TOML:
//!
//! ```toml
//! default_branch = "main"
//!
//! [backend]
//! kind = "local-graph"
//!
//! [local]
//! mode = "disk"
//! directory = "/var/lib/vstore"
//! ```
//!
//! Only the section matching `backend.kind` is ever read. The others may be
//! absent, partial, or nonsensical without affecting startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProvisionError, ProvisionResult};
use crate::kind::BackendKind;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionStoreConfig {
    /// Branch created on first start when the store has no references.
    pub default_branch: String,
    pub backend: BackendSection,
    pub remote: RemoteSettings,
    pub local: LocalSettings,
}

impl Default for VersionStoreConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            backend: BackendSection::default(),
            remote: RemoteSettings::default(),
            local: LocalSettings::default(),
        }
    }
}

/// Raw backend selection. `kind` stays a string until selection so an
/// unknown value is reported by the selector, naming the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub kind: Option<String>,
}

/// Settings for the remote tiered backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub region: String,
    /// Endpoint override, e.g. a local emulator.
    pub endpoint: Option<String>,
    pub table_prefix: String,
    pub tracing: bool,
    pub initialize_database: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            region: "us-west-2".into(),
            endpoint: None,
            table_prefix: String::new(),
            tracing: false,
            initialize_database: true,
        }
    }
}

/// Settings for the local object-graph backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    /// `disk` or `in-memory`.
    pub mode: String,
    /// Required when `mode` is `disk`.
    pub directory: Option<PathBuf>,
}

impl Default for LocalSettings {
    fn default() -> Self {
        Self {
            mode: "in-memory".into(),
            directory: None,
        }
    }
}

/// The resolved backend, carrying only the settings it uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendConfig {
    RemoteTiered(RemoteSettings),
    LocalGraph(LocalSettings),
    InMemory,
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::RemoteTiered(_) => BackendKind::RemoteTiered,
            BackendConfig::LocalGraph(_) => BackendKind::LocalGraph,
            BackendConfig::InMemory => BackendKind::InMemory,
        }
    }
}

impl VersionStoreConfig {
    /// A default configuration selecting `kind`.
    pub fn for_kind(kind: BackendKind) -> Self {
        let mut config = Self::default();
        config.backend.kind = Some(kind.to_string());
        config
    }

    pub fn from_toml_str(text: &str) -> ProvisionResult<Self> {
        toml::from_str(text).map_err(|e| ProvisionError::config(format!("invalid config: {e}")))
    }

    pub fn load(path: &Path) -> ProvisionResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ProvisionError::config(format!("couldn't read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ProvisionResult<String> {
        toml::to_string_pretty(self).map_err(|e| ProvisionError::config(e.to_string()))
    }

    /// Parse `backend.kind`. Unset or unknown values are configuration
    /// errors; there is no default kind.
    pub fn kind(&self) -> ProvisionResult<BackendKind> {
        match self.backend.kind.as_deref() {
            Some(raw) => raw.parse(),
            None => Err(ProvisionError::config("version-store type is not set")),
        }
    }

    /// The configured kind as written, for log messages.
    pub fn kind_label(&self) -> &str {
        self.backend.kind.as_deref().unwrap_or("unset")
    }

    /// Resolve the selected backend and pick out its settings.
    pub fn backend_config(&self) -> ProvisionResult<BackendConfig> {
        Ok(match self.kind()? {
            BackendKind::RemoteTiered => BackendConfig::RemoteTiered(self.remote.clone()),
            BackendKind::LocalGraph => BackendConfig::LocalGraph(self.local.clone()),
            BackendKind::InMemory => BackendConfig::InMemory,
        })
    }
}
