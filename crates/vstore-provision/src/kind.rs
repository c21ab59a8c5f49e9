use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;

/// The storage engine a process runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Tables in a remote key-value service.
    RemoteTiered,
    /// A local object-graph repository, on disk or ephemeral.
    LocalGraph,
    /// Process memory only.
    InMemory,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::RemoteTiered,
        BackendKind::LocalGraph,
        BackendKind::InMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::RemoteTiered => "remote-tiered",
            BackendKind::LocalGraph => "local-graph",
            BackendKind::InMemory => "in-memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProvisionError::config(format!("unknown version-store type {s:?}")))
    }
}
