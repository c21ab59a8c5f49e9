//! Core reference types.

use std::fmt;

use serde::{Deserialize, Serialize};
use vstore_types::Hash;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

/// A named, mutable pointer into a commit history.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum NamedRef {
    /// A branch moves forward as commits land on it.
    Branch(String),
    /// A tag marks one fixed position.
    Tag(String),
}

impl NamedRef {
    pub fn branch(name: impl Into<String>) -> Self {
        NamedRef::Branch(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        NamedRef::Tag(name.into())
    }

    /// Parse a canonical name such as `refs/heads/main`.
    pub fn from_canonical(canonical: &str) -> Result<Self> {
        let reference = if let Some(name) = canonical.strip_prefix(HEADS_PREFIX) {
            NamedRef::branch(name)
        } else if let Some(name) = canonical.strip_prefix(TAGS_PREFIX) {
            NamedRef::tag(name)
        } else {
            return Err(RefError::UnknownNamespace(canonical.to_string()));
        };
        reference.validate()?;
        Ok(reference)
    }

    /// The canonical name (e.g. `refs/heads/main`).
    pub fn canonical_name(&self) -> String {
        match self {
            NamedRef::Branch(name) => format!("{HEADS_PREFIX}{name}"),
            NamedRef::Tag(name) => format!("{TAGS_PREFIX}{name}"),
        }
    }

    /// The short name, without the namespace prefix.
    pub fn name(&self) -> &str {
        match self {
            NamedRef::Branch(name) | NamedRef::Tag(name) => name,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, NamedRef::Branch(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, NamedRef::Tag(_))
    }

    /// Check the short name against the naming rules.
    pub fn validate(&self) -> Result<()> {
        validate_ref_name(self.name())
    }
}

impl fmt::Display for NamedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedRef::Branch(name) => write!(f, "branch {name}"),
            NamedRef::Tag(name) => write!(f, "tag {name}"),
        }
    }
}

/// A value together with the hash it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithHash<T> {
    pub value: T,
    pub hash: Hash,
}

impl<T> WithHash<T> {
    pub fn new(value: T, hash: Hash) -> Self {
        Self { value, hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert_eq!(NamedRef::branch("main").canonical_name(), "refs/heads/main");
        assert_eq!(NamedRef::tag("v1.0").canonical_name(), "refs/tags/v1.0");
    }

    #[test]
    fn parse_canonical_names() {
        assert_eq!(
            NamedRef::from_canonical("refs/heads/feature/x").unwrap(),
            NamedRef::branch("feature/x")
        );
        assert_eq!(
            NamedRef::from_canonical("refs/tags/v2").unwrap(),
            NamedRef::tag("v2")
        );
    }

    #[test]
    fn parse_rejects_other_namespaces() {
        let err = NamedRef::from_canonical("refs/remotes/origin/main").unwrap_err();
        assert!(matches!(err, RefError::UnknownNamespace(_)));
    }

    #[test]
    fn parse_rejects_invalid_short_name() {
        let err = NamedRef::from_canonical("refs/heads/a..b").unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));
    }

    #[test]
    fn kind_predicates() {
        assert!(NamedRef::branch("main").is_branch());
        assert!(!NamedRef::branch("main").is_tag());
        assert!(NamedRef::tag("v1").is_tag());
    }

    #[test]
    fn display_includes_kind() {
        assert_eq!(NamedRef::branch("main").to_string(), "branch main");
        assert_eq!(NamedRef::tag("v1").to_string(), "tag v1");
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&NamedRef::branch("main")).unwrap();
        assert_eq!(json, r#"{"type":"branch","name":"main"}"#);
        let parsed: NamedRef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, NamedRef::branch("main"));
    }
}
