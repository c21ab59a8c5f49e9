use std::fmt;

use vstore_refs::{NamedRef, WithHash};
use vstore_types::Hash;

use crate::error::{StoreError, StoreResult};
use crate::worker::StoreWorker;

/// Lazy sequence of references returned by [`VersionStore::named_refs`].
pub type RefIter<'a> = Box<dyn Iterator<Item = StoreResult<WithHash<NamedRef>>> + 'a>;

/// A versioned store of named references over commit histories.
///
/// Implementations must be thread-safe (`Send + Sync`): the provisioned
/// store is shared by every request handler in the process.
pub trait VersionStore: fmt::Debug + Send + Sync {
    /// Short backend name used in log messages (e.g. `"in-memory"`).
    fn backend(&self) -> &'static str;

    /// List every named reference with the hash it points at.
    ///
    /// The sequence is finite and restartable: each call starts over from
    /// the current state. Items are `Err` when reading a single entry fails.
    fn named_refs(&self) -> StoreResult<RefIter<'_>>;

    /// Create `reference` pointing at `target`, or at
    /// [`Hash::NO_ANCESTOR`] when `target` is `None`.
    ///
    /// Fails with [`StoreError::ReferenceAlreadyExists`] if the name is
    /// taken and [`StoreError::ReferenceNotFound`] if `target` is unknown.
    fn create(&self, reference: &NamedRef, target: Option<Hash>) -> StoreResult<Hash>;

    /// Resolve a reference to the hash it points at.
    fn to_hash(&self, reference: &NamedRef) -> StoreResult<Hash>;

    /// Serializers for contents and commit metadata.
    fn worker(&self) -> &StoreWorker;
}

/// Validate a create request and return the hash the reference will get.
pub(crate) fn resolve_target(reference: &NamedRef, target: Option<Hash>) -> StoreResult<Hash> {
    reference.validate()?;
    match (reference, target) {
        (NamedRef::Tag(name), None) => Err(StoreError::InvalidArgument(format!(
            "tag {name} requires a target hash"
        ))),
        (_, target) => Ok(target.unwrap_or(Hash::NO_ANCESTOR)),
    }
}

/// Fail with `ReferenceNotFound` unless `target` is the empty position or
/// one of `known`.
pub(crate) fn ensure_known(
    target: Hash,
    mut known: impl Iterator<Item = StoreResult<Hash>>,
) -> StoreResult<()> {
    if target.is_no_ancestor() {
        return Ok(());
    }
    for hash in &mut known {
        if hash? == target {
            return Ok(());
        }
    }
    Err(StoreError::ReferenceNotFound(format!("hash {target}")))
}

/// Fail with `ReferenceAlreadyExists` if `reference` and an existing
/// reference would nest inside each other (`main` and `main/x`).
///
/// Disk repositories cannot hold both, so no adapter allows it.
pub(crate) fn ensure_no_nesting(
    reference: &NamedRef,
    existing: impl Iterator<Item = StoreResult<NamedRef>>,
) -> StoreResult<()> {
    let wanted = reference.canonical_name();
    for other in existing {
        let other = other?.canonical_name();
        if nests_in(&wanted, &other) || nests_in(&other, &wanted) {
            return Err(StoreError::ReferenceAlreadyExists(other));
        }
    }
    Ok(())
}

fn nests_in(child: &str, parent: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(names: &[NamedRef]) -> impl Iterator<Item = StoreResult<NamedRef>> + '_ {
        names.iter().cloned().map(Ok)
    }

    #[test]
    fn nested_names_conflict_both_ways() {
        let main = [NamedRef::branch("main")];
        let err = ensure_no_nesting(&NamedRef::branch("main/x"), existing(&main)).unwrap_err();
        assert!(matches!(err, StoreError::ReferenceAlreadyExists(ref n) if n == "refs/heads/main"));

        let nested = [NamedRef::branch("main/x")];
        assert!(ensure_no_nesting(&NamedRef::branch("main"), existing(&nested)).is_err());
    }

    #[test]
    fn shared_prefixes_and_other_namespaces_do_not_conflict() {
        let refs = [NamedRef::branch("main"), NamedRef::tag("main")];
        ensure_no_nesting(&NamedRef::branch("mainline"), existing(&refs)).unwrap();
        ensure_no_nesting(&NamedRef::tag("v1/x"), existing(&refs)).unwrap();
    }

    #[test]
    fn branch_without_target_points_at_no_ancestor() {
        let hash = resolve_target(&NamedRef::branch("main"), None).unwrap();
        assert_eq!(hash, Hash::NO_ANCESTOR);
    }

    #[test]
    fn tag_requires_target() {
        let err = resolve_target(&NamedRef::tag("v1"), None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let err = resolve_target(&NamedRef::branch("a b"), None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
    }

    #[test]
    fn unknown_target_is_not_found() {
        let target = Hash::of(b"nowhere");
        let err = ensure_known(target, std::iter::empty()).unwrap_err();
        assert!(matches!(err, StoreError::ReferenceNotFound(_)));
    }

    #[test]
    fn known_target_is_accepted() {
        let target = Hash::of(b"somewhere");
        ensure_known(target, vec![Ok(Hash::of(b"x")), Ok(target)].into_iter()).unwrap();
        ensure_known(Hash::NO_ANCESTOR, std::iter::empty()).unwrap();
    }
}
