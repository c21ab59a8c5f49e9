//! First-run creation of the default branch.

use tracing::{info, warn};
use vstore_store::{Hash, NamedRef, StoreError, VersionStore};

use crate::error::ProvisionResult;

/// Which path [`ensure_default_branch`] took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The store already had at least one reference.
    AlreadyInitialized,
    /// The default branch was created at the returned hash.
    Created(Hash),
    /// Creation lost a race with another initializer.
    Raced,
}

/// Make sure `store` has at least one reference, creating branch
/// `default_branch` at [`Hash::NO_ANCESTOR`] if it has none.
///
/// Only the first listing element is looked at. If creation fails because
/// the branch appeared in the meantime (or the store reports the start
/// position missing), the store counts as initialized.
pub fn ensure_default_branch(
    store: &dyn VersionStore,
    default_branch: &str,
) -> ProvisionResult<BootstrapOutcome> {
    if let Some(first) = store.named_refs()?.next() {
        first?;
        return Ok(BootstrapOutcome::AlreadyInitialized);
    }

    let branch = NamedRef::branch(default_branch);
    match store.create(&branch, None) {
        Ok(hash) => {
            info!(backend = store.backend(), branch = %branch, "created default branch");
            Ok(BootstrapOutcome::Created(hash))
        }
        Err(e @ (StoreError::ReferenceAlreadyExists(_) | StoreError::ReferenceNotFound(_))) => {
            warn!(
                backend = store.backend(),
                branch = %branch,
                error = %e,
                "default branch not created, store already initialized"
            );
            Ok(BootstrapOutcome::Raced)
        }
        Err(e) => Err(e.into()),
    }
}
