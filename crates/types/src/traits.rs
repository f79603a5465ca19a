//! Async traits shared across credgate crates.
//!
//! Cross-crate seams are defined here so that higher layers depend only on
//! `credgate-types`, not on each other.

use crate::{IdentityRecord, Outcome, UserIdentity};
use async_trait::async_trait;

/// The external identity store holding users' provider credentials.
///
/// Implementations must keep three failure shapes apart:
/// - the store cannot be reached → [`Fault::StoreUnavailable`](crate::Fault::StoreUnavailable);
/// - the store rejected the gateway's own credentials →
///   [`Fault::StoreRejected`](crate::Fault::StoreRejected) with status 401;
/// - any other error response → `StoreRejected` with that status and reason.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the identity record for `identity`.
    async fn fetch(&self, identity: &UserIdentity) -> Outcome<IdentityRecord>;

    /// Write `record` back for `identity`, returning the store's view of it.
    async fn update(
        &self,
        identity: &UserIdentity,
        record: &IdentityRecord,
    ) -> Outcome<IdentityRecord>;
}
