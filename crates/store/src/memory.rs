//! In-memory identity store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use credgate_types::{CredentialStore, Fault, IdentityRecord, Outcome, UserIdentity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

struct Entry {
    secret: String,
    record: IdentityRecord,
}

/// An in-memory [`CredentialStore`] for development and tests.
///
/// Behaves like the remote service: unknown identities are rejected with
/// 404 and a wrong secret with 403. [`set_available`](Self::set_available)
/// simulates an unreachable store.
pub struct InMemoryCredentialStore {
    /// Identity-keyed records with the secret that unlocks each one.
    data: Mutex<HashMap<String, Entry>>,
    available: AtomicBool,
}

impl InMemoryCredentialStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Registers (or replaces) an identity, keyed by `record.id`.
    pub fn insert(&self, secret: impl Into<String>, record: IdentityRecord) {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.insert(
            record.id.clone(),
            Entry {
                secret: secret.into(),
                record,
            },
        );
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_identity(self, secret: impl Into<String>, record: IdentityRecord) -> Self {
        self.insert(secret, record);
        self
    }

    /// Switches the store on- or offline. While offline every call fails
    /// with [`Fault::StoreUnavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Current record for `id`, bypassing the secret check.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<IdentityRecord> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.get(id).map(|e| e.record.clone())
    }

    fn ensure_available(&self) -> Outcome<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Fault::StoreUnavailable("in-memory store is offline".into()))
        }
    }

    fn authorize<'a>(entry: Option<&'a mut Entry>, identity: &UserIdentity) -> Outcome<&'a mut Entry> {
        match entry {
            None => Err(Fault::store_rejected(404, "not found")),
            Some(e) if e.secret != identity.secret() => {
                Err(Fault::store_rejected(403, "incorrect password"))
            }
            Some(e) => Ok(e),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn fetch(&self, identity: &UserIdentity) -> Outcome<IdentityRecord> {
        self.ensure_available()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = Self::authorize(data.get_mut(identity.id()), identity)?;
        Ok(entry.record.clone())
    }

    async fn update(
        &self,
        identity: &UserIdentity,
        record: &IdentityRecord,
    ) -> Outcome<IdentityRecord> {
        self.ensure_available()?;
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = Self::authorize(data.get_mut(identity.id()), identity)?;
        entry.record = record.clone();
        Ok(entry.record.clone())
    }
}
