//! Per-identity async locks serializing credential refreshes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async lock per identity id.
#[derive(Default)]
pub struct RefreshGuards {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl RefreshGuards {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other refresh for `identity` is running.
    pub async fn acquire(&self, identity: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // entries nobody holds or waits on
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            Arc::clone(locks.entry(identity.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of identities with a refresh in flight or queued.
    #[must_use]
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|l| Arc::strong_count(l) > 1).count()
    }
}
