//! In-memory request meters, one entry per `provider.operation`.

use credgate_types::FaultKind;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global request counters.
#[derive(Default)]
pub struct Meters {
    pub total_requests: AtomicU64,
    pub success_requests: AtomicU64,
    pub failure_requests: AtomicU64,
    operations: Mutex<HashMap<String, OperationMeter>>,
}

/// Per-operation counters.
#[derive(Debug, Default, Clone, Serialize)]
pub struct OperationMeter {
    pub requests: u64,
    pub success: u64,
    pub failure: u64,
    /// Failures broken down by fault kind.
    pub faults: BTreeMap<String, u64>,
}

/// JSON-serializable snapshot of the current meters.
#[derive(Serialize)]
pub struct MetersSnapshot {
    pub total_requests: u64,
    pub success_requests: u64,
    pub failure_requests: u64,
    pub operations: BTreeMap<String, OperationMeter>,
}

impl Meters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, operation: &str) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.success_requests.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut map) = self.operations.lock() {
            let entry = map.entry(operation.to_string()).or_default();
            entry.requests += 1;
            entry.success += 1;
        }
    }

    pub fn record_failure(&self, operation: &str, kind: FaultKind) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failure_requests.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut map) = self.operations.lock() {
            let entry = map.entry(operation.to_string()).or_default();
            entry.requests += 1;
            entry.failure += 1;
            *entry.faults.entry(kind.to_string()).or_default() += 1;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> MetersSnapshot {
        let operations = self
            .operations
            .lock()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        MetersSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            success_requests: self.success_requests.load(Ordering::Relaxed),
            failure_requests: self.failure_requests.load(Ordering::Relaxed),
            operations,
        }
    }
}
