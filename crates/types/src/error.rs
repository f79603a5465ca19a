//! Outcome/fault taxonomy shared by every credgate crate.
//!
//! Every failure is mapped to exactly one [`Fault`] kind at the point where
//! it occurs. Callers pass faults through unchanged; only the HTTP boundary
//! decides how a kind is rendered.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// HTTP status the identity store uses to reject the gateway's own credentials.
pub const STORE_UNAUTHORIZED: u16 = 401;

/// Enumerates the terminal failure kinds of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The caller or request is at fault: bad parameters, provider never linked.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provider refused the credential or the requested operation.
    ///
    /// The reason keeps the provider's raw code/message for logging only.
    #[error("provider rejected request: {0}")]
    ProviderRejected(String),

    /// The identity store could not be reached at all.
    ///
    /// The detail is diagnostic; no HTTP status exists for this kind.
    #[error("identity store unavailable: {0}")]
    StoreUnavailable(String),

    /// The identity store answered with a definite error.
    #[error("identity store rejected request: status={status}, reason={reason}")]
    StoreRejected { status: u16, reason: String },
}

/// The stable, payload-free kind of a [`Fault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    InvalidInput,
    ProviderRejected,
    StoreUnavailable,
    StoreRejected,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::ProviderRejected => write!(f, "provider_rejected"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
            Self::StoreRejected => write!(f, "store_rejected"),
        }
    }
}

impl Fault {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    pub fn provider(reason: impl Into<String>) -> Self {
        Self::ProviderRejected(reason.into())
    }

    pub fn store_rejected(status: u16, reason: impl Into<String>) -> Self {
        Self::StoreRejected {
            status,
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::InvalidInput(_) => FaultKind::InvalidInput,
            Self::ProviderRejected(_) => FaultKind::ProviderRejected,
            Self::StoreUnavailable(_) => FaultKind::StoreUnavailable,
            Self::StoreRejected { .. } => FaultKind::StoreRejected,
        }
    }

    /// Returns `true` if the failure originated at the identity store.
    #[must_use]
    pub fn is_store_fault(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::StoreRejected { .. })
    }

    /// Returns `true` if the store rejected the gateway's own credentials.
    ///
    /// This is an operator configuration fault, never an end-user fault.
    #[must_use]
    pub fn is_operator_fault(&self) -> bool {
        matches!(self, Self::StoreRejected { status, .. } if *status == STORE_UNAUTHORIZED)
    }
}

/// Result of every core operation: `Ok(payload)` is the success outcome.
pub type Outcome<T> = std::result::Result<T, Fault>;
