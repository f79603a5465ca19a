//! Provider identifiers and the credential kind each one requires.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a supported upstream identity/content provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Bearer-token provider (Graph-style API, token extension).
    Facebook,
    /// OAuth 1.0a three-legged provider (signed requests).
    Twitter,
}

/// The shape of credential a provider issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// A single opaque access token presented in each request.
    Bearer,
    /// A token + secret pair used to sign each request.
    ThreeLegged,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facebook => write!(f, "facebook"),
            Self::Twitter => write!(f, "twitter"),
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer => write!(f, "bearer"),
            Self::ThreeLegged => write!(f, "three_legged"),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = crate::Fault;

    /// Parse a lowercase provider name into a [`ProviderId`].
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`](crate::Fault::InvalidInput) for unknown names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" | "fb" => Ok(Self::Facebook),
            "twitter" | "x" => Ok(Self::Twitter),
            other => Err(crate::Fault::invalid(format!("unknown provider: {other}"))),
        }
    }
}

impl ProviderId {
    /// Returns all known provider variants.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Facebook, Self::Twitter]
    }

    /// The credential kind this provider issues.
    #[must_use]
    pub fn kind(self) -> CredentialKind {
        match self {
            Self::Facebook => CredentialKind::Bearer,
            Self::Twitter => CredentialKind::ThreeLegged,
        }
    }
}
