//! Provider credential representations and the pending three-legged exchange.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::CredentialKind;

/// A single opaque access token presented directly in each provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerCredential {
    pub access_token: String,
    /// Whether the token has been exchanged for a long-lived one.
    #[serde(default)]
    pub extended: bool,
}

impl BearerCredential {
    /// Create a short-lived (not yet extended) bearer credential.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            extended: false,
        }
    }

    /// Create a long-lived credential returned by a token extension.
    pub fn extended(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            extended: true,
        }
    }
}

/// An OAuth 1.0a token + secret pair used to sign each provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeLeggedCredential {
    pub access_token: String,
    pub access_secret: String,
}

impl ThreeLeggedCredential {
    pub fn new(access_token: impl Into<String>, access_secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            access_secret: access_secret.into(),
        }
    }
}

/// Tagged union over the two provider credential shapes.
///
/// One kind is never substituted for the other: the caller decides which
/// variant it needs and asks for exactly that one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderCredential {
    Bearer(BearerCredential),
    ThreeLegged(ThreeLeggedCredential),
}

impl ProviderCredential {
    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Bearer(_) => CredentialKind::Bearer,
            Self::ThreeLegged(_) => CredentialKind::ThreeLegged,
        }
    }

    #[must_use]
    pub fn as_bearer(&self) -> Option<&BearerCredential> {
        match self {
            Self::Bearer(c) => Some(c),
            Self::ThreeLegged(_) => None,
        }
    }

    #[must_use]
    pub fn as_three_legged(&self) -> Option<&ThreeLeggedCredential> {
        match self {
            Self::ThreeLegged(c) => Some(c),
            Self::Bearer(_) => None,
        }
    }
}

impl From<BearerCredential> for ProviderCredential {
    fn from(c: BearerCredential) -> Self {
        Self::Bearer(c)
    }
}

impl From<ThreeLeggedCredential> for ProviderCredential {
    fn from(c: ThreeLeggedCredential) -> Self {
        Self::ThreeLegged(c)
    }
}

/// The request-token pair handed to the caller between the two legs of a
/// three-legged exchange.
///
/// Never stored server-side: the caller echoes it back unmodified. Losing it
/// only means restarting the authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingExchange {
    pub request_token: String,
    pub request_secret: String,
    /// Unix seconds at which the request token was issued.
    #[serde(default)]
    pub created_at: u64,
}

impl PendingExchange {
    /// Create a pending exchange stamped with the current time.
    pub fn new(request_token: impl Into<String>, request_secret: impl Into<String>) -> Self {
        Self {
            request_token: request_token.into(),
            request_secret: request_secret.into(),
            created_at: unix_now(),
        }
    }
}

/// Result of the first leg: the pending pair plus where to send the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    #[serde(flatten)]
    pub pending: PendingExchange,
    pub authorization_url: String,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
