//! Application-level user identity and the identity store's user record.

use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::{BearerCredential, ProviderCredential, ProviderId, ThreeLeggedCredential};

/// Who a request is made for, plus the secret that authorizes reading and
/// writing their identity record.
///
/// The secret is never a provider credential and never appears in `Debug`.
pub struct UserIdentity {
    id: String,
    secret: SecretString,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// The email or username identifying the user.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The caller-supplied record secret.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("id", &self.id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// The identity store's representation of a user.
///
/// Fields this crate does not understand are kept in `extra` and written
/// back verbatim, so rewriting one credential never clobbers the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    #[serde(default)]
    pub credentials: BTreeMap<ProviderId, ProviderCredential>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityRecord {
    /// Creates a record with no linked providers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            credentials: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Returns the stored credential for `provider`, whatever its shape.
    #[must_use]
    pub fn credential(&self, provider: ProviderId) -> Option<&ProviderCredential> {
        self.credentials.get(&provider)
    }

    /// Returns the bearer credential for `provider`, if one is linked.
    #[must_use]
    pub fn bearer(&self, provider: ProviderId) -> Option<&BearerCredential> {
        self.credential(provider)
            .and_then(ProviderCredential::as_bearer)
    }

    /// Returns the three-legged credential for `provider`, if one is linked.
    #[must_use]
    pub fn three_legged(&self, provider: ProviderId) -> Option<&ThreeLeggedCredential> {
        self.credential(provider)
            .and_then(ProviderCredential::as_three_legged)
    }

    /// Replaces the single credential entry for `provider`.
    #[must_use]
    pub fn with_credential(
        mut self,
        provider: ProviderId,
        credential: impl Into<ProviderCredential>,
    ) -> Self {
        self.credentials.insert(provider, credential.into());
        self
    }
}
