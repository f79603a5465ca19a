//! HTTP client for the external identity service.
//!
//! The service exposes a single `users` resource keyed by the `email` query
//! parameter. The caller's secret travels in the `password` header and the
//! gateway authenticates itself with HTTP basic auth.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use credgate_types::{CredentialStore, Fault, IdentityRecord, Outcome, UserIdentity};
use rquest::{Client, RequestBuilder};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

/// Reason reported when a 2xx response does not carry an identity record.
pub const MALFORMED_RECORD: &str = "malformed identity record";

/// A [`CredentialStore`] backed by the remote identity service.
pub struct RemoteCredentialStore {
    http: Client,
    endpoint: String,
    user_key: String,
    user_secret: SecretString,
}

impl RemoteCredentialStore {
    /// Creates a store client for `endpoint`, authenticating as `user_key`.
    pub fn new(
        http: Client,
        endpoint: impl Into<String>,
        user_key: impl Into<String>,
        user_secret: impl Into<String>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user_key: user_key.into(),
            user_secret: SecretString::from(user_secret.into()),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.endpoint)
    }

    /// Basic auth header value for the gateway's own store credentials.
    fn basic_auth_header(&self) -> String {
        let cred = format!("{}:{}", self.user_key, self.user_secret.expose_secret());
        format!("Basic {}", STANDARD.encode(cred.as_bytes()))
    }

    fn authorize(&self, builder: RequestBuilder, identity: &UserIdentity) -> RequestBuilder {
        builder
            .query(&[("email", identity.id())])
            .header("Authorization", self.basic_auth_header())
            .header("password", identity.secret())
            .header("Accept", "application/json")
    }

    /// Sends a prepared request and classifies the response.
    async fn exchange(
        &self,
        builder: RequestBuilder,
        identity: &UserIdentity,
    ) -> Outcome<IdentityRecord> {
        let resp = builder.send().await.map_err(|e| {
            tracing::error!(identity = identity.id(), error = %e, "identity store unreachable");
            Fault::StoreUnavailable(e.to_string())
        })?;

        let status = resp.status();
        let code = status.as_u16();
        let canonical = status.canonical_reason();
        let body = resp
            .text()
            .await
            .map_err(|e| Fault::StoreUnavailable(format!("failed to read store response: {e}")))?;

        if !status.is_success() {
            let fault = Fault::store_rejected(code, rejection_reason(&body, canonical));
            if fault.is_operator_fault() {
                tracing::error!(
                    operator = true,
                    status = code,
                    "identity store rejected the gateway's credentials"
                );
            } else {
                tracing::warn!(identity = identity.id(), status = code, error = %fault, "identity store rejected request");
            }
            return Err(fault);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(identity = identity.id(), status = code, error = %e, "{MALFORMED_RECORD}");
            Fault::store_rejected(code, MALFORMED_RECORD)
        })
    }
}

#[async_trait]
impl CredentialStore for RemoteCredentialStore {
    async fn fetch(&self, identity: &UserIdentity) -> Outcome<IdentityRecord> {
        let builder = self.authorize(self.http.get(self.users_url()), identity);
        self.exchange(builder, identity).await
    }

    async fn update(
        &self,
        identity: &UserIdentity,
        record: &IdentityRecord,
    ) -> Outcome<IdentityRecord> {
        let builder = self
            .authorize(self.http.put(self.users_url()), identity)
            .json(record);
        self.exchange(builder, identity).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    reason: Option<String>,
    message: Option<String>,
}

/// Picks the most specific reason available for a store rejection.
fn rejection_reason(body: &str, canonical: Option<&str>) -> String {
    if let Ok(ErrorBody { reason, message }) = serde_json::from_str::<ErrorBody>(body)
        && let Some(reason) = reason.or(message).filter(|r| !r.is_empty())
    {
        return reason;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    canonical.unwrap_or("unknown error").to_string()
}
