//! Bearer token extension.
//!
//! Trades a short-lived bearer token for a long-lived one through the
//! Graph API's `fb_exchange_token` grant. The old token stays valid, so
//! extending the same token twice yields two usable tokens.

use crate::rejection::{provider_rejection, transport_rejection};
use credgate_types::{BearerCredential, Fault, Outcome};
use rquest::Client;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

#[derive(Deserialize)]
struct ExtendedTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Extends bearer credentials for one application.
pub struct TokenRefresh {
    http: Client,
    graph_url: String,
    app_id: String,
    app_secret: SecretString,
}

impl TokenRefresh {
    pub fn new(
        http: Client,
        graph_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        let graph_url: String = graph_url.into();
        Self {
            http,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            app_secret: SecretString::from(app_secret.into()),
        }
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/access_token", self.graph_url)
    }

    /// Exchanges `current` for a long-lived credential.
    ///
    /// Never touches the identity store.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider reports the token
    /// invalid, is unreachable, or answers without an access token.
    pub async fn extend(&self, current: &BearerCredential) -> Outcome<BearerCredential> {
        let query = [
            ("grant_type", "fb_exchange_token"),
            ("client_id", self.app_id.as_str()),
            ("client_secret", self.app_secret.expose_secret()),
            ("fb_exchange_token", current.access_token.as_str()),
        ];
        let resp = self
            .http
            .get(self.token_url())
            .query(&query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| transport_rejection(&e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_rejection(&e))?;
        if !status.is_success() {
            let fault = provider_rejection(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %fault, "token extension rejected");
            return Err(fault);
        }

        let parsed: ExtendedTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Fault::provider(format!("malformed token response: {e}")))?;
        tracing::info!(expires_in = ?parsed.expires_in, "extended bearer token");
        Ok(BearerCredential::extended(parsed.access_token))
    }
}
