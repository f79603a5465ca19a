//! Shared HTTP utilities for provider sessions.
//!
//! Every provider call goes send → status-check → decode, and every failure
//! along the way is a [`Fault::ProviderRejected`].

use credgate_auth::{provider_rejection, transport_rejection};
use credgate_types::{Fault, Outcome};
use rquest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Shared HTTP helper that all sessions use to send requests and classify
/// the response.
#[derive(Clone)]
pub struct ProviderHttp {
    http: Client,
}

impl ProviderHttp {
    /// Creates a new helper wrapping the given HTTP client.
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Returns a reference to the inner HTTP client for building requests.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Sends a request and returns the body of a successful response.
    ///
    /// # Errors
    ///
    /// Returns `Fault::ProviderRejected` on transport failure or a non-success
    /// status, keeping the provider's error text in the reason.
    pub async fn send(&self, builder: RequestBuilder) -> Outcome<String> {
        let resp = builder.send().await.map_err(|e| {
            let fault = transport_rejection(&e);
            tracing::warn!(error = %fault, "provider request failed");
            fault
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_rejection(&e))?;
        if status.is_success() {
            Ok(body)
        } else {
            let fault = provider_rejection(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %fault, "provider rejected request");
            Err(fault)
        }
    }

    /// Sends a request and decodes the JSON body of a successful response.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send); an undecodable body is also
    /// `Fault::ProviderRejected`.
    pub async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Outcome<T> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body)
            .map_err(|e| Fault::provider(format!("malformed provider response: {e}")))
    }
}
