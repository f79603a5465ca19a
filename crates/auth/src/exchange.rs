//! Three-legged token exchange (OAuth 1.0a request token → access token).
//!
//! Two stateless steps: [`TokenExchange::begin`] obtains a request-token
//! pair and the URL to send the user to; [`TokenExchange::complete`] trades
//! that pair plus the verifier the provider handed the user for an access
//! pair. Nothing is kept between the steps.

use crate::oauth1::{Signer, TokenPair, encode};
use crate::rejection::{provider_rejection, transport_rejection};
use credgate_types::{
    AuthorizationRequest, Fault, Outcome, PendingExchange, ThreeLeggedCredential,
};
use rquest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct RequestTokenResponse {
    oauth_token: String,
    oauth_token_secret: String,
    #[serde(default)]
    oauth_callback_confirmed: Option<String>,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    oauth_token: String,
    oauth_token_secret: String,
}

/// Drives both legs of the exchange for one consumer application.
pub struct TokenExchange {
    http: Client,
    signer: Signer,
    api_url: String,
}

impl TokenExchange {
    pub fn new(http: Client, signer: Signer, api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            http,
            signer,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn request_token_url(&self) -> String {
        format!("{}/oauth/request_token", self.api_url)
    }

    #[must_use]
    pub fn access_token_url(&self) -> String {
        format!("{}/oauth/access_token", self.api_url)
    }

    /// Where the user approves the request token.
    #[must_use]
    pub fn authorization_url(&self, request_token: &str) -> String {
        format!(
            "{}/oauth/authorize?oauth_token={}",
            self.api_url,
            encode(request_token)
        )
    }

    /// Obtains a request-token pair bound to `callback_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider refuses, is
    /// unreachable, answers with an unreadable body, or does not confirm
    /// the callback.
    pub async fn begin(&self, callback_url: &str) -> Outcome<AuthorizationRequest> {
        let url = self.request_token_url();
        let header =
            self.signer
                .authorize("POST", &url, &[], None, &[("oauth_callback", callback_url)]);
        let body = self.post(&url, header).await?;

        let parsed: RequestTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| Fault::provider(format!("malformed request token response: {e}")))?;
        if parsed.oauth_callback_confirmed.as_deref() != Some("true") {
            tracing::warn!(callback = callback_url, "provider did not confirm oauth callback");
            return Err(Fault::provider("oauth callback was not confirmed"));
        }

        tracing::info!("issued request token");
        Ok(AuthorizationRequest {
            authorization_url: self.authorization_url(&parsed.oauth_token),
            pending: PendingExchange::new(parsed.oauth_token, parsed.oauth_token_secret),
        })
    }

    /// Trades the pending pair and `verifier` for the user's access pair.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the pair is unknown, expired or
    /// does not match the verifier, or if the provider cannot be reached.
    pub async fn complete(
        &self,
        pending: &PendingExchange,
        verifier: &str,
    ) -> Outcome<ThreeLeggedCredential> {
        let url = self.access_token_url();
        let header = self.signer.authorize(
            "POST",
            &url,
            &[],
            Some(TokenPair::new(&pending.request_token, &pending.request_secret)),
            &[("oauth_verifier", verifier)],
        );
        let body = self.post(&url, header).await?;

        let parsed: AccessTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| Fault::provider(format!("malformed access token response: {e}")))?;
        tracing::info!("exchanged request token for access token");
        Ok(ThreeLeggedCredential::new(
            parsed.oauth_token,
            parsed.oauth_token_secret,
        ))
    }

    async fn post(&self, url: &str, authorization: String) -> Outcome<String> {
        let resp = self
            .http
            .post(url)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| transport_rejection(&e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_rejection(&e))?;
        if status.is_success() {
            Ok(body)
        } else {
            let fault = provider_rejection(status.as_u16(), &body);
            tracing::warn!(url, status = status.as_u16(), error = %fault, "token exchange rejected");
            Err(fault)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth1::header_param;
    use axum::{Router, http::HeaderMap, http::StatusCode, routing::post};

    fn auth_header(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    async fn request_token(headers: HeaderMap) -> (StatusCode, String) {
        let h = auth_header(&headers);
        if header_param(&h, "oauth_callback").is_none()
            || header_param(&h, "oauth_signature").is_none()
        {
            return (StatusCode::BAD_REQUEST, "missing callback".into());
        }
        (
            StatusCode::OK,
            "oauth_token=R1&oauth_token_secret=RS1&oauth_callback_confirmed=true".into(),
        )
    }

    async fn access_token(headers: HeaderMap) -> (StatusCode, String) {
        let h = auth_header(&headers);
        let token = header_param(&h, "oauth_token");
        let verifier = header_param(&h, "oauth_verifier");
        if token.as_deref() == Some("R1") && verifier.as_deref() == Some("good") {
            (
                StatusCode::OK,
                "oauth_token=A1&oauth_token_secret=AS1&user_id=42&screen_name=ada".into(),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                r#"{"errors":[{"code":89,"message":"Invalid request token."}]}"#.into(),
            )
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn provider() -> TokenExchange {
        let router = Router::new()
            .route("/oauth/request_token", post(request_token))
            .route("/oauth/access_token", post(access_token));
        let url = spawn(router).await;
        TokenExchange::new(Client::new(), Signer::new("ck", "cs"), url)
    }

    #[tokio::test]
    async fn test_begin_returns_pending_pair_and_url() {
        let exchange = provider().await;
        let req = exchange.begin("https://cb").await.unwrap();
        assert_eq!(req.pending.request_token, "R1");
        assert_eq!(req.pending.request_secret, "RS1");
        assert!(req.authorization_url.ends_with("/oauth/authorize?oauth_token=R1"));
        assert!(req.pending.created_at > 0);
    }

    #[tokio::test]
    async fn test_complete_with_matching_verifier() {
        let exchange = provider().await;
        let req = exchange.begin("https://cb").await.unwrap();
        let cred = exchange.complete(&req.pending, "good").await.unwrap();
        assert_eq!(cred, ThreeLeggedCredential::new("A1", "AS1"));
    }

    #[tokio::test]
    async fn test_complete_with_bad_verifier_is_provider_rejected() {
        let exchange = provider().await;
        let req = exchange.begin("https://cb").await.unwrap();
        let err = exchange.complete(&req.pending, "bad").await.unwrap_err();
        let Fault::ProviderRejected(reason) = err else {
            panic!("expected provider rejection, got {err:?}");
        };
        assert!(reason.contains("Invalid request token."));
    }

    #[tokio::test]
    async fn test_old_pending_pair_still_accepted() {
        let exchange = provider().await;
        let mut pending = exchange.begin("https://cb").await.unwrap().pending;
        pending.created_at = 0;
        assert!(exchange.complete(&pending, "good").await.is_ok());
    }

    #[tokio::test]
    async fn test_unconfirmed_callback_is_rejected() {
        let router = Router::new().route(
            "/oauth/request_token",
            post(|| async { "oauth_token=R1&oauth_token_secret=RS1&oauth_callback_confirmed=false" }),
        );
        let url = spawn(router).await;
        let exchange = TokenExchange::new(Client::new(), Signer::new("ck", "cs"), url);
        assert!(matches!(
            exchange.begin("https://cb").await,
            Err(Fault::ProviderRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_provider_rejected() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let exchange =
            TokenExchange::new(Client::new(), Signer::new("ck", "cs"), format!("http://{addr}"));
        assert!(matches!(
            exchange.begin("https://cb").await,
            Err(Fault::ProviderRejected(_))
        ));
    }

    #[test]
    fn test_authorization_url_encodes_token() {
        let exchange = TokenExchange::new(Client::new(), Signer::new("ck", "cs"), "https://api.x/");
        assert_eq!(
            exchange.authorization_url("a b"),
            "https://api.x/oauth/authorize?oauth_token=a%20b"
        );
    }
}
