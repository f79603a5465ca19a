//! HTTP boundary: axum router, route handlers, fault rendering and meters.
//!
//! Every route validates its parameters, hands one [`Operation`] to the
//! [`CredentialCoordinator`] and renders the outcome. Faults are turned into
//! status codes by [`ApiError`] and nowhere else.

mod error;
mod facebook;
pub mod meters;
mod params;
mod twitter;

pub use error::ApiError;
pub use meters::Meters;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use credgate_broker::{CredentialCoordinator, Operation};
use credgate_types::{Payload, UserIdentity};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub coordinator: Arc<CredentialCoordinator>,
    /// In-memory request meters.
    pub meters: Arc<Meters>,
}

impl AppState {
    /// Creates a new shared application state wrapped in an `Arc`.
    pub fn new(coordinator: CredentialCoordinator) -> Arc<Self> {
        Arc::new(Self {
            coordinator: Arc::new(coordinator),
            meters: Arc::new(Meters::new()),
        })
    }
}

/// Build the outbound HTTP client shared by the store and provider calls.
///
/// An unparsable `proxy_url` is logged and ignored.
#[must_use]
pub fn build_http_client(proxy_url: Option<&str>, timeout: Duration) -> rquest::Client {
    let mut builder = rquest::Client::builder().timeout(timeout);
    if let Some(url) = proxy_url {
        match rquest::Proxy::all(url) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => {
                tracing::warn!(url = url, error = %e, "invalid proxy_url, using direct connection");
            }
        }
    }
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to build http client, using defaults");
        rquest::Client::new()
    })
}

/// Build the full axum router.
///
/// Routes:
/// - GET  /facebook/users | photos | videos | extendedToken   `?email=` + `password` header
/// - POST /facebook/publish                                    `?email=&type=&message=` + multipart
/// - GET  /facebook/oauthUrl                                   `?redirect=`
/// - GET  /twitter/users                                       `?email=` + `password` header
/// - POST /twitter/publish                                     `?email=&type=&message=` + multipart
/// - GET  /twitter/oauthUrl                                    `?redirect=`
/// - GET  /twitter/accessToken                                 `?oauth_request_token=&oauth_request_secret=&oauth_verifier=`
/// - GET  /health
/// - GET  /v0/management/meters
pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/facebook/users", get(facebook::users))
        .route("/facebook/photos", get(facebook::photos))
        .route("/facebook/videos", get(facebook::videos))
        .route("/facebook/publish", post(facebook::publish))
        .route("/facebook/extendedToken", get(facebook::extended_token))
        .route("/facebook/oauthUrl", get(facebook::oauth_url))
        .route("/twitter/users", get(twitter::users))
        .route("/twitter/publish", post(twitter::publish))
        .route("/twitter/oauthUrl", get(twitter::oauth_url))
        .route("/twitter/accessToken", get(twitter::access_token))
        .route("/health", get(health_handler))
        // Management API
        .route("/v0/management/meters", get(meters_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Runs `operation` through the coordinator and records the outcome.
pub(crate) async fn dispatch(
    state: &AppState,
    operation: Operation,
    identity: Option<&UserIdentity>,
) -> Result<Json<Payload>, ApiError> {
    let meter = format!("{}.{}", operation.provider(), operation.name());
    match state.coordinator.execute(operation, identity).await {
        Ok(payload) => {
            state.meters.record_success(&meter);
            Ok(Json(payload))
        }
        Err(fault) => {
            state.meters.record_failure(&meter, fault.kind());
            Err(ApiError(fault))
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn meters_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snap = state.meters.snapshot();
    Json(serde_json::to_value(snap).unwrap_or_default())
}
