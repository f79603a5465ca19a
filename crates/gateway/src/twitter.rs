//! `/twitter/*` route handlers.

use axum::{
    Json,
    extract::{
        Multipart, Query, State, multipart::MultipartRejection, rejection::QueryRejection,
    },
    http::{HeaderMap, StatusCode},
};
use credgate_broker::Operation;
use credgate_types::{Payload, PendingExchange, ProviderId};
use std::sync::Arc;

use crate::params::{self, AccessTokenQuery, IdentityQuery, PublishQuery, RedirectQuery};
use crate::{ApiError, AppState, dispatch};

const PROVIDER: ProviderId = ProviderId::Twitter;

pub async fn users(
    State(state): State<Arc<AppState>>,
    q: Result<Query<IdentityQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    let identity = params::identity(q.email, &headers)?;
    let op = Operation::GetIdentity { provider: PROVIDER };
    dispatch(&state, op, Some(&identity)).await
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    q: Result<Query<PublishQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Payload>), ApiError> {
    let q = params::query(q)?;
    let identity = params::identity(q.email, &headers)?;
    let request = params::publish_request(q.kind, q.message, body).await?;
    let op = Operation::Publish {
        provider: PROVIDER,
        request,
    };
    let created = dispatch(&state, op, Some(&identity)).await?;
    Ok((StatusCode::CREATED, created))
}

/// `GET /twitter/oauthUrl?redirect=`: obtains a request token and returns
/// it together with the URL the user must visit.
pub async fn oauth_url(
    State(state): State<Arc<AppState>>,
    q: Result<Query<RedirectQuery>, QueryRejection>,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    let callback_url = params::present(q.redirect)
        .ok_or_else(|| ApiError::invalid("a redirect URL is required to get an OAuth URL"))?;
    let op = Operation::BeginExchange {
        provider: PROVIDER,
        callback_url,
    };
    dispatch(&state, op, None).await
}

/// `GET /twitter/accessToken`: completes the exchange started by
/// [`oauth_url`]. Nothing is persisted; the caller links the returned
/// credential.
pub async fn access_token(
    State(state): State<Arc<AppState>>,
    q: Result<Query<AccessTokenQuery>, QueryRejection>,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    let token = params::present(q.oauth_request_token)
        .ok_or_else(|| ApiError::invalid("the original OAuth request token is required"))?;
    let secret = params::present(q.oauth_request_secret)
        .ok_or_else(|| ApiError::invalid("the original OAuth request token secret is required"))?;
    let verifier = params::present(q.oauth_verifier)
        .ok_or_else(|| ApiError::invalid("an OAuth verifier is required to get an access token"))?;
    let op = Operation::CompleteExchange {
        provider: PROVIDER,
        pending: PendingExchange::new(token, secret),
        verifier,
    };
    dispatch(&state, op, None).await
}
