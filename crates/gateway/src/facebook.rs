//! `/facebook/*` route handlers.

use axum::{
    Json,
    extract::{
        Multipart, Query, State, multipart::MultipartRejection, rejection::QueryRejection,
    },
    http::{HeaderMap, StatusCode},
};
use credgate_broker::{MediaKind, Operation};
use credgate_types::{Payload, ProviderId};
use std::sync::Arc;

use crate::params::{self, IdentityQuery, PublishQuery, RedirectQuery};
use crate::{ApiError, AppState, dispatch};

const PROVIDER: ProviderId = ProviderId::Facebook;

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

pub async fn photos(
    State(state): State<Arc<AppState>>,
    q: Result<Query<IdentityQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    list(&state, q, &headers, MediaKind::Photos).await
}

pub async fn videos(
    State(state): State<Arc<AppState>>,
    q: Result<Query<IdentityQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    list(&state, q, &headers, MediaKind::Videos).await
}

async fn list(
    state: &AppState,
    q: IdentityQuery,
    headers: &HeaderMap,
    media: MediaKind,
) -> Result<Json<Payload>, ApiError> {
    let identity = params::identity(q.email, headers)?;
    let op = Operation::ListMedia {
        provider: PROVIDER,
        media,
    };
    dispatch(state, op, Some(&identity)).await
}

/// `POST /facebook/publish?email=&type=&message=` with an optional
/// multipart body carrying `file` and, for videos, `title`.
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

/// `GET /facebook/extendedToken?email=`: swaps the stored token for a
/// long-lived one and writes it back.
pub async fn extended_token(
    State(state): State<Arc<AppState>>,
    q: Result<Query<IdentityQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    let identity = params::identity(q.email, &headers)?;
    let op = Operation::ExtendCredential { provider: PROVIDER };
    dispatch(&state, op, Some(&identity)).await
}

pub async fn oauth_url(
    State(state): State<Arc<AppState>>,
    q: Result<Query<RedirectQuery>, QueryRejection>,
) -> Result<Json<Payload>, ApiError> {
    let q = params::query(q)?;
    let redirect_url = params::present(q.redirect)
        .ok_or_else(|| ApiError::invalid("a redirect URL is required to get an OAuth URL"))?;
    let op = Operation::AuthorizationUrl {
        provider: PROVIDER,
        redirect_url,
    };
    dispatch(&state, op, None).await
}
