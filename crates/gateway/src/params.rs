//! Request parameter extraction shared by the provider routes.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query};
use axum::http::HeaderMap;
use credgate_types::{MediaUpload, PublishRequest, PublishType, UserIdentity};
use serde::Deserialize;

use crate::ApiError;

/// Header carrying the caller-supplied identity secret.
pub const PASSWORD_HEADER: &str = "password";

#[derive(Debug, Deserialize)]
pub struct IdentityQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishQuery {
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccessTokenQuery {
    pub oauth_request_token: Option<String>,
    pub oauth_request_secret: Option<String>,
    pub oauth_verifier: Option<String>,
}

/// Unwraps a query extractor, rendering a malformed query string as invalid
/// input.
///
/// # Errors
///
/// Returns an invalid-input [`ApiError`] carrying the rejection text.
pub fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::invalid(format!("malformed query string: {}", e.body_text())))
}

/// Returns the trimmed value, or `None` when absent or blank.
pub fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the [`UserIdentity`] from the `email` query parameter and the
/// `password` header.
///
/// # Errors
///
/// Returns an invalid-input [`ApiError`] if either is missing or empty.
pub fn identity(email: Option<String>, headers: &HeaderMap) -> Result<UserIdentity, ApiError> {
    let email = present(email)
        .ok_or_else(|| ApiError::invalid("the 'email' query parameter is required"))?;
    let password = headers
        .get(PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::invalid("incorrect or missing header credentials"))?;
    Ok(UserIdentity::new(email, password))
}

/// Assembles a [`PublishRequest`] from the query and the optional
/// multipart body (`file`, `title`).
///
/// # Errors
///
/// Returns an invalid-input [`ApiError`] for a missing or unknown `type`, or
/// an unreadable multipart body. File/message requirements are checked by
/// [`PublishRequest::validate`].
pub async fn publish_request(
    kind: Option<String>,
    message: Option<String>,
    body: Result<Multipart, MultipartRejection>,
) -> Result<PublishRequest, ApiError> {
    let kind: PublishType = present(kind)
        .ok_or_else(|| ApiError::invalid("the 'type' query parameter is required"))?
        .parse()?;

    let mut media = None;
    let mut title = None;
    // A text post may arrive without any body at all.
    if let Ok(mut form) = body {
        while let Some(field) = form
            .next_field()
            .await
            .map_err(|e| ApiError::invalid(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::invalid(format!("unreadable file: {e}")))?;
                    if !bytes.is_empty() {
                        media = Some(MediaUpload {
                            file_name,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                Some("title") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::invalid(format!("unreadable title: {e}")))?;
                    title = Some(text).filter(|t| !t.is_empty());
                }
                _ => {}
            }
        }
    }

    Ok(PublishRequest {
        kind,
        message: present(message),
        title,
        media,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_requires_email() {
        let mut headers = HeaderMap::new();
        headers.insert(PASSWORD_HEADER, HeaderValue::from_static("pw"));
        assert!(identity(None, &headers).is_err());
        assert!(identity(Some("  ".into()), &headers).is_err());
        let id = identity(Some("a@example.com".into()), &headers).unwrap();
        assert_eq!(id.id(), "a@example.com");
        assert_eq!(id.secret(), "pw");
    }

    #[test]
    fn test_identity_requires_password() {
        let mut headers = HeaderMap::new();
        assert!(identity(Some("a@example.com".into()), &headers).is_err());
        headers.insert(PASSWORD_HEADER, HeaderValue::from_static(""));
        assert!(identity(Some("a@example.com".into()), &headers).is_err());
    }

    #[test]
    fn test_present_trims() {
        assert_eq!(present(Some(" x ".into())), Some("x".into()));
        assert_eq!(present(Some(String::new())), None);
        assert_eq!(present(None), None);
    }
}
