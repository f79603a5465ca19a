//! API error type that renders a [`Fault`] as an HTTP response.
//!
//! This is the only place a fault kind is turned into a status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use credgate_types::Fault;
use serde_json::json;

/// Wrapper around [`Fault`] that implements [`IntoResponse`].
#[derive(Debug)]
pub struct ApiError(pub Fault);

impl ApiError {
    /// Shorthand for a rejected request parameter.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self(Fault::invalid(reason))
    }

    /// Returns `(status, error_type)` for the wrapped fault.
    fn classify(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Fault::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            Fault::ProviderRejected(_) => (StatusCode::BAD_GATEWAY, "provider_error"),
            Fault::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            fault @ Fault::StoreRejected { .. } if fault.is_operator_fault() => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_configuration_error",
            ),
            Fault::StoreRejected { status, .. } => (store_status(*status), "store_error"),
        }
    }
}

/// Passes a store error status through only when it is a 4xx or 5xx. A
/// store that answered 2xx with an unusable body is a bad gateway.
fn store_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(s) if s.is_client_error() || s.is_server_error() => s,
        Ok(s) if s.is_success() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.classify();
        (
            status,
            Json(json!({
                "error": {
                    "message": self.0.to_string(),
                    "type": error_type,
                    "kind": self.0.kind(),
                }
            })),
        )
            .into_response()
    }
}

impl From<Fault> for ApiError {
    fn from(f: Fault) -> Self {
        Self(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt as _;

    async fn extract_error_body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let (status, body) = extract_error_body(ApiError::invalid("an email is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["kind"], "invalid_input");
        assert_eq!(
            body["error"]["message"],
            "invalid input: an email is required"
        );
    }

    #[tokio::test]
    async fn test_provider_rejected_is_bad_gateway() {
        let (status, body) =
            extract_error_body(ApiError(Fault::provider("status 400: expired"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "provider_error");
    }

    #[tokio::test]
    async fn test_store_unavailable() {
        let (status, body) =
            extract_error_body(ApiError(Fault::StoreUnavailable("connection refused".into())))
                .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["kind"], "store_unavailable");
    }

    #[tokio::test]
    async fn test_store_rejected_keeps_status() {
        let (status, body) =
            extract_error_body(ApiError(Fault::store_rejected(404, "not found"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "store_error");
    }

    #[tokio::test]
    async fn test_store_rejected_gateway_credentials() {
        let (status, body) =
            extract_error_body(ApiError(Fault::store_rejected(401, "bad key"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "store_configuration_error");
    }

    #[tokio::test]
    async fn test_store_rejected_bogus_status() {
        let (status, _) = extract_error_body(ApiError(Fault::store_rejected(42, "weird"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_store_rejected_with_success_status_is_an_error() {
        let (status, body) = extract_error_body(ApiError(Fault::store_rejected(
            200,
            "malformed identity record",
        )))
        .await;
        assert!(!status.is_success());
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["kind"], "store_rejected");

        let (status, _) =
            extract_error_body(ApiError(Fault::store_rejected(302, "moved"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
