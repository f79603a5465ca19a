//! Classification of failed provider responses.
//!
//! The provider's own error code and message are kept in the reason string
//! for logging; nothing upstream interprets them.

use credgate_types::Fault;
use serde::Deserialize;

#[derive(Deserialize)]
struct GraphError {
    error: GraphErrorBody,
}

#[derive(Deserialize)]
struct GraphErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<i64>,
}

#[derive(Deserialize)]
struct ApiErrors {
    errors: Vec<ApiErrorItem>,
}

#[derive(Deserialize)]
struct ApiErrorItem {
    code: Option<i64>,
    message: Option<String>,
}

/// Builds the [`Fault::ProviderRejected`] for a non-success provider response.
///
/// Understands `{"error": {"message", "type", "code"}}` and
/// `{"errors": [{"code", "message"}]}` bodies; anything else is kept raw.
#[must_use]
pub fn provider_rejection(status: u16, body: &str) -> Fault {
    Fault::provider(format!("status {status}: {}", describe(body)))
}

fn describe(body: &str) -> String {
    if let Ok(GraphError { error }) = serde_json::from_str::<GraphError>(body) {
        let mut out = error.message.unwrap_or_else(|| "unknown error".into());
        match (error.kind, error.code) {
            (Some(kind), Some(code)) => out.push_str(&format!(" ({kind}, code {code})")),
            (Some(kind), None) => out.push_str(&format!(" ({kind})")),
            (None, Some(code)) => out.push_str(&format!(" (code {code})")),
            (None, None) => {}
        }
        return out;
    }
    if let Ok(ApiErrors { errors }) = serde_json::from_str::<ApiErrors>(body)
        && !errors.is_empty()
    {
        return errors
            .into_iter()
            .map(|e| {
                let msg = e.message.unwrap_or_else(|| "unknown error".into());
                match e.code {
                    Some(code) => format!("{msg} (code {code})"),
                    None => msg,
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response".into()
    } else {
        trimmed.to_string()
    }
}

/// Builds the [`Fault::ProviderRejected`] for a transport failure.
///
/// The client error's own text includes the request URL, whose query may
/// carry application credentials, so only the failure kind and its cause
/// are kept.
#[must_use]
pub fn transport_rejection(error: &rquest::Error) -> Fault {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    match std::error::Error::source(error) {
        Some(cause) => Fault::provider(format!("provider unreachable: {kind}: {cause}")),
        None => Fault::provider(format!("provider unreachable: {kind}")),
    }
}
