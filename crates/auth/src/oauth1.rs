//! OAuth 1.0a request signing (HMAC-SHA1).
//!
//! Builds the `Authorization: OAuth ...` header for a request. The signature
//! base string covers the method, the URL without query, every `oauth_*`
//! protocol parameter and every query or form parameter of the request.

use crate::nonce::{random_nonce, unix_timestamp};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac as _};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::{ExposeSecret as _, SecretString};
use sha1::Sha1;

/// RFC 3986 unreserved characters are left alone; everything else is escaped.
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";

/// Percent-encode `s` as OAuth 1.0a requires.
#[must_use]
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE).to_string()
}

/// A token and its secret: either a request-token pair during the exchange
/// or the user's access pair afterwards.
#[derive(Debug, Clone, Copy)]
pub struct TokenPair<'a> {
    pub token: &'a str,
    pub secret: &'a str,
}

impl<'a> TokenPair<'a> {
    #[must_use]
    pub fn new(token: &'a str, secret: &'a str) -> Self {
        Self { token, secret }
    }
}

/// Signs requests on behalf of one consumer application.
pub struct Signer {
    consumer_key: String,
    consumer_secret: SecretString,
}

impl Signer {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
        }
    }

    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    /// `Authorization` header value for a request, with a fresh nonce and
    /// timestamp.
    ///
    /// `params` are the request's query or form parameters (signed, not put
    /// in the header). `protocol` are extra `oauth_*` parameters such as
    /// `oauth_callback` or `oauth_verifier` (signed and put in the header).
    #[must_use]
    pub fn authorize(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        token: Option<TokenPair<'_>>,
        protocol: &[(&str, &str)],
    ) -> String {
        self.authorize_with(
            method,
            url,
            params,
            token,
            protocol,
            &random_nonce(),
            unix_timestamp(),
        )
    }

    /// [`authorize`](Self::authorize) with an explicit nonce and timestamp.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn authorize_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        token: Option<TokenPair<'_>>,
        protocol: &[(&str, &str)],
        nonce: &str,
        timestamp: u64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth: Vec<(&str, &str)> = vec![
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_version", VERSION),
        ];
        if let Some(pair) = token {
            oauth.push(("oauth_token", pair.token));
        }
        oauth.extend_from_slice(protocol);

        let all: Vec<(&str, &str)> = oauth.iter().chain(params).copied().collect();
        let base = base_string(method, url, &all);
        let signature = sign(
            &base,
            self.consumer_secret.expose_secret(),
            token.map_or("", |pair| pair.secret),
        );

        oauth.sort_unstable();
        let fields = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .chain(std::iter::once(format!(
                "oauth_signature=\"{}\"",
                encode(&signature)
            )))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }
}

/// Signature base string: `METHOD&enc(url)&enc(sorted encoded params)`.
#[must_use]
pub fn base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort_unstable();
    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(url),
        encode(&normalized)
    )
}

/// Base64 HMAC-SHA1 of `base` keyed by `enc(consumer)&enc(token)`.
#[must_use]
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> String {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac =
        <Hmac<Sha1>>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Extracts one parameter from an `Authorization: OAuth ...` header.
#[must_use]
pub fn header_param(header: &str, name: &str) -> Option<String> {
    let fields = header.strip_prefix("OAuth ")?;
    fields.split(", ").find_map(|field| {
        let (k, v) = field.split_once('=')?;
        if k != name {
            return None;
        }
        let v = v.trim_matches('"');
        percent_encoding::percent_decode_str(v)
            .decode_utf8()
            .ok()
            .map(|s| s.into_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Worked example from the provider's "creating a signature" guide.
    const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
    const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
    const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TIMESTAMP: u64 = 1_318_622_958;
    const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";
    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("https://x/y?z=1"), "https%3A%2F%2Fx%2Fy%3Fz%3D1");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_known_signature() {
        let signer = Signer::new(CONSUMER_KEY, CONSUMER_SECRET);
        let header = signer.authorize_with(
            "POST",
            URL,
            &[("status", STATUS), ("include_entities", "true")],
            Some(TokenPair::new(TOKEN, TOKEN_SECRET)),
            &[],
            NONCE,
            TIMESTAMP,
        );
        assert!(header.starts_with("OAuth "));
        assert_eq!(
            header_param(&header, "oauth_signature").as_deref(),
            Some("hCtSmYh+iHYCEqBWrE7C7hYmtUk=")
        );
        assert!(header.contains(r#"oauth_signature="hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D""#));
        assert_eq!(header_param(&header, "oauth_token").as_deref(), Some(TOKEN));
        // request params are signed but not carried in the header
        assert!(header_param(&header, "status").is_none());
    }

    #[test]
    fn test_base_string_sorted_and_encoded() {
        let base = base_string("post", "https://api.example.com/x", &[("b", "2 3"), ("a", "1")]);
        assert_eq!(base, "POST&https%3A%2F%2Fapi.example.com%2Fx&a%3D1%26b%3D2%25203");
    }

    #[test]
    fn test_protocol_params_in_header() {
        let signer = Signer::new("key", "secret");
        let header = signer.authorize(
            "POST",
            "https://api.example.com/oauth/request_token",
            &[],
            None,
            &[("oauth_callback", "https://cb.example.com/done")],
        );
        assert_eq!(
            header_param(&header, "oauth_callback").as_deref(),
            Some("https://cb.example.com/done")
        );
        assert!(header_param(&header, "oauth_token").is_none());
        assert_eq!(header_param(&header, "oauth_consumer_key").as_deref(), Some("key"));
    }

    #[test]
    fn test_signature_depends_on_token_secret() {
        let base = base_string("GET", URL, &[]);
        assert_ne!(sign(&base, "c", "t1"), sign(&base, "c", "t2"));
    }
}
