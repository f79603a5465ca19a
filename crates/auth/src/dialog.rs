//! Login dialog URL for the bearer provider.

use crate::oauth1::encode;

/// URL that sends a user to the provider's login dialog asking for
/// `scopes`, returning a token to `redirect_url`.
#[must_use]
pub fn login_dialog_url(
    dialog_url: &str,
    app_id: &str,
    redirect_url: &str,
    scopes: &[String],
) -> String {
    format!(
        "{dialog_url}?client_id={}&redirect_uri={}&scope={}&response_type=token",
        encode(app_id),
        encode(redirect_url),
        encode(&scopes.join(",")),
    )
}
