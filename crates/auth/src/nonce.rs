//! Nonce and timestamp generation for signed requests.

use rand::Rng as _;
use rand::distributions::Alphanumeric;
use std::time::{SystemTime, UNIX_EPOCH};

const NONCE_LEN: usize = 32;

/// Generate a random alphanumeric `oauth_nonce`. It never needs percent
/// encoding, so the signed and sent values are identical.
#[must_use]
pub fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Current unix time in seconds, as sent in `oauth_timestamp`.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
