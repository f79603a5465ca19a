//! OAuth credential lifecycle for the supported providers.
//!
//! [`TokenExchange`] runs the two legs of the three-legged flow,
//! [`TokenRefresh`] extends bearer tokens, and [`oauth1`] signs requests.

pub mod dialog;
pub mod exchange;
pub mod nonce;
pub mod oauth1;
pub mod refresh;
pub mod rejection;

pub use dialog::login_dialog_url;
pub use exchange::TokenExchange;
pub use oauth1::{Signer, TokenPair};
pub use refresh::TokenRefresh;
pub use rejection::{provider_rejection, transport_rejection};
