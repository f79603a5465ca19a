//! Provider sessions for the bearer and three-legged providers.
//!
//! [`SessionFactory`] turns a stored credential into a [`ProviderSession`];
//! [`ProviderSession::invoke`] runs one [`ProviderCall`] against it.

pub mod bearer;
pub mod http_util;
pub mod session;
pub mod three_legged;

pub use bearer::BearerProviderSession;
pub use http_util::ProviderHttp;
pub use session::{ProviderCall, ProviderSession, SessionFactory};
pub use three_legged::ThreeLeggedProviderSession;
