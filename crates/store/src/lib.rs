//! Identity store backends holding users' provider credentials.
//!
//! Provides an HTTP client for the external identity service and an
//! in-memory store for development and tests.

pub mod memory;
pub mod remote;

pub use memory::InMemoryCredentialStore;
pub use remote::RemoteCredentialStore;
