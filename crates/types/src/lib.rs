//! Core types and traits for the credgate workspace.
//!
//! This crate defines the shared vocabulary used by every layer of the
//! credential broker: the fault taxonomy, provider identifiers, credential
//! and identity records, provider payloads, and the identity store trait.

pub mod credential;
pub mod error;
pub mod identity;
pub mod payload;
pub mod provider;
pub mod traits;

pub use credential::{
    AuthorizationRequest, BearerCredential, PendingExchange, ProviderCredential,
    ThreeLeggedCredential,
};
pub use error::{Fault, FaultKind, Outcome};
pub use identity::{IdentityRecord, UserIdentity};
pub use payload::{
    FacebookPhoto, FacebookUser, FacebookVideo, MediaUpload, Payload, PublishRequest,
    PublishType, Published, TwitterUser,
};
pub use provider::{CredentialKind, ProviderId};
pub use traits::CredentialStore;
