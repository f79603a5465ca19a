//! Credential brokering: runs one [`Operation`] through the identity store
//! and the matching provider session.

pub mod coordinator;
pub mod guard;
pub mod operation;

pub use coordinator::{CredentialCoordinator, Stage};
pub use guard::RefreshGuards;
pub use operation::{MediaKind, Operation};
