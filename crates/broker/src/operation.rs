//! The operations a caller can ask the coordinator to run.

use credgate_types::{CredentialKind, Fault, Outcome, PendingExchange, ProviderId, PublishRequest};
use std::fmt;

/// Which media edge to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photos,
    Videos,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photos => write!(f, "photos"),
            Self::Videos => write!(f, "videos"),
        }
    }
}

/// One operation against one provider.
///
/// `GetIdentity`, `ListMedia`, `Publish` and `ExtendCredential` act for a
/// user and need a [`UserIdentity`](credgate_types::UserIdentity); the rest
/// are application-level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetIdentity {
        provider: ProviderId,
    },
    ListMedia {
        provider: ProviderId,
        media: MediaKind,
    },
    Publish {
        provider: ProviderId,
        request: PublishRequest,
    },
    ExtendCredential {
        provider: ProviderId,
    },
    BeginExchange {
        provider: ProviderId,
        callback_url: String,
    },
    CompleteExchange {
        provider: ProviderId,
        pending: PendingExchange,
        verifier: String,
    },
    AuthorizationUrl {
        provider: ProviderId,
        redirect_url: String,
    },
}

impl Operation {
    #[must_use]
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::GetIdentity { provider }
            | Self::ListMedia { provider, .. }
            | Self::Publish { provider, .. }
            | Self::ExtendCredential { provider }
            | Self::BeginExchange { provider, .. }
            | Self::CompleteExchange { provider, .. }
            | Self::AuthorizationUrl { provider, .. } => *provider,
        }
    }

    /// Short name used in logs and meters.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetIdentity { .. } => "get_identity",
            Self::ListMedia {
                media: MediaKind::Photos,
                ..
            } => "list_photos",
            Self::ListMedia {
                media: MediaKind::Videos,
                ..
            } => "list_videos",
            Self::Publish { .. } => "publish",
            Self::ExtendCredential { .. } => "extend_credential",
            Self::BeginExchange { .. } => "begin_exchange",
            Self::CompleteExchange { .. } => "complete_exchange",
            Self::AuthorizationUrl { .. } => "authorization_url",
        }
    }

    #[must_use]
    pub fn needs_identity(&self) -> bool {
        matches!(
            self,
            Self::GetIdentity { .. }
                | Self::ListMedia { .. }
                | Self::Publish { .. }
                | Self::ExtendCredential { .. }
        )
    }

    /// The credential kind this operation is restricted to, if any.
    #[must_use]
    pub fn required_kind(&self) -> Option<CredentialKind> {
        match self {
            Self::ExtendCredential { .. } | Self::AuthorizationUrl { .. } => {
                Some(CredentialKind::Bearer)
            }
            Self::BeginExchange { .. } | Self::CompleteExchange { .. } => {
                Some(CredentialKind::ThreeLegged)
            }
            Self::GetIdentity { .. } | Self::ListMedia { .. } | Self::Publish { .. } => None,
        }
    }

    /// Rejects operations whose provider or arguments cannot work, before
    /// anything is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] naming the problem.
    pub fn validate(&self) -> Outcome<()> {
        let provider = self.provider();
        if let Some(kind) = self.required_kind()
            && provider.kind() != kind
        {
            return Err(Fault::invalid(format!(
                "{} is not available for {provider}",
                self.name()
            )));
        }
        match self {
            Self::Publish { request, .. } => request.validate(),
            Self::BeginExchange { callback_url, .. } if callback_url.trim().is_empty() => {
                Err(Fault::invalid("a callback URL is required"))
            }
            Self::AuthorizationUrl { redirect_url, .. } if redirect_url.trim().is_empty() => {
                Err(Fault::invalid("a redirect URL is required"))
            }
            Self::CompleteExchange {
                pending, verifier, ..
            } if pending.request_token.is_empty()
                || pending.request_secret.is_empty()
                || verifier.is_empty() =>
            {
                Err(Fault::invalid(
                    "the request token, request secret and verifier are all required",
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_provider_kind_is_invalid() {
        let op = Operation::ExtendCredential {
            provider: ProviderId::Twitter,
        };
        assert_eq!(
            op.validate(),
            Err(Fault::invalid("extend_credential is not available for twitter"))
        );
        let op = Operation::BeginExchange {
            provider: ProviderId::Facebook,
            callback_url: "https://cb".into(),
        };
        assert!(matches!(op.validate(), Err(Fault::InvalidInput(_))));
    }

    #[test]
    fn test_empty_arguments_are_invalid() {
        let op = Operation::CompleteExchange {
            provider: ProviderId::Twitter,
            pending: PendingExchange::new("R1", ""),
            verifier: "v".into(),
        };
        assert!(matches!(op.validate(), Err(Fault::InvalidInput(_))));
        let op = Operation::AuthorizationUrl {
            provider: ProviderId::Facebook,
            redirect_url: " ".into(),
        };
        assert!(matches!(op.validate(), Err(Fault::InvalidInput(_))));
    }

    #[test]
    fn test_identity_requirement() {
        let media = Operation::ListMedia {
            provider: ProviderId::Facebook,
            media: MediaKind::Videos,
        };
        assert!(media.needs_identity());
        assert_eq!(media.name(), "list_videos");
        assert!(
            !Operation::AuthorizationUrl {
                provider: ProviderId::Facebook,
                redirect_url: "https://r".into()
            }
            .needs_identity()
        );
    }
}
