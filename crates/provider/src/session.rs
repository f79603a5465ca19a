//! Provider sessions and the factory that builds them.
//!
//! A session is chosen from the credential variant alone: a
//! [`BearerCredential`] always yields a [`BearerProviderSession`] and a
//! [`ThreeLeggedCredential`] a [`ThreeLeggedProviderSession`].

use crate::bearer::BearerProviderSession;
use crate::http_util::ProviderHttp;
use crate::three_legged::ThreeLeggedProviderSession;
use credgate_auth::{Signer, TokenExchange, TokenRefresh, login_dialog_url};
use credgate_config::{FacebookConfig, TwitterConfig};
use credgate_types::{
    BearerCredential, CredentialKind, Fault, Outcome, Payload, ProviderCredential, ProviderId,
    PublishRequest, ThreeLeggedCredential,
};
use rquest::Client;
use std::fmt;
use std::sync::Arc;

/// A single call against a provider on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    User,
    Photos,
    Videos,
    Publish(PublishRequest),
}

impl fmt::Display for ProviderCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Photos => write!(f, "photos"),
            Self::Videos => write!(f, "videos"),
            Self::Publish(_) => write!(f, "publish"),
        }
    }
}

/// A provider client bound to one user's credential.
pub enum ProviderSession {
    Bearer(BearerProviderSession),
    ThreeLegged(ThreeLeggedProviderSession),
}

impl ProviderSession {
    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Bearer(_) => CredentialKind::Bearer,
            Self::ThreeLegged(_) => CredentialKind::ThreeLegged,
        }
    }

    #[must_use]
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Bearer(s) => s.provider(),
            Self::ThreeLegged(s) => s.provider(),
        }
    }

    /// Runs `call` and wraps its result in a [`Payload`].
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] if this session variant does not
    /// support `call`, and [`Fault::ProviderRejected`] if the provider fails.
    pub async fn invoke(&self, call: ProviderCall) -> Outcome<Payload> {
        match (self, call) {
            (Self::Bearer(s), ProviderCall::User) => s.user().await.map(Payload::FacebookUser),
            (Self::Bearer(s), ProviderCall::Photos) => s.photos().await.map(Payload::Photos),
            (Self::Bearer(s), ProviderCall::Videos) => s.videos().await.map(Payload::Videos),
            (Self::Bearer(s), ProviderCall::Publish(req)) => {
                s.publish(&req).await.map(Payload::Published)
            }
            (Self::ThreeLegged(s), ProviderCall::User) => {
                s.user().await.map(Payload::TwitterUser)
            }
            (Self::ThreeLegged(s), ProviderCall::Publish(req)) => {
                s.publish(&req).await.map(Payload::Published)
            }
            (Self::ThreeLegged(s), call @ (ProviderCall::Photos | ProviderCall::Videos)) => Err(
                Fault::invalid(format!("{} does not support listing {call}", s.provider())),
            ),
        }
    }

    /// Extends the session's credential. Only bearer sessions can.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] for a three-legged session and
    /// [`Fault::ProviderRejected`] if the provider refuses the token.
    pub async fn extend(&self) -> Outcome<BearerCredential> {
        match self {
            Self::Bearer(s) => s.extend().await,
            Self::ThreeLegged(s) => Err(Fault::invalid(format!(
                "{} credentials cannot be extended",
                s.provider()
            ))),
        }
    }
}

/// Builds sessions and exposes the application-level auth helpers.
pub struct SessionFactory {
    ph: ProviderHttp,
    facebook: FacebookConfig,
    twitter: TwitterConfig,
    refresh: Arc<TokenRefresh>,
    signer: Arc<Signer>,
    exchange: TokenExchange,
}

impl SessionFactory {
    pub fn new(http: Client, facebook: &FacebookConfig, twitter: &TwitterConfig) -> Self {
        let refresh = TokenRefresh::new(
            http.clone(),
            &facebook.graph_url,
            &facebook.app_id,
            &facebook.app_secret,
        );
        let exchange = TokenExchange::new(
            http.clone(),
            Signer::new(&twitter.app_key, &twitter.app_secret),
            &twitter.api_url,
        );
        Self {
            ph: ProviderHttp::new(http),
            facebook: facebook.clone(),
            twitter: twitter.clone(),
            refresh: Arc::new(refresh),
            signer: Arc::new(Signer::new(&twitter.app_key, &twitter.app_secret)),
            exchange,
        }
    }

    /// Session for `provider` from the credential stored for it.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] ("`<provider>` is not linked") if the
    /// credential variant does not match the provider's kind.
    pub fn session(
        &self,
        provider: ProviderId,
        credential: &ProviderCredential,
    ) -> Outcome<ProviderSession> {
        match (provider.kind(), credential) {
            (CredentialKind::Bearer, ProviderCredential::Bearer(c)) => {
                Ok(ProviderSession::Bearer(self.bearer(provider, c.clone())))
            }
            (CredentialKind::ThreeLegged, ProviderCredential::ThreeLegged(c)) => Ok(
                ProviderSession::ThreeLegged(self.three_legged(provider, c.clone())),
            ),
            _ => Err(Fault::invalid(format!("{provider} is not linked"))),
        }
    }

    #[must_use]
    pub fn bearer(&self, provider: ProviderId, credential: BearerCredential) -> BearerProviderSession {
        BearerProviderSession::new(
            provider,
            self.ph.clone(),
            &self.facebook.graph_url,
            credential,
            Arc::clone(&self.refresh),
        )
    }

    #[must_use]
    pub fn three_legged(
        &self,
        provider: ProviderId,
        credential: ThreeLeggedCredential,
    ) -> ThreeLeggedProviderSession {
        ThreeLeggedProviderSession::new(
            provider,
            self.ph.clone(),
            Arc::clone(&self.signer),
            &self.twitter.api_url,
            &self.twitter.upload_url,
            credential,
        )
    }

    /// The three-legged token exchange for this application.
    #[must_use]
    pub fn exchange(&self) -> &TokenExchange {
        &self.exchange
    }

    /// Login dialog URL for the bearer provider.
    #[must_use]
    pub fn login_dialog_url(&self, redirect_url: &str) -> String {
        login_dialog_url(
            &self.facebook.dialog_url,
            &self.facebook.app_id,
            redirect_url,
            &self.facebook.scopes,
        )
    }
}
