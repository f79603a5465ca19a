//! Credential coordinator: fetch the identity, build a session, invoke the
//! provider, and persist the credential when a refresh produced a new one.
//!
//! Each stage maps its own failures exactly once. Store faults come from
//! the store, provider faults from the session, and missing links are
//! `InvalidInput`. Nothing is retried.

use crate::guard::RefreshGuards;
use crate::operation::{MediaKind, Operation};
use credgate_config::Config;
use credgate_provider::{ProviderCall, ProviderSession, SessionFactory};
use credgate_types::{
    BearerCredential, CredentialStore, Fault, IdentityRecord, Outcome, Payload, ProviderId,
    UserIdentity,
};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument as _;

/// Where an operation is in its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchingIdentity,
    BuildingSession,
    Invoking,
    PersistingIfRefresh,
    Done,
    Failed,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchingIdentity => "fetching_identity",
            Self::BuildingSession => "building_session",
            Self::Invoking => "invoking",
            Self::PersistingIfRefresh => "persisting_if_refresh",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(stage: Stage) {
    tracing::Span::current().record("stage", stage.as_str());
    tracing::debug!(%stage, "entering stage");
}

/// Logs a failure at the stage where it happened and passes it through.
fn failed(stage: Stage, fault: Fault) -> Fault {
    tracing::Span::current().record("stage", Stage::Failed.as_str());
    if fault.is_operator_fault() {
        tracing::error!(operator = true, %stage, error = %fault, "identity store rejected gateway credentials");
    } else if matches!(fault, Fault::InvalidInput(_)) {
        tracing::warn!(%stage, error = %fault, "operation rejected");
    } else {
        tracing::error!(%stage, kind = %fault.kind(), error = %fault, "operation failed");
    }
    fault
}

/// Runs [`Operation`]s against the identity store and the providers.
pub struct CredentialCoordinator {
    store: Arc<dyn CredentialStore>,
    sessions: SessionFactory,
    guards: Option<RefreshGuards>,
}

impl CredentialCoordinator {
    /// `serialize_refreshes` holds a per-identity lock across the whole
    /// fetch → extend → update pipeline of `ExtendCredential`.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        sessions: SessionFactory,
        serialize_refreshes: bool,
    ) -> Self {
        Self {
            store,
            sessions,
            guards: serialize_refreshes.then(RefreshGuards::new),
        }
    }

    /// Builds the coordinator described by `config`.
    pub fn from_config(
        store: Arc<dyn CredentialStore>,
        http: rquest::Client,
        config: &Config,
    ) -> Self {
        let sessions = SessionFactory::new(http, &config.facebook, &config.twitter);
        Self::new(store, sessions, config.serialize_refreshes)
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionFactory {
        &self.sessions
    }

    /// Runs `operation`, acting for `identity` where the operation needs one.
    ///
    /// # Errors
    ///
    /// Returns the [`Fault`] of the stage that failed: `InvalidInput` for bad
    /// arguments or an unlinked provider, `StoreUnavailable`/`StoreRejected`
    /// for identity store failures (including a failed write after a
    /// successful refresh), and `ProviderRejected` for provider failures.
    pub async fn execute(
        &self,
        operation: Operation,
        identity: Option<&UserIdentity>,
    ) -> Outcome<Payload> {
        let span = tracing::info_span!(
            "operation",
            op = operation.name(),
            provider = %operation.provider(),
            identity = identity.map(UserIdentity::id),
            stage = tracing::field::Empty,
        );
        async move {
            let result = self.run(operation, identity).await;
            if result.is_ok() {
                enter(Stage::Done);
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, operation: Operation, identity: Option<&UserIdentity>) -> Outcome<Payload> {
        operation
            .validate()
            .map_err(|f| failed(Stage::BuildingSession, f))?;

        match (operation, identity) {
            (Operation::GetIdentity { provider }, Some(identity)) => {
                self.invoke(identity, provider, ProviderCall::User).await
            }
            (Operation::ListMedia { provider, media }, Some(identity)) => {
                let call = match media {
                    MediaKind::Photos => ProviderCall::Photos,
                    MediaKind::Videos => ProviderCall::Videos,
                };
                self.invoke(identity, provider, call).await
            }
            (Operation::Publish { provider, request }, Some(identity)) => {
                self.invoke(identity, provider, ProviderCall::Publish(request))
                    .await
            }
            (Operation::ExtendCredential { provider }, Some(identity)) => self
                .extend(identity, provider)
                .await
                .map(Payload::Extended),
            (Operation::BeginExchange { callback_url, .. }, _) => {
                enter(Stage::Invoking);
                self.sessions
                    .exchange()
                    .begin(&callback_url)
                    .await
                    .map(Payload::Authorization)
                    .map_err(|f| failed(Stage::Invoking, f))
            }
            (
                Operation::CompleteExchange {
                    pending, verifier, ..
                },
                _,
            ) => {
                enter(Stage::Invoking);
                self.sessions
                    .exchange()
                    .complete(&pending, &verifier)
                    .await
                    .map(Payload::AccessToken)
                    .map_err(|f| failed(Stage::Invoking, f))
            }
            (Operation::AuthorizationUrl { redirect_url, .. }, _) => Ok(Payload::Url(
                self.sessions.login_dialog_url(&redirect_url),
            )),
            (_, None) => Err(failed(
                Stage::FetchingIdentity,
                Fault::invalid("an identity is required for this operation"),
            )),
        }
    }

    async fn fetch(&self, identity: &UserIdentity) -> Outcome<IdentityRecord> {
        enter(Stage::FetchingIdentity);
        self.store
            .fetch(identity)
            .await
            .map_err(|f| failed(Stage::FetchingIdentity, f))
    }

    fn build(&self, provider: ProviderId, record: &IdentityRecord) -> Outcome<ProviderSession> {
        enter(Stage::BuildingSession);
        let credential = record.credential(provider).ok_or_else(|| {
            failed(
                Stage::BuildingSession,
                Fault::invalid(format!("{provider} is not linked")),
            )
        })?;
        self.sessions
            .session(provider, credential)
            .map_err(|f| failed(Stage::BuildingSession, f))
    }

    async fn invoke(
        &self,
        identity: &UserIdentity,
        provider: ProviderId,
        call: ProviderCall,
    ) -> Outcome<Payload> {
        let record = self.fetch(identity).await?;
        let session = self.build(provider, &record)?;
        enter(Stage::Invoking);
        session
            .invoke(call)
            .await
            .map_err(|f| failed(Stage::Invoking, f))
    }

    async fn extend(
        &self,
        identity: &UserIdentity,
        provider: ProviderId,
    ) -> Outcome<BearerCredential> {
        let _guard = match &self.guards {
            Some(guards) => Some(guards.acquire(identity.id()).await),
            None => None,
        };

        let record = self.fetch(identity).await?;
        let session = self.build(provider, &record)?;

        enter(Stage::Invoking);
        let extended = session
            .extend()
            .await
            .map_err(|f| failed(Stage::Invoking, f))?;

        enter(Stage::PersistingIfRefresh);
        let updated = record.with_credential(provider, extended.clone());
        self.store
            .update(identity, &updated)
            .await
            .map_err(|f| failed(Stage::PersistingIfRefresh, f))?;

        tracing::info!(identity = identity.id(), %provider, "stored extended credential");
        Ok(extended)
    }
}
