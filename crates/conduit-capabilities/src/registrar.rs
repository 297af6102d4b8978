//! ---
//! conduit_section: "09-integration-interoperability"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Provider registration across routing, discovery and managers."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use conduit_common::time::{expiry_from_ttl, Clock};
use conduit_dispatch::{Provider, PublicationManager, RequestReplyManager};
use conduit_logging::{log_system_event, LoggingContext, SystemEventOutcome};
use conduit_msg::{Address, DiscoveryEntry, ProviderQos};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::collaborators::{DiscoveryStore, LoggingManager, MessageRouter, ParticipantIdStore};
use crate::join::{settle_both, start};
use crate::{RegistrarError, Result};

/// Public key id placed on discovery entries until providers supply one.
const DEFAULT_PUBLIC_KEY_ID: &str = "";

/// Expiry applied when the caller passes none.
pub const DEFAULT_DISCOVERY_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Collaborators a [`CapabilitiesRegistrar`] drives.
#[derive(Clone)]
pub struct RegistrarDependencies {
    /// Directory the registrar publishes entries to.
    pub discovery_store: Arc<dyn DiscoveryStore>,
    /// Routing table receiving next hops.
    pub message_router: Arc<dyn MessageRouter>,
    /// Participant id source.
    pub participant_id_store: Arc<dyn ParticipantIdStore>,
    /// Address of this runtime, used as next hop of local providers.
    pub local_address: Address,
    /// Dispatches requests to registered providers.
    pub request_reply_manager: Arc<dyn RequestReplyManager>,
    /// Serves subscriptions on provider attributes.
    pub publication_manager: Arc<dyn PublicationManager>,
    /// Keeps logging contexts passed at registration.
    pub logging_manager: Arc<dyn LoggingManager>,
    /// Time source for `lastSeenDateMs` and default expiry.
    pub clock: Arc<dyn Clock>,
    /// Lifetime of entries registered without an explicit expiry.
    pub default_expiry: Duration,
}

/// Registers providers with every collaborator that has to know about them.
///
/// Partial registrations are not rolled back: when the router or discovery
/// store fails, the request caller and publication provider stay registered.
pub struct CapabilitiesRegistrar {
    deps: RegistrarDependencies,
    started: AtomicBool,
}

impl CapabilitiesRegistrar {
    /// Registrar ready to accept registrations.
    pub fn new(deps: RegistrarDependencies) -> Self {
        Self {
            deps,
            started: AtomicBool::new(true),
        }
    }

    fn check_if_ready(&self) -> Result<()> {
        if self.started.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistrarError::ShutDown)
        }
    }

    /// Register `provider` for `domain` and return its participant id.
    ///
    /// `expiry_date_ms` defaults to now plus the configured default expiry.
    pub async fn register_provider(
        &self,
        domain: &str,
        provider: Arc<dyn Provider>,
        provider_qos: ProviderQos,
        expiry_date_ms: Option<i64>,
        logging_context: Option<LoggingContext>,
    ) -> Result<String> {
        self.check_if_ready()?;

        let interface_name = provider.interface_name().to_owned();
        let missing = provider.check_implementation();
        if !missing.is_empty() {
            return Err(RegistrarError::MissingImplementation {
                domain: domain.to_owned(),
                interface_name,
                missing,
            });
        }

        let participant_id = self
            .deps
            .participant_id_store
            .participant_id(domain, provider.as_ref());

        let context =
            logging_context.map(|context| context.with_participant(participant_id.as_str()));
        if let Some(context) = &context {
            self.deps
                .logging_manager
                .set_logging_context(&participant_id, context.clone());
        }

        self.deps
            .request_reply_manager
            .add_request_caller(&participant_id, provider.clone());

        let routing = start(
            self.deps
                .message_router
                .add_next_hop(&participant_id, self.deps.local_address.clone()),
        )
        .await
        .map(|result| result.map_err(RegistrarError::Routing));

        if provider.has_attributes() {
            let registered = self
                .deps
                .publication_manager
                .add_publication_provider(&participant_id, provider.clone());
            debug!(participant_id = %participant_id, registered, "publication provider added");
        }

        let now_ms = self.deps.clock.now_ms();
        let entry = DiscoveryEntry {
            provider_version: provider.version(),
            domain: domain.to_owned(),
            interface_name: interface_name.clone(),
            participant_id: participant_id.clone(),
            qos: provider_qos,
            last_seen_date_ms: now_ms,
            expiry_date_ms: expiry_date_ms
                .unwrap_or_else(|| expiry_from_ttl(now_ms, self.deps.default_expiry)),
            public_key_id: DEFAULT_PUBLIC_KEY_ID.to_owned(),
        };
        let discovery = start(self.deps.discovery_store.add(entry))
            .await
            .map(|result| result.map_err(RegistrarError::Discovery));

        let joined = settle_both(routing, discovery).await;
        match joined {
            Ok(()) => {
                info!(
                    domain,
                    interface_name = %interface_name,
                    participant_id = %participant_id,
                    "provider registered"
                );
                log_system_event(
                    context.as_ref(),
                    "provider_registered",
                    &format!("{domain}/{interface_name} registered"),
                    SystemEventOutcome::Success,
                );
                Ok(participant_id)
            }
            Err(err) => {
                warn!(
                    domain,
                    interface_name = %interface_name,
                    participant_id = %participant_id,
                    error = %err,
                    "provider registration failed"
                );
                log_system_event(
                    context.as_ref(),
                    "provider_registered",
                    &err.to_string(),
                    SystemEventOutcome::Fault,
                );
                Err(err)
            }
        }
    }

    /// Withdraw `provider` from `domain`.
    pub async fn unregister_provider(&self, domain: &str, provider: Arc<dyn Provider>) -> Result<()> {
        self.check_if_ready()?;

        let participant_id = self
            .deps
            .participant_id_store
            .participant_id(domain, provider.as_ref());

        let discovery = start(self.deps.discovery_store.remove(&participant_id))
            .await
            .map(|result| result.map_err(RegistrarError::Discovery));

        self.deps
            .publication_manager
            .remove_publication_provider(&participant_id, provider.clone());

        let routing = start(self.deps.message_router.remove_next_hop(&participant_id))
            .await
            .map(|result| result.map_err(RegistrarError::Routing));

        self.deps
            .request_reply_manager
            .remove_request_caller(&participant_id);

        let result = settle_both(discovery, routing).await;
        match &result {
            Ok(()) => info!(
                domain,
                interface_name = provider.interface_name(),
                participant_id = %participant_id,
                "provider unregistered"
            ),
            Err(err) => warn!(
                domain,
                interface_name = provider.interface_name(),
                participant_id = %participant_id,
                error = %err,
                "provider unregistration failed"
            ),
        }
        result
    }

    /// Legacy form of [`CapabilitiesRegistrar::register_provider`]; the token is ignored.
    #[deprecated(note = "use register_provider")]
    pub async fn register_capability(
        &self,
        _auth_token: &str,
        domain: &str,
        provider: Arc<dyn Provider>,
        provider_qos: ProviderQos,
        expiry_date_ms: Option<i64>,
        logging_context: Option<LoggingContext>,
    ) -> Result<String> {
        self.register_provider(domain, provider, provider_qos, expiry_date_ms, logging_context)
            .await
    }

    /// Legacy form of [`CapabilitiesRegistrar::unregister_provider`]; the token is ignored.
    #[deprecated(note = "use unregister_provider")]
    pub async fn unregister_capability(
        &self,
        _auth_token: &str,
        domain: &str,
        provider: Arc<dyn Provider>,
    ) -> Result<()> {
        self.unregister_provider(domain, provider).await
    }

    /// Refuse all further operations.
    pub fn shutdown(&self) {
        if self.started.swap(false, Ordering::SeqCst) {
            info!("capabilities registrar shut down");
        }
    }

    /// Whether the registrar still accepts operations.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}
