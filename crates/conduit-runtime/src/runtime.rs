//! ---
//! conduit_section: "04-configuration-orchestration"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "In-process runtime wiring and reference collaborators."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::sync::Arc;

use anyhow::{Context, Result};
use conduit_capabilities::{CapabilitiesRegistrar, MessageRouter, RegistrarDependencies};
use conduit_common::config::RuntimeConfig;
use conduit_common::time::{Clock, SystemClock};
use conduit_dispatch::{
    Dispatcher, PublicationManager, RequestReplyManager, RoutingSettings, SecurityManager,
    SubscriptionManager,
};
use conduit_logging::LoggingContextRegistry;
use conduit_msg::{Address, DispatchMetricsExporter, MessagingQos, Transport};
use prometheus::Registry;
use tracing::info;

use crate::loopback::LoopbackTransport;
use crate::memory::{InMemoryDiscoveryStore, InMemoryParticipantIdStore, InMemoryRoutingTable};

/// Managers bound to the dispatcher once it exists.
pub struct RuntimeManagers {
    /// Receives requests, replies and one-way calls.
    pub request_reply: Arc<dyn RequestReplyManager>,
    /// Receives subscription replies and publications.
    pub subscription: Arc<dyn SubscriptionManager>,
    /// Serves subscription requests and stops on local providers.
    pub publication: Arc<dyn PublicationManager>,
}

/// A dispatcher and capabilities registrar sharing in-memory collaborators.
pub struct ConduitRuntime {
    config: RuntimeConfig,
    local_address: Address,
    dispatcher: Arc<Dispatcher>,
    registrar: CapabilitiesRegistrar,
    routing_table: Arc<InMemoryRoutingTable>,
    discovery: Arc<InMemoryDiscoveryStore>,
    participant_ids: Arc<InMemoryParticipantIdStore>,
    logging_contexts: LoggingContextRegistry,
    metrics_registry: Option<Registry>,
}

impl ConduitRuntime {
    /// Start a runtime on the system clock.
    ///
    /// `managers` receives the dispatcher so the managers can send through it.
    pub fn start<F>(
        config: RuntimeConfig,
        security: Arc<dyn SecurityManager>,
        remote: Option<Arc<dyn Transport>>,
        managers: F,
    ) -> Result<Self>
    where
        F: FnOnce(Arc<Dispatcher>) -> RuntimeManagers,
    {
        Self::start_with_clock(config, security, remote, SystemClock::shared(), managers)
    }

    /// Start a runtime with an explicit clock.
    pub fn start_with_clock<F>(
        config: RuntimeConfig,
        security: Arc<dyn SecurityManager>,
        remote: Option<Arc<dyn Transport>>,
        clock: Arc<dyn Clock>,
        managers: F,
    ) -> Result<Self>
    where
        F: FnOnce(Arc<Dispatcher>) -> RuntimeManagers,
    {
        config.validate()?;
        let local_address = Address::in_process(config.capabilities.local_address_id.clone());

        let (metrics_registry, metrics) = if config.metrics.enabled {
            let registry = Registry::new();
            let exporter = DispatchMetricsExporter::register(&registry)
                .context("failed to register dispatch metrics")?;
            (Some(registry), Some(exporter))
        } else {
            (None, None)
        };

        let routing_table = Arc::new(InMemoryRoutingTable::new());
        let transport = Arc::new(LoopbackTransport::new(
            routing_table.clone(),
            local_address.clone(),
            clock.clone(),
            remote,
        ));
        let dispatcher = Arc::new(Dispatcher::with_parts(
            transport.clone(),
            security,
            clock.clone(),
            metrics,
        ));
        transport.attach(&dispatcher);

        let managers = managers(dispatcher.clone());
        dispatcher.register_request_reply_manager(managers.request_reply.clone())?;
        dispatcher.register_subscription_manager(managers.subscription)?;
        dispatcher.register_publication_manager(managers.publication.clone())?;

        let discovery = Arc::new(InMemoryDiscoveryStore::new());
        let participant_ids = Arc::new(InMemoryParticipantIdStore::new());
        let logging_contexts = LoggingContextRegistry::new();
        let registrar = CapabilitiesRegistrar::new(RegistrarDependencies {
            discovery_store: discovery.clone(),
            message_router: routing_table.clone(),
            participant_id_store: participant_ids.clone(),
            local_address: local_address.clone(),
            request_reply_manager: managers.request_reply,
            publication_manager: managers.publication,
            logging_manager: Arc::new(logging_contexts.clone()),
            clock,
            default_expiry: config.capabilities.default_expiry,
        });

        info!(
            local_address = %local_address,
            metrics = config.metrics.enabled,
            "conduit runtime started"
        );

        Ok(Self {
            config,
            local_address,
            dispatcher,
            registrar,
            routing_table,
            discovery,
            participant_ids,
            logging_contexts,
            metrics_registry,
        })
    }

    /// Configuration the runtime was started with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Address local providers are routed to.
    pub fn local_address(&self) -> &Address {
        &self.local_address
    }

    /// Dispatcher bound to the loopback transport.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Registrar for providers hosted by this runtime.
    pub fn registrar(&self) -> &CapabilitiesRegistrar {
        &self.registrar
    }

    /// Next hops added by the registrar.
    pub fn routing_table(&self) -> &Arc<InMemoryRoutingTable> {
        &self.routing_table
    }

    /// Directory of registered provider entries.
    pub fn discovery(&self) -> &Arc<InMemoryDiscoveryStore> {
        &self.discovery
    }

    /// Participant ids handed out per domain and interface.
    pub fn participant_ids(&self) -> &Arc<InMemoryParticipantIdStore> {
        &self.participant_ids
    }

    /// Logging contexts passed at registration.
    pub fn logging_contexts(&self) -> &LoggingContextRegistry {
        &self.logging_contexts
    }

    /// Prometheus registry holding the dispatch counters, when metrics are enabled.
    pub fn metrics_registry(&self) -> Option<&Registry> {
        self.metrics_registry.as_ref()
    }

    /// Messaging QoS seeded from the `[messaging]` section.
    pub fn messaging_qos(&self) -> MessagingQos {
        MessagingQos::from_config(&self.config.messaging)
    }

    /// Routing settings between two participants using the configured messaging QoS.
    pub fn routing_settings(&self, from: &str, to: &str) -> RoutingSettings {
        RoutingSettings::new(from, to).with_messaging_qos(self.messaging_qos())
    }

    /// Make a local consumer (a proxy) reachable for replies and publications.
    pub async fn add_local_participant(&self, participant_id: &str) -> Result<()> {
        self.routing_table
            .add_next_hop(participant_id, self.local_address.clone())
            .await
    }

    /// Shut down the registrar, then the dispatcher.
    pub fn shutdown(&self) {
        self.registrar.shutdown();
        self.dispatcher.shutdown();
        info!("conduit runtime shut down");
    }
}
