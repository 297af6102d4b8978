//! ---
//! conduit_section: "09-integration-interoperability"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Provider registration across routing, discovery and managers."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use async_trait::async_trait;
use conduit_dispatch::Provider;
use conduit_logging::{LoggingContext, LoggingContextRegistry};
use conduit_msg::{Address, DiscoveryEntry};

/// Source of stable participant ids.
pub trait ParticipantIdStore: Send + Sync {
    /// Participant id for `provider` in `domain`, created on first use.
    fn participant_id(&self, domain: &str, provider: &dyn Provider) -> String;
}

/// Keeper of per-participant logging contexts.
pub trait LoggingManager: Send + Sync {
    /// Attach `context` to `participant_id`.
    fn set_logging_context(&self, participant_id: &str, context: LoggingContext);
}

impl LoggingManager for LoggingContextRegistry {
    fn set_logging_context(&self, participant_id: &str, context: LoggingContext) {
        self.set(participant_id, context);
    }
}

/// Routing table mapping participant ids to next hops.
#[async_trait]
pub trait MessageRouter: Send + Sync {
    /// Route envelopes for `participant_id` to `address`.
    async fn add_next_hop(&self, participant_id: &str, address: Address) -> anyhow::Result<()>;

    /// Stop routing envelopes for `participant_id`.
    async fn remove_next_hop(&self, participant_id: &str) -> anyhow::Result<()>;
}

/// Directory of registered providers.
#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    /// Publish `entry`.
    async fn add(&self, entry: DiscoveryEntry) -> anyhow::Result<()>;

    /// Withdraw the entry of `participant_id`.
    async fn remove(&self, participant_id: &str) -> anyhow::Result<()>;
}
