//! ---
//! conduit_section: "09-integration-interoperability"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Provider registration across routing, discovery and managers."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Capabilities registrar: makes providers reachable and discoverable.

pub mod collaborators;
pub mod join;
pub mod registrar;

/// Shared result type for registrar operations.
pub type Result<T> = std::result::Result<T, RegistrarError>;

/// Failures of provider registration and unregistration.
#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    /// The registrar was shut down; nothing was changed.
    #[error("capabilities registrar is already shut down")]
    ShutDown,
    /// The provider does not implement every required member; nothing was changed.
    #[error("provider {domain}/{interface_name} is missing: {}", missing.join(", "))]
    MissingImplementation {
        /// Domain the provider was registered for.
        domain: String,
        /// Interface of the provider.
        interface_name: String,
        /// Unimplemented members.
        missing: Vec<String>,
    },
    /// The message router rejected the next-hop change.
    #[error("message router failed: {0}")]
    Routing(#[source] anyhow::Error),
    /// The discovery store rejected the entry change.
    #[error("discovery store failed: {0}")]
    Discovery(#[source] anyhow::Error),
}

pub use collaborators::{DiscoveryStore, LoggingManager, MessageRouter, ParticipantIdStore};
pub use conduit_dispatch::Provider;
pub use registrar::{CapabilitiesRegistrar, RegistrarDependencies};
