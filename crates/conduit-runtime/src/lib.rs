//! ---
//! conduit_section: "04-configuration-orchestration"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "In-process runtime wiring and reference collaborators."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! In-process Conduit runtime.
//!
//! Wires a [`Dispatcher`](conduit_dispatch::Dispatcher) and a
//! [`CapabilitiesRegistrar`](conduit_capabilities::CapabilitiesRegistrar)
//! from a [`RuntimeConfig`](conduit_common::RuntimeConfig), using the
//! in-memory collaborators of [`memory`] and the [`LoopbackTransport`].

pub mod loopback;
pub mod memory;
pub mod runtime;

pub use loopback::LoopbackTransport;
pub use memory::{InMemoryDiscoveryStore, InMemoryParticipantIdStore, InMemoryRoutingTable};
pub use runtime::{ConduitRuntime, RuntimeManagers};
