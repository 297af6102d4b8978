//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Shared primitives and utilities for the dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! Core shared primitives for the Conduit workspace.
//! This crate exposes configuration loading, tracing initialisation, and the
//! clock abstraction used for expiry arithmetic across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    CapabilitiesConfig, Effort, LoadedRuntimeConfig, LoggingConfig, MessagingConfig,
    MetricsConfig, RuntimeConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::{expiry_from_ttl, Clock, ManualClock, SystemClock, MAX_EXPIRY_DATE_MS};
