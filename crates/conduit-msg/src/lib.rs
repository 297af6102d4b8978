//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Wire-level data model of the dispatching core.
//!
//! An [`Envelope`] carries routing headers and a serialized body; the body
//! types live in [`types`]. Subscription timing contracts are resolved and
//! validated by [`qos`].

pub mod address;
pub mod discovery;
pub mod envelope;
pub mod exceptions;
pub mod metrics;
pub mod qos;
pub mod transport;
pub mod types;

/// Shared result type for messaging operations.
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Errors raised by the message model and transports.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// The transport refused the envelope because it is not connected.
    #[error("transport `{transport}` is unavailable")]
    TransportUnavailable {
        /// Name of the refusing transport.
        transport: &'static str,
    },
    /// The transport accepted the envelope but failed to deliver it.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Wrapper for JSON serialization or deserialization problems.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Subscription QoS input could not be resolved.
    #[error(transparent)]
    Qos(#[from] qos::QosError),
}

pub use address::Address;
pub use discovery::{CustomParameter, DiscoveryEntry, ProviderQos, ProviderScope, Version};
pub use envelope::{Envelope, MessageType, MessagingQos, MessagingQosEffort};
pub use exceptions::RemoteError;
pub use metrics::{log_envelope, DispatchMetricsExporter, EnvelopeDirection};
pub use qos::{
    OnChangeSubscriptionQos, OnChangeWithKeepAliveSubscriptionQos, PeriodicSubscriptionQos,
    QosError, QosSettings, SubscriptionQos,
};
pub use transport::{InMemoryTransport, Transport};
pub use types::{
    decode_payload, OneWayRequest, Payload, Reply, Request, SubscriptionPublication,
    SubscriptionReply, SubscriptionRequest, SubscriptionStop,
};
