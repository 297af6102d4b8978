//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope dispatcher, manager collaborators and reply callbacks."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Dispatching core: turns outbound calls into envelopes and routes inbound
//! envelopes to the request-reply, subscription and publication managers.

pub mod collaborators;
pub mod dispatcher;
pub mod reply;

use conduit_msg::{MessageType, MessagingError};

/// Shared result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failures raised while sending or routing envelopes.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// An inbound envelope needed a manager that has not been registered yet.
    #[error("{manager} manager is not registered")]
    ManagerNotRegistered {
        /// Manager role.
        manager: &'static str,
    },
    /// A manager role can only be bound once.
    #[error("{manager} manager is already registered")]
    ManagerAlreadyRegistered {
        /// Manager role.
        manager: &'static str,
    },
    /// The payload of an inbound envelope does not match its body type.
    #[error("failed to construct {kind} body: {source}")]
    Body {
        /// Message kind of the envelope.
        kind: MessageType,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// An outbound body could not be serialized.
    #[error("failed to serialize outbound body: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The transport refused or failed the transmission.
    #[error(transparent)]
    Messaging(#[from] MessagingError),
    /// A manager reported a failure while handling a message.
    #[error("handler failed: {0}")]
    Handler(#[from] anyhow::Error),
}

pub use collaborators::{
    Provider, PublicationManager, RequestReplyManager, SecurityManager, StaticSecurityManager,
    SubscriptionManager,
};
pub use dispatcher::{Dispatcher, RoutingSettings};
pub use reply::{ReplyCallback, ReplySettings};
