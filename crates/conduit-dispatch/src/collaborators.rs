//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope dispatcher, manager collaborators and reply callbacks."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! Contracts of the collaborators the dispatcher and registrar drive.
//!
//! Manager entry points are synchronous and report failures as
//! `anyhow::Result`; the dispatcher isolates and logs whatever they return.

use std::sync::Arc;

use conduit_msg::{
    OneWayRequest, Payload, Reply, Request, SubscriptionPublication, SubscriptionReply,
    SubscriptionRequest, SubscriptionStop, Version,
};

use crate::reply::ReplyCallback;

/// Identity source for the `creator` header of outbound envelopes.
pub trait SecurityManager: Send + Sync {
    /// User id of the current process.
    fn current_process_user_id(&self) -> String;
}

/// Security manager reporting a fixed user id.
#[derive(Debug, Clone)]
pub struct StaticSecurityManager {
    user_id: String,
}

impl StaticSecurityManager {
    /// Security manager that always reports `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl SecurityManager for StaticSecurityManager {
    fn current_process_user_id(&self) -> String {
        self.user_id.clone()
    }
}

/// A registrable provider implementation.
pub trait Provider: Send + Sync {
    /// Fully qualified interface name.
    fn interface_name(&self) -> &str;

    /// Declared interface version.
    fn version(&self) -> Version;

    /// Names of required members the provider does not implement.
    fn check_implementation(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether the provider exposes at least one observable attribute.
    fn has_attributes(&self) -> bool {
        false
    }
}

/// Owner of request/reply correlation and provider method invocation.
pub trait RequestReplyManager: Send + Sync {
    /// Invoke a provider method; `reply` answers the caller.
    fn handle_request(
        &self,
        participant_id: &str,
        request: Payload<Request>,
        reply: ReplyCallback<Reply>,
    ) -> anyhow::Result<()>;

    /// Resolve a pending request.
    fn handle_reply(&self, reply: Payload<Reply>) -> anyhow::Result<()>;

    /// Invoke a provider method without answering.
    fn handle_one_way_request(
        &self,
        participant_id: &str,
        request: Payload<OneWayRequest>,
    ) -> anyhow::Result<()>;

    /// Make `provider` reachable for requests addressed to `participant_id`.
    fn add_request_caller(&self, participant_id: &str, provider: Arc<dyn Provider>);

    /// Forget the provider bound to `participant_id`.
    fn remove_request_caller(&self, participant_id: &str);
}

/// Subscriber-side bookkeeping.
pub trait SubscriptionManager: Send + Sync {
    /// A provider accepted or rejected a subscription.
    fn handle_subscription_reply(&self, reply: Payload<SubscriptionReply>) -> anyhow::Result<()>;

    /// A publication arrived for a subscription.
    fn handle_publication(&self, publication: Payload<SubscriptionPublication>)
        -> anyhow::Result<()>;
}

/// Provider-side subscription bookkeeping.
pub trait PublicationManager: Send + Sync {
    /// Start an attribute subscription; `reply` answers the subscriber.
    fn handle_subscription_request(
        &self,
        proxy_participant_id: &str,
        provider_participant_id: &str,
        request: Payload<SubscriptionRequest>,
        reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()>;

    /// Start a broadcast subscription; `reply` answers the subscriber.
    fn handle_event_subscription_request(
        &self,
        proxy_participant_id: &str,
        provider_participant_id: &str,
        request: Payload<SubscriptionRequest>,
        reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()>;

    /// End a subscription.
    fn handle_subscription_stop(&self, stop: Payload<SubscriptionStop>) -> anyhow::Result<()>;

    /// Register `provider` as publication source; returns whether it has attributes.
    fn add_publication_provider(&self, participant_id: &str, provider: Arc<dyn Provider>) -> bool;

    /// Drop `provider` as publication source.
    fn remove_publication_provider(&self, participant_id: &str, provider: Arc<dyn Provider>);
}
