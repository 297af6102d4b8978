//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope dispatcher, manager collaborators and reply callbacks."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use conduit_common::time::{expiry_from_ttl, Clock, SystemClock};
use conduit_msg::{
    decode_payload, log_envelope, DispatchMetricsExporter, Envelope, EnvelopeDirection,
    MessageType, MessagingQos, MessagingQosEffort, OneWayRequest, Payload, Reply, Request,
    SubscriptionPublication, SubscriptionReply, SubscriptionRequest, SubscriptionStop, Transport,
};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::collaborators::{
    PublicationManager, RequestReplyManager, SecurityManager, SubscriptionManager,
};
use crate::reply::{Outbox, ReplyCallback, ReplySettings};
use crate::{DispatchError, Result};

const REQUEST_REPLY: &str = "request-reply";
const SUBSCRIPTION: &str = "subscription";
const PUBLICATION: &str = "publication";

/// Addressing and messaging QoS of an outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSettings {
    /// Sending participant.
    pub from: String,
    /// Receiving participant.
    pub to: String,
    /// Time-to-live, effort and custom headers.
    pub messaging_qos: MessagingQos,
}

impl RoutingSettings {
    /// Settings with default messaging QoS.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            messaging_qos: MessagingQos::default(),
        }
    }

    /// Replace the messaging QoS.
    pub fn with_messaging_qos(mut self, messaging_qos: MessagingQos) -> Self {
        self.messaging_qos = messaging_qos;
        self
    }
}

/// Envelope dispatcher.
///
/// Outbound operations build one envelope each and make a single transmission
/// attempt. [`Dispatcher::receive`] routes inbound envelopes to managers bound
/// once after construction through the `register_*` methods.
pub struct Dispatcher {
    outbox: Outbox,
    clock: Arc<dyn Clock>,
    request_reply_manager: OnceCell<Arc<dyn RequestReplyManager>>,
    subscription_manager: OnceCell<Arc<dyn SubscriptionManager>>,
    publication_manager: OnceCell<Arc<dyn PublicationManager>>,
}

impl Dispatcher {
    /// Dispatcher transmitting through `transport`, stamping creators from `security`.
    pub fn new(transport: Arc<dyn Transport>, security: Arc<dyn SecurityManager>) -> Self {
        Self::with_parts(transport, security, SystemClock::shared(), None)
    }

    /// Dispatcher with an explicit clock and optional metrics.
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        security: Arc<dyn SecurityManager>,
        clock: Arc<dyn Clock>,
        metrics: Option<DispatchMetricsExporter>,
    ) -> Self {
        Self {
            outbox: Outbox::new(transport, security, metrics),
            clock,
            request_reply_manager: OnceCell::new(),
            subscription_manager: OnceCell::new(),
            publication_manager: OnceCell::new(),
        }
    }

    /// Bind the request-reply manager.
    pub fn register_request_reply_manager(
        &self,
        manager: Arc<dyn RequestReplyManager>,
    ) -> Result<()> {
        self.request_reply_manager
            .set(manager)
            .map_err(|_| DispatchError::ManagerAlreadyRegistered {
                manager: REQUEST_REPLY,
            })
    }

    /// Bind the subscription manager.
    pub fn register_subscription_manager(&self, manager: Arc<dyn SubscriptionManager>) -> Result<()> {
        self.subscription_manager
            .set(manager)
            .map_err(|_| DispatchError::ManagerAlreadyRegistered {
                manager: SUBSCRIPTION,
            })
    }

    /// Bind the publication manager.
    pub fn register_publication_manager(&self, manager: Arc<dyn PublicationManager>) -> Result<()> {
        self.publication_manager
            .set(manager)
            .map_err(|_| DispatchError::ManagerAlreadyRegistered {
                manager: PUBLICATION,
            })
    }

    /// Send a request; the reply arrives later through [`Dispatcher::receive`].
    pub async fn send_request(&self, settings: RoutingSettings, request: Request) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            method_name = %request.method_name,
            request_reply_id = %request.request_reply_id,
            "sending request"
        );
        let envelope = self.outbound(MessageType::Request, &settings, &request)?;
        self.outbox.transmit(envelope).await
    }

    /// Send a request that is never answered.
    pub async fn send_one_way_request(
        &self,
        settings: RoutingSettings,
        request: OneWayRequest,
    ) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            method_name = %request.method_name,
            "sending one-way request"
        );
        let envelope = self.outbound(MessageType::OneWay, &settings, &request)?;
        self.outbox.transmit(envelope).await
    }

    /// Subscribe to an attribute.
    pub async fn send_subscription_request(
        &self,
        settings: RoutingSettings,
        request: SubscriptionRequest,
    ) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            subscription_id = %request.subscription_id,
            subscribed_to_name = %request.subscribed_to_name,
            "sending subscription request"
        );
        let envelope = self.outbound(MessageType::SubscriptionRequest, &settings, &request)?;
        self.outbox.transmit(envelope).await
    }

    /// Subscribe to a broadcast.
    pub async fn send_broadcast_subscription_request(
        &self,
        settings: RoutingSettings,
        request: SubscriptionRequest,
    ) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            subscription_id = %request.subscription_id,
            subscribed_to_name = %request.subscribed_to_name,
            "sending broadcast subscription request"
        );
        let envelope =
            self.outbound(MessageType::BroadcastSubscriptionRequest, &settings, &request)?;
        self.outbox.transmit(envelope).await
    }

    /// End a subscription.
    pub async fn send_subscription_stop(
        &self,
        settings: RoutingSettings,
        stop: SubscriptionStop,
    ) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            subscription_id = %stop.subscription_id,
            "sending subscription stop"
        );
        let envelope = self.outbound(MessageType::SubscriptionStop, &settings, &stop)?;
        self.outbox.transmit(envelope).await
    }

    /// Publish to a subscriber with the expiry and headers of its subscription.
    pub async fn send_publication(
        &self,
        settings: ReplySettings,
        publication: SubscriptionPublication,
    ) -> Result<()> {
        info!(
            from = %settings.from,
            to = %settings.to,
            subscription_id = %publication.subscription_id,
            "publication"
        );
        self.send_reply(settings, MessageType::Publication, publication)
            .await
    }

    /// Answer an inbound envelope directly rather than through a [`ReplyCallback`].
    pub(crate) async fn send_reply<T: Serialize>(
        &self,
        settings: ReplySettings,
        message_type: MessageType,
        body: T,
    ) -> Result<()> {
        ReplyCallback::new(settings, message_type, self.outbox.clone())
            .send(body)
            .await
    }

    fn outbound<T: Serialize>(
        &self,
        message_type: MessageType,
        settings: &RoutingSettings,
        body: &T,
    ) -> Result<Envelope> {
        let payload = serde_json::to_string(body)?;
        let qos = &settings.messaging_qos;
        let mut envelope = Envelope::new(
            message_type,
            payload,
            settings.from.clone(),
            settings.to.clone(),
            expiry_from_ttl(self.clock.now_ms(), qos.ttl),
        );
        envelope.creator = Some(self.outbox.creator());
        envelope.custom_headers = qos.custom_headers.clone();
        if qos.effort != MessagingQosEffort::Normal {
            envelope.effort = Some(qos.effort);
        }
        Ok(envelope)
    }

    /// Route one inbound envelope to its manager.
    ///
    /// Never fails and never panics: failures while decoding the body or inside
    /// the manager are logged and end processing of this envelope only.
    pub fn receive(&self, envelope: Envelope) {
        log_envelope(EnvelopeDirection::Inbound, &envelope);
        if let Some(metrics) = self.outbox.metrics() {
            metrics.observe_received();
        }

        match &envelope.message_type {
            MessageType::Request => self.isolate(&envelope, || self.route_request(&envelope)),
            MessageType::Reply => self.isolate(&envelope, || self.route_reply(&envelope)),
            MessageType::OneWay => self.isolate(&envelope, || self.route_one_way(&envelope)),
            MessageType::SubscriptionRequest => {
                self.isolate(&envelope, || self.route_subscription_request(&envelope, false))
            }
            MessageType::BroadcastSubscriptionRequest => {
                self.isolate(&envelope, || self.route_subscription_request(&envelope, true))
            }
            MessageType::SubscriptionReply => {
                self.isolate(&envelope, || self.route_subscription_reply(&envelope))
            }
            MessageType::SubscriptionStop => {
                self.isolate(&envelope, || self.route_subscription_stop(&envelope))
            }
            MessageType::Publication => {
                self.isolate(&envelope, || self.route_publication(&envelope))
            }
            MessageType::Other(name) => {
                error!(
                    msg_id = %envelope.msg_id,
                    message_type = %name,
                    from = %envelope.from,
                    to = %envelope.to,
                    "unknown message type; discarding envelope"
                );
                if let Some(metrics) = self.outbox.metrics() {
                    metrics.observe_unroutable();
                }
            }
        }
    }

    /// Log the event; collaborators are torn down by their owners.
    pub fn shutdown(&self) {
        info!("dispatcher shut down");
    }

    fn isolate<F>(&self, envelope: &Envelope, route: F)
    where
        F: FnOnce() -> Result<()>,
    {
        let failure = match catch_unwind(AssertUnwindSafe(route)) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(panic) => format!("handler panicked: {}", panic_message(panic.as_ref())),
        };
        error!(
            msg_id = %envelope.msg_id,
            message_type = %envelope.message_type,
            from = %envelope.from,
            to = %envelope.to,
            error = %failure,
            "error handling envelope"
        );
        if let Some(metrics) = self.outbox.metrics() {
            metrics.observe_dropped();
        }
    }

    fn route_request(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.request_reply()?;
        let request = body::<Request>(envelope)?;
        let reply = self.reply_callback(envelope, MessageType::Reply);
        manager.handle_request(&envelope.to, request, reply)?;
        Ok(())
    }

    fn route_reply(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.request_reply()?;
        let reply = match decode(envelope)? {
            Payload::Decoded(mut value) => {
                if let (Some(id), Some(fields)) =
                    (&envelope.request_reply_id, value.as_object_mut())
                {
                    fields.insert("requestReplyId".to_owned(), Value::String(id.clone()));
                }
                Payload::Decoded(serde_json::from_value::<Reply>(value).map_err(|source| {
                    DispatchError::Body {
                        kind: envelope.message_type.clone(),
                        source,
                    }
                })?)
            }
            Payload::Opaque(raw) => Payload::Opaque(raw),
        };
        manager.handle_reply(reply)?;
        Ok(())
    }

    fn route_one_way(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.request_reply()?;
        let request = body::<OneWayRequest>(envelope)?;
        manager.handle_one_way_request(&envelope.to, request)?;
        Ok(())
    }

    fn route_subscription_request(&self, envelope: &Envelope, broadcast: bool) -> Result<()> {
        let manager = self.publication()?;
        let request = body::<SubscriptionRequest>(envelope)?;
        let reply = self.reply_callback(envelope, MessageType::SubscriptionReply);
        if broadcast {
            manager.handle_event_subscription_request(&envelope.from, &envelope.to, request, reply)?;
        } else {
            manager.handle_subscription_request(&envelope.from, &envelope.to, request, reply)?;
        }
        Ok(())
    }

    fn route_subscription_reply(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.subscription()?;
        manager.handle_subscription_reply(body::<SubscriptionReply>(envelope)?)?;
        Ok(())
    }

    fn route_subscription_stop(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.publication()?;
        manager.handle_subscription_stop(body::<SubscriptionStop>(envelope)?)?;
        Ok(())
    }

    fn route_publication(&self, envelope: &Envelope) -> Result<()> {
        let manager = self.subscription()?;
        manager.handle_publication(body::<SubscriptionPublication>(envelope)?)?;
        Ok(())
    }

    fn reply_callback<T: Serialize>(
        &self,
        envelope: &Envelope,
        message_type: MessageType,
    ) -> ReplyCallback<T> {
        ReplyCallback::new(
            ReplySettings::answering(envelope),
            message_type,
            self.outbox.clone(),
        )
    }

    fn request_reply(&self) -> Result<&Arc<dyn RequestReplyManager>> {
        self.request_reply_manager
            .get()
            .ok_or(DispatchError::ManagerNotRegistered {
                manager: REQUEST_REPLY,
            })
    }

    fn subscription(&self) -> Result<&Arc<dyn SubscriptionManager>> {
        self.subscription_manager
            .get()
            .ok_or(DispatchError::ManagerNotRegistered {
                manager: SUBSCRIPTION,
            })
    }

    fn publication(&self) -> Result<&Arc<dyn PublicationManager>> {
        self.publication_manager
            .get()
            .ok_or(DispatchError::ManagerNotRegistered {
                manager: PUBLICATION,
            })
    }
}

fn decode(envelope: &Envelope) -> Result<Payload<Value>> {
    decode_payload::<Value>(&envelope.payload).map_err(|source| DispatchError::Body {
        kind: envelope.message_type.clone(),
        source,
    })
}

fn body<T: DeserializeOwned>(envelope: &Envelope) -> Result<Payload<T>> {
    decode_payload::<T>(&envelope.payload).map_err(|source| DispatchError::Body {
        kind: envelope.message_type.clone(),
        source,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StaticSecurityManager;
    use conduit_msg::InMemoryTransport;

    struct NoopSubscriptions;

    impl SubscriptionManager for NoopSubscriptions {
        fn handle_subscription_reply(&self, _: Payload<SubscriptionReply>) -> anyhow::Result<()> {
            Ok(())
        }

        fn handle_publication(&self, _: Payload<SubscriptionPublication>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(InMemoryTransport::new()),
            Arc::new(StaticSecurityManager::new("tester")),
        )
    }

    #[test]
    fn managers_bind_once() {
        let dispatcher = dispatcher();
        dispatcher
            .register_subscription_manager(Arc::new(NoopSubscriptions))
            .expect("first registration");
        let second = dispatcher.register_subscription_manager(Arc::new(NoopSubscriptions));
        assert!(matches!(
            second,
            Err(DispatchError::ManagerAlreadyRegistered {
                manager: SUBSCRIPTION
            })
        ));
    }

    #[test]
    fn receive_before_registration_is_contained() {
        let dispatcher = dispatcher();
        let envelope = Envelope::new(MessageType::Request, "{}", "proxy", "provider", 1);
        dispatcher.receive(envelope.clone());
        assert!(matches!(
            dispatcher.route_request(&envelope),
            Err(DispatchError::ManagerNotRegistered {
                manager: REQUEST_REPLY
            })
        ));
    }

    #[test]
    fn panic_payloads_are_readable() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
