//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope dispatcher, manager collaborators and reply callbacks."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use conduit_msg::envelope::CustomHeaders;
use conduit_msg::{
    log_envelope, DispatchMetricsExporter, Envelope, EnvelopeDirection, MessageType, Transport,
};
use futures::future::{self, BoxFuture, FutureExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::collaborators::SecurityManager;
use crate::Result;

/// Transmission path shared by the dispatcher and its reply callbacks.
#[derive(Clone)]
pub(crate) struct Outbox {
    transport: Arc<dyn Transport>,
    security: Arc<dyn SecurityManager>,
    metrics: Option<DispatchMetricsExporter>,
}

impl Outbox {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        security: Arc<dyn SecurityManager>,
        metrics: Option<DispatchMetricsExporter>,
    ) -> Self {
        Self {
            transport,
            security,
            metrics,
        }
    }

    pub(crate) fn creator(&self) -> String {
        self.security.current_process_user_id()
    }

    pub(crate) fn metrics(&self) -> Option<&DispatchMetricsExporter> {
        self.metrics.as_ref()
    }

    /// Single transmission attempt; the transport's verdict is returned unchanged.
    pub(crate) async fn transmit(&self, envelope: Envelope) -> Result<()> {
        log_envelope(EnvelopeDirection::Outbound, &envelope);
        let msg_id = envelope.msg_id.clone();
        match self.transport.transmit(envelope).await {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.observe_sent();
                }
                Ok(())
            }
            Err(err) => {
                warn!(
                    transport = self.transport.name(),
                    msg_id = %msg_id,
                    error = %err,
                    "transport send failed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.observe_dropped();
                }
                Err(err.into())
            }
        }
    }
}

/// Routing headers of an answer to an inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplySettings {
    /// Answering participant (the inbound `to`).
    pub from: String,
    /// Original sender (the inbound `from`).
    pub to: String,
    /// Expiry inherited from the inbound envelope.
    pub expiry_date_ms: i64,
    /// Custom headers inherited from the inbound envelope.
    pub custom_headers: CustomHeaders,
}

impl ReplySettings {
    /// Settings answering `envelope`: addresses swapped, expiry and headers kept.
    pub fn answering(envelope: &Envelope) -> Self {
        Self {
            from: envelope.to.clone(),
            to: envelope.from.clone(),
            expiry_date_ms: envelope.expiry_date_ms,
            custom_headers: envelope.custom_headers.clone(),
        }
    }
}

/// One-shot handle answering an inbound request or subscription request.
///
/// Handed to managers together with the decoded body. `send` consumes the
/// callback, so each inbound envelope is answered at most once.
pub struct ReplyCallback<T> {
    settings: ReplySettings,
    message_type: MessageType,
    outbox: Outbox,
    _body: PhantomData<fn(T)>,
}

impl<T> fmt::Debug for ReplyCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyCallback")
            .field("settings", &self.settings)
            .field("message_type", &self.message_type)
            .finish()
    }
}

impl<T: Serialize> ReplyCallback<T> {
    pub(crate) fn new(settings: ReplySettings, message_type: MessageType, outbox: Outbox) -> Self {
        Self {
            settings,
            message_type,
            outbox,
            _body: PhantomData,
        }
    }

    /// Routing headers the answer will carry.
    pub fn settings(&self) -> &ReplySettings {
        &self.settings
    }

    /// Message kind of the answer.
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Build the answer envelope now and return the pending transmission.
    pub fn send(self, body: T) -> BoxFuture<'static, Result<()>> {
        let envelope = match self.envelope(&body) {
            Ok(envelope) => envelope,
            Err(err) => return future::ready(Err(err)).boxed(),
        };
        info!(
            message_type = %self.message_type,
            from = %self.settings.from,
            to = %self.settings.to,
            "replying"
        );
        let outbox = self.outbox;
        async move { outbox.transmit(envelope).await }.boxed()
    }

    fn envelope(&self, body: &T) -> Result<Envelope> {
        let payload = serde_json::to_string(body)?;
        let mut envelope = Envelope::new(
            self.message_type.clone(),
            payload,
            self.settings.from.clone(),
            self.settings.to.clone(),
            self.settings.expiry_date_ms,
        );
        envelope.creator = Some(self.outbox.creator());
        envelope.custom_headers = self.settings.custom_headers.clone();
        Ok(envelope)
    }
}
