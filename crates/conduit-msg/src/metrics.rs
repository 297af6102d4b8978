//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use prometheus::{IntCounter, Opts, Registry};
use tracing::debug;

use crate::envelope::Envelope;

/// Direction of envelope movement, used for consistent logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeDirection {
    /// Envelope handed to the transport.
    Outbound,
    /// Envelope received from the transport.
    Inbound,
}

/// Emit a structured log entry for envelope activity.
pub fn log_envelope(direction: EnvelopeDirection, envelope: &Envelope) {
    debug!(
        msg_id = %envelope.msg_id,
        message_type = %envelope.message_type,
        from = %envelope.from,
        to = %envelope.to,
        expiry_date_ms = envelope.expiry_date_ms,
        effort = envelope.effective_effort().as_str(),
        direction = ?direction,
        payload = %envelope.payload,
        "dispatch activity"
    );
}

/// Prometheus metric handles for dispatcher activity.
#[derive(Debug, Clone)]
pub struct DispatchMetricsExporter {
    sent: IntCounter,
    received: IntCounter,
    dropped: IntCounter,
    unroutable: IntCounter,
}

impl DispatchMetricsExporter {
    /// Register dispatch metrics with the provided registry.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let sent = IntCounter::with_opts(Opts::new(
            "envelopes_sent_total",
            "Envelopes accepted by the transport",
        ))?;
        let received = IntCounter::with_opts(Opts::new(
            "envelopes_received_total",
            "Envelopes handed to the dispatcher",
        ))?;
        let dropped = IntCounter::with_opts(Opts::new(
            "envelopes_dropped_total",
            "Envelopes whose send failed or whose handler failed",
        ))?;
        let unroutable = IntCounter::with_opts(Opts::new(
            "envelopes_unroutable_total",
            "Inbound envelopes with an unknown message type",
        ))?;

        registry.register(Box::new(sent.clone()))?;
        registry.register(Box::new(received.clone()))?;
        registry.register(Box::new(dropped.clone()))?;
        registry.register(Box::new(unroutable.clone()))?;

        Ok(Self {
            sent,
            received,
            dropped,
            unroutable,
        })
    }

    /// Record a transmitted envelope.
    pub fn observe_sent(&self) {
        self.sent.inc();
    }

    /// Record a received envelope.
    pub fn observe_received(&self) {
        self.received.inc();
    }

    /// Record a failed send or handler.
    pub fn observe_dropped(&self) {
        self.dropped.inc();
    }

    /// Record an envelope with an unknown type.
    pub fn observe_unroutable(&self) {
        self.unroutable.inc();
    }

    /// Number of transmitted envelopes.
    pub fn sent(&self) -> u64 {
        self.sent.get()
    }

    /// Number of received envelopes.
    pub fn received(&self) -> u64 {
        self.received.get()
    }

    /// Number of dropped envelopes.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    /// Number of unroutable envelopes.
    pub fn unroutable(&self) -> u64 {
        self.unroutable.get()
    }
}
