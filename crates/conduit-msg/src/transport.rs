//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::envelope::Envelope;
use crate::{MessagingError, Result};

/// Outbound side of a messaging backend.
///
/// `transmit` is attempted once per call; retry and queueing belong to the
/// implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand an envelope to the transport.
    async fn transmit(&self, envelope: Envelope) -> Result<()>;
    /// Human-readable transport name for logging/metrics.
    fn name(&self) -> &'static str;
}

/// In-memory transport backed by a mutex protected queue.
///
/// Clones share the same queue, so a test can keep one handle and give
/// another to the dispatcher.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    queue: Arc<Mutex<VecDeque<Envelope>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryTransport {
    /// Create a new in-memory transport channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest transmitted envelope.
    pub fn recv(&self) -> Option<Envelope> {
        self.queue.lock().pop_front()
    }

    /// Take every transmitted envelope, oldest first.
    pub fn drain(&self) -> Vec<Envelope> {
        self.queue.lock().drain(..).collect()
    }

    /// Number of queued envelopes.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Make subsequent transmissions fail with [`MessagingError::TransportUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn transmit(&self, envelope: Envelope) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(MessagingError::TransportUnavailable {
                transport: self.name(),
            });
        }
        self.queue.lock().push_back(envelope);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
