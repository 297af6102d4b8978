//! ---
//! conduit_section: "04-configuration-orchestration"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "In-process runtime wiring and reference collaborators."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use conduit_common::time::Clock;
use conduit_dispatch::Dispatcher;
use conduit_msg::{Address, Envelope, MessagingError, Result, Transport};
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::memory::InMemoryRoutingTable;

/// Transport delivering envelopes for local participants straight to the
/// dispatcher and forwarding everything else to an optional remote transport.
///
/// Envelopes that are already expired are refused.
pub struct LoopbackTransport {
    routing_table: Arc<InMemoryRoutingTable>,
    local_address: Address,
    clock: Arc<dyn Clock>,
    remote: Option<Arc<dyn Transport>>,
    dispatcher: OnceCell<Weak<Dispatcher>>,
}

impl LoopbackTransport {
    pub fn new(
        routing_table: Arc<InMemoryRoutingTable>,
        local_address: Address,
        clock: Arc<dyn Clock>,
        remote: Option<Arc<dyn Transport>>,
    ) -> Self {
        Self {
            routing_table,
            local_address,
            clock,
            remote,
            dispatcher: OnceCell::new(),
        }
    }

    /// Bind the dispatcher receiving local deliveries. Only the first call has an effect.
    pub fn attach(&self, dispatcher: &Arc<Dispatcher>) {
        if self.dispatcher.set(Arc::downgrade(dispatcher)).is_err() {
            warn!("loopback transport already attached to a dispatcher");
        }
    }

    fn local_dispatcher(&self) -> Option<Arc<Dispatcher>> {
        self.dispatcher.get().and_then(Weak::upgrade)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn transmit(&self, envelope: Envelope) -> Result<()> {
        let now_ms = self.clock.now_ms();
        if envelope.expiry_date_ms < now_ms {
            warn!(
                msg_id = %envelope.msg_id,
                to = %envelope.to,
                expiry_date_ms = envelope.expiry_date_ms,
                now_ms,
                "dropping expired envelope"
            );
            return Err(MessagingError::Transport(format!(
                "envelope {} expired at {}",
                envelope.msg_id, envelope.expiry_date_ms
            )));
        }

        match self.routing_table.resolve(&envelope.to) {
            Some(address) if address == self.local_address => {
                let dispatcher = self.local_dispatcher().ok_or(MessagingError::TransportUnavailable {
                    transport: self.name(),
                })?;
                debug!(msg_id = %envelope.msg_id, to = %envelope.to, "delivering locally");
                dispatcher.receive(envelope);
                Ok(())
            }
            _ => match &self.remote {
                Some(remote) => remote.transmit(envelope).await,
                None => Err(MessagingError::Transport(format!(
                    "no route to participant {}",
                    envelope.to
                ))),
            },
        }
    }

    fn name(&self) -> &'static str {
        "loopback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_capabilities::MessageRouter;
    use conduit_common::time::ManualClock;
    use conduit_msg::{InMemoryTransport, MessageType};

    fn transport(
        remote: Option<Arc<dyn Transport>>,
    ) -> (LoopbackTransport, Arc<InMemoryRoutingTable>) {
        let table = Arc::new(InMemoryRoutingTable::new());
        let loopback = LoopbackTransport::new(
            table.clone(),
            Address::in_process("local"),
            Arc::new(ManualClock::new(1_000)),
            remote,
        );
        (loopback, table)
    }

    #[tokio::test]
    async fn expired_envelopes_are_refused() {
        let (loopback, _) = transport(None);
        let envelope = Envelope::new(MessageType::Request, "{}", "a", "b", 999);
        let err = loopback.transmit(envelope).await.expect_err("expired");
        assert!(matches!(err, MessagingError::Transport(_)));
    }

    #[tokio::test]
    async fn local_delivery_needs_an_attached_dispatcher() {
        let (loopback, table) = transport(None);
        table
            .add_next_hop("b", Address::in_process("local"))
            .await
            .expect("route");
        let envelope = Envelope::new(MessageType::Request, "{}", "a", "b", 5_000);
        let err = loopback.transmit(envelope).await.expect_err("unattached");
        assert!(matches!(
            err,
            MessagingError::TransportUnavailable { transport: "loopback" }
        ));
    }

    #[tokio::test]
    async fn foreign_hops_go_to_the_remote_transport() {
        let remote = Arc::new(InMemoryTransport::new());
        let (loopback, table) = transport(Some(remote.clone() as Arc<dyn Transport>));
        table
            .add_next_hop("b", Address::in_process("other-runtime"))
            .await
            .expect("route");
        let envelope = Envelope::new(MessageType::OneWay, "{}", "a", "b", 5_000);
        loopback.transmit(envelope).await.expect("forwarded");
        assert_eq!(remote.len(), 1);

        let (isolated, _) = transport(None);
        let envelope = Envelope::new(MessageType::OneWay, "{}", "a", "b", 5_000);
        assert!(isolated.transmit(envelope).await.is_err());
    }
}
