//! ---
//! conduit_section: "15-testing-qa-runbook"
//! conduit_subsection: "integration-tests"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Integration and validation tests for the Conduit dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::fs;
use std::sync::Arc;

use conduit_common::config::RuntimeConfig;
use conduit_common::time::ManualClock;
use conduit_dispatch::{
    Provider, PublicationManager, ReplyCallback, RequestReplyManager, StaticSecurityManager,
    SubscriptionManager,
};
use conduit_msg::{
    InMemoryTransport, MessagingQosEffort, OneWayRequest, Payload, ProviderQos, Reply, Request,
    SubscriptionPublication, SubscriptionReply, SubscriptionRequest, SubscriptionStop, Transport,
    Version,
};
use conduit_runtime::{ConduitRuntime, RuntimeManagers};
use tempfile::tempdir;

const NOW: i64 = 50_000;

struct Inert;

impl RequestReplyManager for Inert {
    fn handle_request(
        &self,
        _participant_id: &str,
        _request: Payload<Request>,
        _reply: ReplyCallback<Reply>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_reply(&self, _reply: Payload<Reply>) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_one_way_request(
        &self,
        _participant_id: &str,
        _request: Payload<OneWayRequest>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_request_caller(&self, _participant_id: &str, _provider: Arc<dyn Provider>) {}

    fn remove_request_caller(&self, _participant_id: &str) {}
}

impl SubscriptionManager for Inert {
    fn handle_subscription_reply(&self, _reply: Payload<SubscriptionReply>) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_publication(
        &self,
        _publication: Payload<SubscriptionPublication>,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

impl PublicationManager for Inert {
    fn handle_subscription_request(
        &self,
        _proxy_participant_id: &str,
        _provider_participant_id: &str,
        _request: Payload<SubscriptionRequest>,
        _reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_event_subscription_request(
        &self,
        _proxy_participant_id: &str,
        _provider_participant_id: &str,
        _request: Payload<SubscriptionRequest>,
        _reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_subscription_stop(&self, _stop: Payload<SubscriptionStop>) -> anyhow::Result<()> {
        Ok(())
    }

    fn add_publication_provider(&self, _participant_id: &str, _provider: Arc<dyn Provider>) -> bool {
        false
    }

    fn remove_publication_provider(&self, _participant_id: &str, _provider: Arc<dyn Provider>) {}
}

struct Lamp;

impl Provider for Lamp {
    fn interface_name(&self) -> &str {
        "home/Lamp"
    }

    fn version(&self) -> Version {
        Version::new(1, 0)
    }
}

fn start(config: RuntimeConfig, remote: Arc<InMemoryTransport>) -> ConduitRuntime {
    ConduitRuntime::start_with_clock(
        config,
        Arc::new(StaticSecurityManager::new("svc-lamp")),
        Some(remote as Arc<dyn Transport>),
        Arc::new(ManualClock::new(NOW)),
        |_dispatcher| {
            let inert = Arc::new(Inert);
            RuntimeManagers {
                request_reply: inert.clone(),
                subscription: inert.clone(),
                publication: inert,
            }
        },
    )
    .expect("runtime starts")
}

#[tokio::test]
async fn file_configuration_drives_the_runtime() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("conduit.toml");
    fs::write(
        &path,
        r#"
[messaging]
default_ttl = 2500
default_effort = "BEST_EFFORT"

[capabilities]
default_expiry = 60000
local_address_id = "cc-lamp"

[metrics]
enabled = false
"#,
    )
    .expect("write config");

    let loaded = RuntimeConfig::load_with_source(&[path.clone()]).expect("config loads");
    assert_eq!(loaded.source, path);

    let remote = Arc::new(InMemoryTransport::new());
    let runtime = start(loaded.config, remote.clone());
    assert!(runtime.metrics_registry().is_none());
    assert_eq!(runtime.local_address().to_string(), "inprocess://cc-lamp");

    let provider_id = runtime
        .registrar()
        .register_provider("home", Arc::new(Lamp), ProviderQos::default(), None, None)
        .await
        .expect("lamp registers");
    let entry = runtime.discovery().get(&provider_id).expect("entry stored");
    assert_eq!(entry.expiry_date_ms, NOW + 60_000);

    runtime
        .dispatcher()
        .send_one_way_request(
            runtime.routing_settings(&provider_id, "cloud-listener"),
            OneWayRequest::new("switchedOn", vec![], vec![]),
        )
        .await
        .expect("forwarded");
    let envelope = remote.recv().expect("remote envelope");
    assert_eq!(envelope.expiry_date_ms, NOW + 2_500);
    assert_eq!(envelope.effort, Some(MessagingQosEffort::BestEffort));
}

#[test]
fn missing_configuration_files_are_reported() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    let err = RuntimeConfig::load(&[missing]).expect_err("nothing to load");
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_documents_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("conduit.toml");
    fs::write(&path, "[capabilities]\nlocal_address_id = \"\"\n").expect("write config");
    assert!(RuntimeConfig::load(&[path]).is_err());
}
