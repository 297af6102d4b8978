//! ---
//! conduit_section: "15-testing-qa-runbook"
//! conduit_subsection: "integration-tests"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Integration and validation tests for the Conduit dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use conduit_common::config::RuntimeConfig;
use conduit_common::time::ManualClock;
use conduit_dispatch::{
    Provider, PublicationManager, ReplyCallback, RequestReplyManager, StaticSecurityManager,
    SubscriptionManager,
};
use conduit_msg::{
    Envelope, MessageType, OneWayRequest, Payload, ProviderQos, RemoteError, Reply, Request,
    SubscriptionPublication, SubscriptionQos, SubscriptionReply, SubscriptionRequest,
    SubscriptionStop, Version,
};
use conduit_runtime::{ConduitRuntime, RuntimeManagers};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

const NOW: i64 = 1_700_000_000_000;

struct Thermostat;

impl Provider for Thermostat {
    fn interface_name(&self) -> &str {
        "home/Thermostat"
    }

    fn version(&self) -> Version {
        Version::new(2, 0)
    }

    fn has_attributes(&self) -> bool {
        true
    }
}

/// Answers `getTemperature` from a spawned task and rejects everything else.
struct Home {
    replies: UnboundedSender<Reply>,
    subscriptions: Mutex<Vec<SubscriptionRequest>>,
    stops: Mutex<Vec<String>>,
    publications: Mutex<Vec<SubscriptionPublication>>,
    subscription_replies: Mutex<Vec<SubscriptionReply>>,
}

impl Home {
    fn new() -> (Arc<Self>, UnboundedReceiver<Reply>) {
        let (replies, rx) = unbounded_channel();
        let home = Arc::new(Self {
            replies,
            subscriptions: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
            publications: Mutex::new(Vec::new()),
            subscription_replies: Mutex::new(Vec::new()),
        });
        (home, rx)
    }
}

impl RequestReplyManager for Home {
    fn handle_request(
        &self,
        _participant_id: &str,
        request: Payload<Request>,
        reply: ReplyCallback<Reply>,
    ) -> anyhow::Result<()> {
        let request = request
            .into_decoded()
            .ok_or_else(|| anyhow::anyhow!("opaque request"))?;
        let answer = match request.method_name.as_str() {
            "getTemperature" => Reply::ok(request.request_reply_id, vec![json!(21.5)]),
            other => Reply::err(
                request.request_reply_id,
                RemoteError::method_invocation(format!("unknown method {other}")),
            ),
        };
        tokio::spawn(async move {
            if let Err(err) = reply.send(answer).await {
                panic!("reply failed: {err}");
            }
        });
        Ok(())
    }

    fn handle_reply(&self, reply: Payload<Reply>) -> anyhow::Result<()> {
        let reply = reply
            .into_decoded()
            .ok_or_else(|| anyhow::anyhow!("opaque reply"))?;
        self.replies.send(reply)?;
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

impl SubscriptionManager for Home {
    fn handle_subscription_reply(&self, reply: Payload<SubscriptionReply>) -> anyhow::Result<()> {
        if let Some(reply) = reply.into_decoded() {
            self.subscription_replies.lock().push(reply);
        }
        Ok(())
    }

    fn handle_publication(
        &self,
        publication: Payload<SubscriptionPublication>,
    ) -> anyhow::Result<()> {
        let publication = publication
            .into_decoded()
            .ok_or_else(|| anyhow::anyhow!("opaque publication"))?;
        if publication.subscription_id == "explode" {
            panic!("subscriber crashed");
        }
        self.publications.lock().push(publication);
        Ok(())
    }
}

impl PublicationManager for Home {
    fn handle_subscription_request(
        &self,
        _proxy_participant_id: &str,
        _provider_participant_id: &str,
        request: Payload<SubscriptionRequest>,
        reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()> {
        let request = request
            .into_decoded()
            .ok_or_else(|| anyhow::anyhow!("opaque subscription request"))?;
        let answer = SubscriptionReply::ok(request.subscription_id.clone());
        self.subscriptions.lock().push(request);
        tokio::spawn(reply.send(answer));
        Ok(())
    }

    fn handle_event_subscription_request(
        &self,
        proxy_participant_id: &str,
        provider_participant_id: &str,
        request: Payload<SubscriptionRequest>,
        reply: ReplyCallback<SubscriptionReply>,
    ) -> anyhow::Result<()> {
        self.handle_subscription_request(
            proxy_participant_id,
            provider_participant_id,
            request,
            reply,
        )
    }

    fn handle_subscription_stop(&self, stop: Payload<SubscriptionStop>) -> anyhow::Result<()> {
        if let Some(stop) = stop.into_decoded() {
            self.stops.lock().push(stop.subscription_id);
        }
        Ok(())
    }

    fn add_publication_provider(&self, _participant_id: &str, provider: Arc<dyn Provider>) -> bool {
        provider.has_attributes()
    }

    fn remove_publication_provider(&self, _participant_id: &str, _provider: Arc<dyn Provider>) {}
}

struct Fixture {
    runtime: ConduitRuntime,
    home: Arc<Home>,
    replies: UnboundedReceiver<Reply>,
    provider_id: String,
}

async fn fixture() -> Fixture {
    let (home, replies) = Home::new();
    let managers = home.clone();
    let runtime = ConduitRuntime::start_with_clock(
        RuntimeConfig::default(),
        Arc::new(StaticSecurityManager::new("svc-home")),
        None,
        Arc::new(ManualClock::new(NOW)),
        move |_dispatcher| RuntimeManagers {
            request_reply: managers.clone(),
            subscription: managers.clone(),
            publication: managers,
        },
    )
    .expect("runtime starts");
    let provider_id = runtime
        .registrar()
        .register_provider("home", Arc::new(Thermostat), ProviderQos::default(), None, None)
        .await
        .expect("thermostat registers");
    runtime
        .add_local_participant("app")
        .await
        .expect("app is reachable");
    Fixture {
        runtime,
        home,
        replies,
        provider_id,
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn provider_answers_are_correlated_with_requests() {
    let mut fx = fixture().await;
    let request = Request::new("getTemperature", vec![], vec![]);
    let id = request.request_reply_id.clone();
    fx.runtime
        .dispatcher()
        .send_request(fx.runtime.routing_settings("app", &fx.provider_id), request)
        .await
        .expect("sent");

    let reply = timeout(Duration::from_secs(1), fx.replies.recv())
        .await
        .expect("reply in time")
        .expect("channel open");
    assert_eq!(reply.request_reply_id, id);
    assert_eq!(reply.response, Some(vec![json!(21.5)]));
    assert!(reply.error.is_none());
}

#[tokio::test]
async fn application_errors_travel_back_as_replies() {
    let mut fx = fixture().await;
    fx.runtime
        .dispatcher()
        .send_request(
            fx.runtime.routing_settings("app", &fx.provider_id),
            Request::new("setTemperature", vec![json!(30)], vec!["Double".into()]),
        )
        .await
        .expect("sent");

    let reply = timeout(Duration::from_secs(1), fx.replies.recv())
        .await
        .expect("reply in time")
        .expect("channel open");
    assert!(reply.response.is_none());
    assert_eq!(
        reply.error,
        Some(RemoteError::method_invocation("unknown method setTemperature"))
    );
}

#[tokio::test]
async fn wire_subscriptions_with_legacy_qos_are_resolved() {
    let fx = fixture().await;
    let payload = json!({
        "subscriptionId": "sub-legacy",
        "subscribedToName": "temperature",
        "qos": {
            "_typeName": "joynr.OnChangeWithKeepAliveSubscriptionQos",
            "minInterval": 20,
            "maxInterval": 10,
            "alertAfterInterval": 5,
            "expiryDate": NOW + 60_000
        }
    });
    let mut envelope = Envelope::new(
        MessageType::SubscriptionRequest,
        payload.to_string(),
        "app",
        fx.provider_id.clone(),
        NOW + 60_000,
    );
    envelope
        .custom_headers
        .insert("trace".into(), "t-42".into());
    fx.runtime.dispatcher().receive(envelope);
    settle().await;

    let subscriptions = fx.home.subscriptions.lock().clone();
    assert_eq!(subscriptions.len(), 1);
    match &subscriptions[0].qos {
        SubscriptionQos::OnChangeWithKeepAlive(qos) => {
            assert_eq!(qos.min_interval_ms(), 20);
            assert_eq!(qos.max_interval_ms(), 50);
            assert_eq!(qos.alert_after_interval_ms(), 50);
            assert_eq!(qos.expiry_date_ms(), NOW + 60_000);
        }
        other => panic!("unexpected qos {other:?}"),
    }

    let replies = fx.home.subscription_replies.lock().clone();
    assert_eq!(replies, vec![SubscriptionReply::ok("sub-legacy")]);
}

#[tokio::test]
async fn a_crashing_subscriber_does_not_stop_delivery() {
    let fx = fixture().await;
    let dispatcher = fx.runtime.dispatcher();
    let to_app = |id: &str| {
        Envelope::new(
            MessageType::Publication,
            serde_json::to_string(&SubscriptionPublication::value(id, vec![json!(1)]))
                .expect("serialize"),
            fx.provider_id.clone(),
            "app",
            NOW + 1_000,
        )
    };

    dispatcher.receive(to_app("explode"));
    dispatcher.receive(to_app("sub-1"));
    dispatcher.receive(Envelope::new(
        MessageType::SubscriptionStop,
        r#"{"subscriptionId":"sub-1"}"#,
        "app",
        fx.provider_id.clone(),
        NOW + 1_000,
    ));

    let publications = fx.home.publications.lock().clone();
    assert_eq!(publications.len(), 1);
    assert_eq!(publications[0].subscription_id, "sub-1");
    assert_eq!(fx.home.stops.lock().clone(), vec!["sub-1".to_owned()]);

    let registry = fx.runtime.metrics_registry().expect("metrics enabled");
    let dropped = registry
        .gather()
        .into_iter()
        .find(|family| family.get_name().ends_with("dropped_total"))
        .map(|family| family.get_metric()[0].get_counter().get_value())
        .expect("dropped counter registered");
    assert_eq!(dropped, 1.0);
}
