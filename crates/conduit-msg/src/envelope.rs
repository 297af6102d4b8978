//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use conduit_common::config::MessagingConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use uuid::Uuid;

/// Delivery effort hint; only non-default values travel on the wire.
pub use conduit_common::config::Effort as MessagingQosEffort;

/// Ordered custom header map carried on envelopes.
pub type CustomHeaders = IndexMap<String, String>;

/// Kind tag of an envelope, selecting the body type carried in its payload.
///
/// Unknown wire names are preserved in [`MessageType::Other`] so that the
/// receiving side can log and discard them instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// Method invocation expecting a reply.
    #[strum(serialize = "request")]
    Request,
    /// Reply to a [`MessageType::Request`].
    #[strum(serialize = "reply")]
    Reply,
    /// Method invocation without a reply.
    #[strum(serialize = "oneWay")]
    OneWay,
    /// Attribute subscription request.
    #[strum(serialize = "subscriptionRequest")]
    SubscriptionRequest,
    /// Broadcast (event) subscription request.
    #[strum(serialize = "broadcastSubscriptionRequest")]
    BroadcastSubscriptionRequest,
    /// Reply to either subscription request kind.
    #[strum(serialize = "subscriptionReply")]
    SubscriptionReply,
    /// Request to end a subscription.
    #[strum(serialize = "subscriptionStop")]
    SubscriptionStop,
    /// Publication delivered to a subscriber.
    #[strum(serialize = "publication")]
    Publication,
    /// Any type name this runtime does not understand.
    #[strum(default)]
    Other(String),
}

impl MessageType {
    /// Wire name of the message type.
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Request => "request",
            MessageType::Reply => "reply",
            MessageType::OneWay => "oneWay",
            MessageType::SubscriptionRequest => "subscriptionRequest",
            MessageType::BroadcastSubscriptionRequest => "broadcastSubscriptionRequest",
            MessageType::SubscriptionReply => "subscriptionReply",
            MessageType::SubscriptionStop => "subscriptionStop",
            MessageType::Publication => "publication",
            MessageType::Other(name) => name,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match MessageType::from_str(&value) {
            Ok(kind) => kind,
            Err(_) => MessageType::Other(value),
        }
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

/// The unit of wire transmission: routing headers plus a serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique identifier used for tracing.
    pub msg_id: String,
    /// Body kind.
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Serialized body.
    pub payload: String,
    /// Sending participant.
    pub from: String,
    /// Receiving participant.
    pub to: String,
    /// Absolute expiry in epoch milliseconds.
    pub expiry_date_ms: i64,
    /// Identity of the process user that sent the envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    /// Application headers, forwarded verbatim on replies.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_headers: CustomHeaders,
    /// Delivery effort; absent means [`MessagingQosEffort::Normal`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<MessagingQosEffort>,
    /// Correlation id header; on replies it overrides the id in the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_reply_id: Option<String>,
}

impl Envelope {
    /// Construct an envelope with the mandatory routing headers set.
    pub fn new(
        message_type: MessageType,
        payload: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        expiry_date_ms: i64,
    ) -> Self {
        Self {
            msg_id: Uuid::new_v4().to_string(),
            message_type,
            payload: payload.into(),
            from: from.into(),
            to: to.into(),
            expiry_date_ms,
            creator: None,
            custom_headers: CustomHeaders::new(),
            effort: None,
            request_reply_id: None,
        }
    }

    /// Effective delivery effort.
    pub fn effective_effort(&self) -> MessagingQosEffort {
        self.effort.unwrap_or_default()
    }
}

/// Per-call messaging settings supplied by the caller of an outbound operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingQos {
    /// Time-to-live relative to the moment of sending.
    pub ttl: Duration,
    /// Delivery effort hint.
    pub effort: MessagingQosEffort,
    /// Headers copied onto the envelope.
    pub custom_headers: CustomHeaders,
}

impl MessagingQos {
    /// Default time-to-live applied when none is configured.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    /// Messaging QoS with the given time-to-live and default effort.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            effort: MessagingQosEffort::Normal,
            custom_headers: CustomHeaders::new(),
        }
    }

    /// Messaging QoS seeded from runtime configuration defaults.
    pub fn from_config(config: &MessagingConfig) -> Self {
        Self {
            ttl: config.default_ttl,
            effort: config.default_effort,
            custom_headers: CustomHeaders::new(),
        }
    }

    /// Override the delivery effort.
    pub fn with_effort(mut self, effort: MessagingQosEffort) -> Self {
        self.effort = effort;
        self
    }

    /// Add a custom header.
    pub fn with_custom_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }
}

impl Default for MessagingQos {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_wire_names() {
        assert_eq!(MessageType::from("oneWay".to_owned()), MessageType::OneWay);
        assert_eq!(
            MessageType::from("broadcastSubscriptionRequest".to_owned()),
            MessageType::BroadcastSubscriptionRequest
        );
        assert_eq!(
            MessageType::from("multicast".to_owned()),
            MessageType::Other("multicast".to_owned())
        );
        assert_eq!(String::from(MessageType::SubscriptionStop), "subscriptionStop");
        assert_eq!(MessageType::Other("x".into()).to_string(), "x");
    }

    #[test]
    fn envelope_json_omits_defaults() {
        let envelope = Envelope::new(MessageType::Request, "{}", "proxy", "provider", 42);
        let json = serde_json::to_value(&envelope).expect("serialize");
        assert_eq!(json["type"], "request");
        assert_eq!(json["expiryDateMs"], 42);
        assert!(json.get("effort").is_none());
        assert!(json.get("customHeaders").is_none());
        assert!(json.get("creator").is_none());
    }

    #[test]
    fn unknown_type_survives_parsing() {
        let raw = r#"{"msgId":"m1","type":"bogus","payload":"","from":"a","to":"b","expiryDateMs":1}"#;
        let envelope: Envelope = serde_json::from_str(raw).expect("parse");
        assert_eq!(envelope.message_type, MessageType::Other("bogus".into()));
        assert_eq!(envelope.effective_effort(), MessagingQosEffort::Normal);
    }

    #[test]
    fn messaging_qos_builders() {
        let qos = MessagingQos::new(Duration::from_millis(500))
            .with_effort(MessagingQosEffort::BestEffort)
            .with_custom_header("trace", "t-1");
        assert_eq!(qos.ttl, Duration::from_millis(500));
        assert_eq!(qos.effort, MessagingQosEffort::BestEffort);
        assert_eq!(qos.custom_headers.get("trace").map(String::as_str), Some("t-1"));
    }
}
