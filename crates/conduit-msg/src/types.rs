//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
//! Typed message bodies carried inside [`crate::Envelope`] payloads.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::exceptions::RemoteError;
use crate::qos::SubscriptionQos;

/// Inbound payload as seen by a handler.
///
/// Payload text that is not JSON at all is handed over verbatim as
/// [`Payload::Opaque`] so the handler still observes the message.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// Payload parsed into the body type of the envelope's message kind.
    Decoded(T),
    /// Raw payload text that could not be parsed as JSON.
    Opaque(String),
}

impl<T> Payload<T> {
    /// Borrow the decoded body, if any.
    pub fn decoded(&self) -> Option<&T> {
        match self {
            Payload::Decoded(body) => Some(body),
            Payload::Opaque(_) => None,
        }
    }

    /// Consume the payload, returning the decoded body if any.
    pub fn into_decoded(self) -> Option<T> {
        match self {
            Payload::Decoded(body) => Some(body),
            Payload::Opaque(_) => None,
        }
    }

    /// Whether the payload fell back to raw text.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Payload::Opaque(_))
    }

    /// Apply `f` to the decoded body, leaving opaque payloads untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Payload<U> {
        match self {
            Payload::Decoded(body) => Payload::Decoded(f(body)),
            Payload::Opaque(raw) => Payload::Opaque(raw),
        }
    }
}

/// Decode an envelope payload into body type `T`.
///
/// Text that is not valid JSON is logged and returned as [`Payload::Opaque`].
/// Valid JSON that does not match `T` is a body construction error.
pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<Payload<T>, serde_json::Error> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, payload_len = raw.len(), "payload is not json; passing it through unparsed");
            return Ok(Payload::Opaque(raw.to_owned()));
        }
    };
    serde_json::from_value(value).map(Payload::Decoded)
}

/// Method invocation expecting a [`Reply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Correlation id echoed by the reply.
    pub request_reply_id: String,
    /// Provider method to invoke.
    pub method_name: String,
    /// Positional arguments.
    #[serde(default)]
    pub params: Vec<Value>,
    /// Type names of the positional arguments.
    #[serde(default)]
    pub param_datatypes: Vec<String>,
}

impl Request {
    /// Request with a freshly generated correlation id.
    pub fn new(method_name: impl Into<String>, params: Vec<Value>, param_datatypes: Vec<String>) -> Self {
        Self {
            request_reply_id: Uuid::new_v4().to_string(),
            method_name: method_name.into(),
            params,
            param_datatypes,
        }
    }
}

/// Outcome of a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Correlation id of the originating request.
    pub request_reply_id: String,
    /// Return values on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<Value>>,
    /// Failure reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl Reply {
    /// Successful reply.
    pub fn ok(request_reply_id: impl Into<String>, response: Vec<Value>) -> Self {
        Self {
            request_reply_id: request_reply_id.into(),
            response: Some(response),
            error: None,
        }
    }

    /// Failed reply.
    pub fn err(request_reply_id: impl Into<String>, error: RemoteError) -> Self {
        Self {
            request_reply_id: request_reply_id.into(),
            response: None,
            error: Some(error),
        }
    }
}

/// Method invocation without a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneWayRequest {
    /// Provider method to invoke.
    pub method_name: String,
    /// Positional arguments.
    #[serde(default)]
    pub params: Vec<Value>,
    /// Type names of the positional arguments.
    #[serde(default)]
    pub param_datatypes: Vec<String>,
}

impl OneWayRequest {
    /// Construct a one-way request.
    pub fn new(method_name: impl Into<String>, params: Vec<Value>, param_datatypes: Vec<String>) -> Self {
        Self {
            method_name: method_name.into(),
            params,
            param_datatypes,
        }
    }
}

/// Request to subscribe to an attribute or broadcast.
///
/// Broadcast subscriptions carry `filter_parameters`; attribute subscriptions
/// leave them unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Subscription identifier chosen by the subscriber.
    pub subscription_id: String,
    /// Attribute or broadcast name.
    pub subscribed_to_name: String,
    /// Timing contract.
    #[serde(default)]
    pub qos: SubscriptionQos,
    /// Broadcast filter parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_parameters: Option<IndexMap<String, String>>,
}

impl SubscriptionRequest {
    /// Subscription request with a freshly generated subscription id.
    pub fn new(subscribed_to_name: impl Into<String>, qos: impl Into<SubscriptionQos>) -> Self {
        Self {
            subscription_id: Uuid::new_v4().to_string(),
            subscribed_to_name: subscribed_to_name.into(),
            qos: qos.into(),
            filter_parameters: None,
        }
    }

    /// Attach broadcast filter parameters.
    pub fn with_filter_parameters(mut self, filter_parameters: IndexMap<String, String>) -> Self {
        self.filter_parameters = Some(filter_parameters);
        self
    }
}

/// Answer to either subscription request kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionReply {
    /// Subscription being answered.
    pub subscription_id: String,
    /// Set when the subscription was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl SubscriptionReply {
    /// Accepting reply.
    pub fn ok(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            error: None,
        }
    }

    /// Rejecting reply.
    pub fn err(subscription_id: impl Into<String>, error: RemoteError) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            error: Some(error),
        }
    }
}

/// Request to end a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStop {
    /// Subscription to end.
    pub subscription_id: String,
}

impl SubscriptionStop {
    /// Construct a stop for the given subscription.
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
        }
    }
}

/// Value or error published to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPublication {
    /// Subscription the publication belongs to.
    pub subscription_id: String,
    /// Published values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<Value>>,
    /// Failure observed by the publisher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl SubscriptionPublication {
    /// Publication carrying values.
    pub fn value(subscription_id: impl Into<String>, response: Vec<Value>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            response: Some(response),
            error: None,
        }
    }

    /// Publication carrying an error.
    pub fn error(subscription_id: impl Into<String>, error: RemoteError) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            response: None,
            error: Some(error),
        }
    }
}
