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

use serde::{Deserialize, Serialize};

/// Reachable messaging address registered as a routing next hop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "_typeName")]
pub enum Address {
    /// Participant hosted inside this process.
    #[serde(rename = "joynr.system.RoutingTypes.InProcessAddress")]
    InProcess {
        /// Identifier of the hosting runtime.
        #[serde(rename = "runtimeId")]
        runtime_id: String,
    },
    /// Participant reachable through a WebSocket client connection.
    #[serde(rename = "joynr.system.RoutingTypes.WebSocketClientAddress")]
    WebSocketClient {
        /// Client connection identifier.
        id: String,
    },
    /// Participant reachable through an MQTT broker topic.
    #[serde(rename = "joynr.system.RoutingTypes.MqttAddress")]
    Mqtt {
        /// Broker URI.
        #[serde(rename = "brokerUri")]
        broker_uri: String,
        /// Topic the participant listens on.
        topic: String,
    },
}

impl Address {
    /// In-process address of the given runtime.
    pub fn in_process(runtime_id: impl Into<String>) -> Self {
        Address::InProcess {
            runtime_id: runtime_id.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::InProcess { runtime_id } => write!(f, "inprocess://{runtime_id}"),
            Address::WebSocketClient { id } => write!(f, "ws-client://{id}"),
            Address::Mqtt { broker_uri, topic } => write!(f, "{broker_uri}/{topic}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_carries_type_name() {
        let json = serde_json::to_value(Address::in_process("cc-1")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "_typeName": "joynr.system.RoutingTypes.InProcessAddress",
                "runtimeId": "cc-1"
            })
        );
        assert_eq!(Address::in_process("cc-1").to_string(), "inprocess://cc-1");
    }
}
