//! ---
//! conduit_section: "02-messaging-ipc-data-model"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Envelope model, message bodies and subscription QoS."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Interface version declared by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Major version; incompatible changes.
    pub major_version: i32,
    /// Minor version; compatible additions.
    pub minor_version: i32,
}

impl Version {
    /// Construct a version.
    pub const fn new(major_version: i32, minor_version: i32) -> Self {
        Self {
            major_version,
            minor_version,
        }
    }
}

/// Visibility of a registered provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderScope {
    /// Registered with the global discovery directory.
    #[default]
    Global,
    /// Only visible inside the local runtime.
    Local,
}

/// Application defined key/value attached to a provider's QoS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: String,
}

/// Quality of service advertised by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQos {
    /// Application defined parameters.
    #[serde(default)]
    pub custom_parameters: Vec<CustomParameter>,
    /// Arbitration priority; higher wins.
    pub priority: i64,
    /// Visibility scope.
    #[serde(default)]
    pub scope: ProviderScope,
    /// Whether the provider publishes on-change subscriptions.
    #[serde(default)]
    pub supports_on_change_subscriptions: bool,
}

impl Default for ProviderQos {
    fn default() -> Self {
        Self {
            custom_parameters: Vec::new(),
            priority: 1,
            scope: ProviderScope::Global,
            supports_on_change_subscriptions: false,
        }
    }
}

/// Published record allowing other participants to locate a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryEntry {
    /// Interface version implemented by the provider.
    pub provider_version: Version,
    /// Domain the provider is registered in.
    pub domain: String,
    /// Fully qualified interface name.
    pub interface_name: String,
    /// Participant id of the provider.
    pub participant_id: String,
    /// Advertised provider QoS.
    pub qos: ProviderQos,
    /// Last time the entry was refreshed, epoch milliseconds.
    pub last_seen_date_ms: i64,
    /// Absolute expiry, epoch milliseconds.
    pub expiry_date_ms: i64,
    /// Identifier of the provider's public key; empty until key management exists.
    pub public_key_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_qos_defaults_to_global_priority_one() {
        let qos = ProviderQos::default();
        assert_eq!(qos.priority, 1);
        assert_eq!(qos.scope, ProviderScope::Global);
        assert!(!qos.supports_on_change_subscriptions);
    }

    #[test]
    fn discovery_entry_uses_camel_case() {
        let entry = DiscoveryEntry {
            provider_version: Version::new(2, 1),
            domain: "vehicle".into(),
            interface_name: "vehicle/Radio".into(),
            participant_id: "p-1".into(),
            qos: ProviderQos::default(),
            last_seen_date_ms: 10,
            expiry_date_ms: 20,
            public_key_id: String::new(),
        };
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["providerVersion"]["majorVersion"], 2);
        assert_eq!(json["interfaceName"], "vehicle/Radio");
        assert_eq!(json["qos"]["scope"], "GLOBAL");
        assert_eq!(json["expiryDateMs"], 20);
    }
}
