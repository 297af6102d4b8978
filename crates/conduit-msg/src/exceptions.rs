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
use serde_json::Value as JsonValue;

use crate::discovery::Version;

/// Error taxonomy carried inside replies and publications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "_typeName")]
pub enum RemoteError {
    /// The provider failed while executing the call.
    #[serde(rename = "joynr.exceptions.ProviderRuntimeException")]
    #[error("provider runtime error: {detail_message}")]
    ProviderRuntime {
        /// Human readable description.
        #[serde(rename = "detailMessage")]
        detail_message: String,
    },
    /// The call could not be mapped onto a provider method.
    #[serde(rename = "joynr.exceptions.MethodInvocationException")]
    #[error("method invocation failed: {detail_message}")]
    MethodInvocation {
        /// Human readable description.
        #[serde(rename = "detailMessage")]
        detail_message: String,
        /// Version of the provider that rejected the call.
        #[serde(
            rename = "providerVersion",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        provider_version: Option<Version>,
    },
    /// The provider reported a modelled application error.
    #[serde(rename = "joynr.exceptions.ApplicationException")]
    #[error("application error: {error}")]
    Application {
        /// Modelled error enumeration value.
        error: JsonValue,
    },
    /// The arbitrator or discovery directory failed.
    #[serde(rename = "joynr.exceptions.DiscoveryException")]
    #[error("discovery error: {detail_message}")]
    Discovery {
        /// Human readable description.
        #[serde(rename = "detailMessage")]
        detail_message: String,
    },
    /// A periodic publication was not delivered in time.
    #[serde(rename = "joynr.exceptions.PublicationMissedException")]
    #[error("publication missed for subscription {subscription_id}")]
    PublicationMissed {
        /// Affected subscription.
        #[serde(rename = "subscriptionId")]
        subscription_id: String,
    },
    /// A subscription request was rejected or referred to an unknown subscription.
    #[serde(rename = "joynr.exceptions.SubscriptionException")]
    #[error("subscription {subscription_id} failed: {detail_message}")]
    Subscription {
        /// Affected subscription.
        #[serde(rename = "subscriptionId")]
        subscription_id: String,
        /// Human readable description.
        #[serde(rename = "detailMessage")]
        detail_message: String,
    },
}

impl RemoteError {
    /// Provider runtime error with the given message.
    pub fn provider_runtime(detail_message: impl Into<String>) -> Self {
        RemoteError::ProviderRuntime {
            detail_message: detail_message.into(),
        }
    }

    /// Method invocation error with the given message.
    pub fn method_invocation(detail_message: impl Into<String>) -> Self {
        RemoteError::MethodInvocation {
            detail_message: detail_message.into(),
            provider_version: None,
        }
    }

    /// Subscription error for the given subscription.
    pub fn subscription(
        subscription_id: impl Into<String>,
        detail_message: impl Into<String>,
    ) -> Self {
        RemoteError::Subscription {
            subscription_id: subscription_id.into(),
            detail_message: detail_message.into(),
        }
    }
}
