//! ---
//! conduit_section: "03-persistence-logging"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Participant logging contexts and lifecycle events."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Logging contexts attached to registered providers.
//!
//! A provider may be registered together with a [`LoggingContext`]; the
//! context is kept per participant id in a [`LoggingContextRegistry`] and
//! attached to lifecycle events emitted through [`log_system_event`].

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Structured logging context carried alongside a provider registration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingContext {
    /// Participant the context belongs to, filled in on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    /// Domain of the registered provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Interface name of the registered provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_name: Option<String>,
    /// Free-form application attributes, in insertion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
}

impl LoggingContext {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a participant identifier.
    pub fn with_participant(mut self, participant_id: impl Into<String>) -> Self {
        self.participant_id = Some(participant_id.into());
        self
    }

    /// Attach a domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Attach an interface name.
    pub fn with_interface(mut self, interface_name: impl Into<String>) -> Self {
        self.interface_name = Some(interface_name.into());
        self
    }

    /// Attach an application attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn attributes_field(&self) -> String {
        self.attributes
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Logging contexts keyed by participant id.
#[derive(Debug, Default, Clone)]
pub struct LoggingContextRegistry {
    contexts: Arc<RwLock<HashMap<String, LoggingContext>>>,
}

impl LoggingContextRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `context` for `participant_id`, replacing any previous one.
    pub fn set(&self, participant_id: &str, context: LoggingContext) {
        let context = context.with_participant(participant_id);
        self.contexts
            .write()
            .insert(participant_id.to_owned(), context);
    }

    /// Look up the context for `participant_id`.
    pub fn get(&self, participant_id: &str) -> Option<LoggingContext> {
        self.contexts.read().get(participant_id).cloned()
    }

    /// Drop the context for `participant_id`.
    pub fn remove(&self, participant_id: &str) -> Option<LoggingContext> {
        self.contexts.write().remove(participant_id)
    }

    /// Number of stored contexts.
    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    /// Whether no context is stored.
    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }
}

/// High-level outcome used when emitting lifecycle log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEventOutcome {
    /// The operation completed successfully.
    Success,
    /// The operation failed or was aborted.
    Fault,
}

impl SystemEventOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            SystemEventOutcome::Success => "success",
            SystemEventOutcome::Fault => "fault",
        }
    }
}

/// Emit a standardized lifecycle event with a success/fault outcome.
pub fn log_system_event(
    context: Option<&LoggingContext>,
    event: &str,
    message: &str,
    outcome: SystemEventOutcome,
) {
    let default_ctx = LoggingContext::default();
    let ctx = context.unwrap_or(&default_ctx);
    let participant = ctx.participant_id.as_deref().unwrap_or("");
    let domain = ctx.domain.as_deref().unwrap_or("");
    let interface = ctx.interface_name.as_deref().unwrap_or("");
    let attributes = ctx.attributes_field();
    // `tracing::event!` needs a constant level, hence the split.
    match outcome {
        SystemEventOutcome::Success => tracing::info!(
            event,
            outcome = outcome.as_str(),
            participant_id = participant,
            domain,
            interface,
            attributes = %attributes,
            message = %message
        ),
        SystemEventOutcome::Fault => tracing::error!(
            event,
            outcome = outcome.as_str(),
            participant_id = participant,
            domain,
            interface,
            attributes = %attributes,
            message = %message
        ),
    }
}
