//! ---
//! conduit_section: "04-configuration-orchestration"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "In-process runtime wiring and reference collaborators."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use conduit_capabilities::{DiscoveryStore, MessageRouter, ParticipantIdStore, Provider};
use conduit_msg::{Address, DiscoveryEntry};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Routing table kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRoutingTable {
    hops: RwLock<HashMap<String, Address>>,
}

impl InMemoryRoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next hop registered for `participant_id`.
    pub fn resolve(&self, participant_id: &str) -> Option<Address> {
        self.hops.read().get(participant_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.hops.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.read().is_empty()
    }
}

#[async_trait]
impl MessageRouter for InMemoryRoutingTable {
    async fn add_next_hop(&self, participant_id: &str, address: Address) -> Result<()> {
        debug!(participant_id, address = %address, "next hop added");
        self.hops.write().insert(participant_id.to_owned(), address);
        Ok(())
    }

    async fn remove_next_hop(&self, participant_id: &str) -> Result<()> {
        if self.hops.write().remove(participant_id).is_none() {
            debug!(participant_id, "no next hop to remove");
        }
        Ok(())
    }
}

/// Discovery directory kept in process memory, in registration order.
#[derive(Debug, Default)]
pub struct InMemoryDiscoveryStore {
    entries: RwLock<IndexMap<String, DiscoveryEntry>>,
}

impl InMemoryDiscoveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry registered for `participant_id`.
    pub fn get(&self, participant_id: &str) -> Option<DiscoveryEntry> {
        self.entries.read().get(participant_id).cloned()
    }

    /// Entries providing `interface_name` in `domain`.
    pub fn lookup(&self, domain: &str, interface_name: &str) -> Vec<DiscoveryEntry> {
        self.entries
            .read()
            .values()
            .filter(|entry| entry.domain == domain && entry.interface_name == interface_name)
            .cloned()
            .collect()
    }

    /// Drop entries whose expiry date lies before `now_ms`; returns how many were dropped.
    pub fn purge_expired(&self, now_ms: i64) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expiry_date_ms >= now_ms);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl DiscoveryStore for InMemoryDiscoveryStore {
    async fn add(&self, entry: DiscoveryEntry) -> Result<()> {
        debug!(
            participant_id = %entry.participant_id,
            domain = %entry.domain,
            interface_name = %entry.interface_name,
            "discovery entry added"
        );
        self.entries
            .write()
            .insert(entry.participant_id.clone(), entry);
        Ok(())
    }

    async fn remove(&self, participant_id: &str) -> Result<()> {
        if self.entries.write().shift_remove(participant_id).is_none() {
            debug!(participant_id, "no discovery entry to remove");
        }
        Ok(())
    }
}

/// Participant ids created on first use and reused for the same
/// domain, interface and major version.
#[derive(Debug, Default)]
pub struct InMemoryParticipantIdStore {
    ids: RwLock<HashMap<String, String>>,
}

impl InMemoryParticipantIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(domain: &str, provider: &dyn Provider) -> String {
        format!(
            "{domain}.{}.v{}",
            provider.interface_name(),
            provider.version().major_version
        )
    }
}

impl ParticipantIdStore for InMemoryParticipantIdStore {
    fn participant_id(&self, domain: &str, provider: &dyn Provider) -> String {
        let key = Self::key(domain, provider);
        if let Some(id) = self.ids.read().get(&key) {
            return id.clone();
        }
        self.ids
            .write()
            .entry(key)
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_msg::{ProviderQos, Version};

    struct Radio(i32);

    impl Provider for Radio {
        fn interface_name(&self) -> &str {
            "vehicle/Radio"
        }

        fn version(&self) -> Version {
            Version::new(self.0, 0)
        }
    }

    fn entry(participant_id: &str, expiry_date_ms: i64) -> DiscoveryEntry {
        DiscoveryEntry {
            provider_version: Version::new(1, 0),
            domain: "car".into(),
            interface_name: "vehicle/Radio".into(),
            participant_id: participant_id.into(),
            qos: ProviderQos::default(),
            last_seen_date_ms: 0,
            expiry_date_ms,
            public_key_id: String::new(),
        }
    }

    #[test]
    fn participant_ids_are_reused_per_major_version() {
        let store = InMemoryParticipantIdStore::new();
        let first = store.participant_id("car", &Radio(1));
        assert_eq!(store.participant_id("car", &Radio(1)), first);
        assert_ne!(store.participant_id("car", &Radio(2)), first);
        assert_ne!(store.participant_id("boat", &Radio(1)), first);
    }

    #[tokio::test]
    async fn routing_table_tracks_hops() {
        let table = InMemoryRoutingTable::new();
        table
            .add_next_hop("p-1", Address::in_process("rt"))
            .await
            .expect("add");
        assert_eq!(table.resolve("p-1"), Some(Address::in_process("rt")));
        table.remove_next_hop("p-1").await.expect("remove");
        table.remove_next_hop("p-1").await.expect("remove twice");
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn discovery_lookup_and_purge() {
        let store = InMemoryDiscoveryStore::new();
        store.add(entry("p-1", 100)).await.expect("add");
        store.add(entry("p-2", 5_000)).await.expect("add");
        assert_eq!(store.lookup("car", "vehicle/Radio").len(), 2);
        assert!(store.lookup("boat", "vehicle/Radio").is_empty());

        assert_eq!(store.purge_expired(1_000), 1);
        assert!(store.get("p-1").is_none());
        store.remove("p-2").await.expect("remove");
        assert!(store.is_empty());
    }
}
