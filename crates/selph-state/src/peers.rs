//! PeerRegistry — known peers and the last shared-intelligence payload

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    connections: BTreeSet<String>,
    shared_intelligence: Option<Value>,
    integrated_at: Option<DateTime<Utc>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the peer was not known before.
    pub fn register_connection(&mut self, peer_id: impl Into<String>) -> bool {
        let peer_id = peer_id.into();
        let added = self.connections.insert(peer_id.clone());
        if added {
            debug!("Registered peer {}", peer_id);
        }
        added
    }

    /// Replace the shared-intelligence payload. Last write wins, nothing is merged.
    pub fn integrate(&mut self, payload: Value) {
        self.shared_intelligence = Some(payload);
        self.integrated_at = Some(Utc::now());
    }

    pub fn shared_intelligence(&self) -> Option<&Value> {
        self.shared_intelligence.as_ref()
    }

    pub fn integrated_at(&self) -> Option<DateTime<Utc>> {
        self.integrated_at
    }

    pub fn connections(&self) -> impl Iterator<Item = &str> {
        self.connections.iter().map(String::as_str)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
