//! In-memory proxy graph store.
//!
//! One aggregate per meeting: a grant and the auto-revocation it triggers
//! commit together, and concurrent writers on the same meeting resolve
//! through the version check.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_domain::{MeetingId, ProxyGraph, ProxyStore, StoreError};

#[derive(Default)]
pub struct MemoryProxyStore {
    graphs: DashMap<MeetingId, ProxyGraph>,
}

impl MemoryProxyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProxyStore for MemoryProxyStore {
    async fn load_or_default(&self, meeting: &MeetingId) -> Result<ProxyGraph, StoreError> {
        Ok(self
            .graphs
            .entry(meeting.clone())
            .or_insert_with(|| ProxyGraph::new(meeting.clone()))
            .clone())
    }

    async fn put(&self, graph: &ProxyGraph) -> Result<(), StoreError> {
        let mut entry = self
            .graphs
            .get_mut(&graph.meeting)
            .ok_or_else(|| StoreError::not_found("proxy graph", &graph.meeting))?;
        if entry.version != graph.version {
            return Err(StoreError::conflict("proxy graph", &graph.meeting));
        }
        let mut next = graph.clone();
        next.version += 1;
        *entry = next;
        Ok(())
    }
}
