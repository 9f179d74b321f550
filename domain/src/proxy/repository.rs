//! Proxy store contract.

use super::graph::ProxyGraph;
use crate::core::ids::MeetingId;
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Versioned store for per-meeting delegation aggregates.
///
/// The whole grant set of a meeting is one aggregate, so a grant plus the
/// auto-revocation it triggers are one atomic write, and a concurrent
/// grant/revoke on the same grantor cannot leave two active grants.
#[async_trait]
pub trait ProxyStore: Send + Sync {
    /// Load the graph for a meeting, creating an empty one if absent.
    async fn load_or_default(&self, meeting: &MeetingId) -> Result<ProxyGraph, StoreError>;

    /// Compare-and-swap write of a mutated graph.
    async fn put(&self, graph: &ProxyGraph) -> Result<(), StoreError>;
}
