//! Workflow store contract.

use super::instance::WorkflowInstance;
use super::transition::StageTransition;
use crate::core::ids::{InstanceId, MeetingId};
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Versioned store for workflow instances plus their append-only
/// transition log.
///
/// `put` must compare the aggregate's `version` against the stored one and
/// fail with [`StoreError::VersionConflict`] on mismatch; this is what
/// serializes concurrent stage advances (exactly one writer wins per
/// version).
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert a new instance; fails if the id already exists.
    async fn insert(&self, instance: &WorkflowInstance) -> Result<(), StoreError>;

    /// Load an instance by id, including its current version.
    async fn load(&self, id: &InstanceId) -> Result<WorkflowInstance, StoreError>;

    /// Load the instance driving a meeting.
    async fn load_for_meeting(&self, meeting: &MeetingId)
        -> Result<WorkflowInstance, StoreError>;

    /// Compare-and-swap write of a mutated instance.
    async fn put(&self, instance: &WorkflowInstance) -> Result<(), StoreError>;

    /// Append one immutable transition record.
    async fn append_transition(
        &self,
        id: &InstanceId,
        transition: &StageTransition,
    ) -> Result<(), StoreError>;

    /// Full transition history for an instance, in append order.
    async fn transitions(&self, id: &InstanceId) -> Result<Vec<StageTransition>, StoreError>;
}
