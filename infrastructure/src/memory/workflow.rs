//! In-memory workflow store.
//!
//! Aggregates live in a `DashMap`; the entry guard makes the version
//! compare and the write one atomic unit, so concurrent advances from the
//! same stage index resolve to exactly one winner.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_domain::{
    InstanceId, MeetingId, StageTransition, StoreError, WorkflowInstance, WorkflowStore,
};

#[derive(Default)]
pub struct MemoryWorkflowStore {
    instances: DashMap<InstanceId, WorkflowInstance>,
    by_meeting: DashMap<MeetingId, InstanceId>,
    transitions: DashMap<InstanceId, Vec<StageTransition>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn insert(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        if self.instances.contains_key(&instance.id) {
            return Err(StoreError::AlreadyExists {
                entity: "workflow instance".to_string(),
                id: instance.id.to_string(),
            });
        }
        self.instances.insert(instance.id.clone(), instance.clone());
        self.by_meeting
            .insert(instance.meeting.clone(), instance.id.clone());
        self.transitions.insert(instance.id.clone(), Vec::new());
        Ok(())
    }

    async fn load(&self, id: &InstanceId) -> Result<WorkflowInstance, StoreError> {
        self.instances
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("workflow instance", id))
    }

    async fn load_for_meeting(
        &self,
        meeting: &MeetingId,
    ) -> Result<WorkflowInstance, StoreError> {
        let id = self
            .by_meeting
            .get(meeting)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("workflow instance for meeting", meeting))?;
        self.load(&id).await
    }

    async fn put(&self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        let mut entry = self
            .instances
            .get_mut(&instance.id)
            .ok_or_else(|| StoreError::not_found("workflow instance", &instance.id))?;
        if entry.version != instance.version {
            return Err(StoreError::conflict("workflow instance", &instance.id));
        }
        let mut next = instance.clone();
        next.version += 1;
        *entry = next;
        Ok(())
    }

    async fn append_transition(
        &self,
        id: &InstanceId,
        transition: &StageTransition,
    ) -> Result<(), StoreError> {
        self.transitions
            .entry(id.clone())
            .or_default()
            .push(transition.clone());
        Ok(())
    }

    async fn transitions(&self, id: &InstanceId) -> Result<Vec<StageTransition>, StoreError> {
        self.transitions
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("workflow instance", id))
    }
}
