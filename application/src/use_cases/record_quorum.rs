//! Record attendance against the required quorum.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use plenum_domain::{GovernanceError, InstanceId, WorkflowStore};
use std::sync::Arc;
use tracing::info;

pub struct RecordQuorumUseCase {
    workflows: Arc<dyn WorkflowStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl RecordQuorumUseCase {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workflows,
            audit,
            clock,
        }
    }

    /// Set `quorum_achieved` from the attendance count. May be called
    /// again as attendance changes, until a terminal stage.
    pub async fn execute(
        &self,
        instance_id: &InstanceId,
        attendance_count: u32,
    ) -> Result<bool, GovernanceError> {
        let mut instance = self.workflows.load(instance_id).await?;
        instance.record_quorum(attendance_count)?;
        let achieved = instance.quorum_achieved;
        let required = instance.quorum_required;
        self.workflows.put(&instance).await?;

        info!(
            instance = %instance_id,
            attendance = attendance_count,
            required,
            achieved,
            "quorum recorded"
        );
        self.audit.emit(AuditEvent::QuorumRecorded {
            instance: instance_id.clone(),
            attendance: attendance_count,
            required,
            achieved,
            at: self.clock.now(),
        });

        Ok(achieved)
    }
}
