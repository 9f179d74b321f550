//! Drive a workflow instance: advance, fail, recover.
//!
//! Each mutation is a load, a validated domain transition, and one
//! compare-and-swap write. Two concurrent advances from the same stage
//! index race on the version: exactly one wins, the other surfaces
//! `StaleState` for the caller to reload and retry.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use plenum_domain::{
    GovernanceError, InstanceId, MeetingStore, StageTransition, UserId, WorkflowStatus,
    WorkflowStore,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives validated workflow transitions.
pub struct AdvanceStageUseCase {
    workflows: Arc<dyn WorkflowStore>,
    meetings: Arc<dyn MeetingStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl AdvanceStageUseCase {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        meetings: Arc<dyn MeetingStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workflows,
            meetings,
            audit,
            clock,
        }
    }

    /// Advance the instance to its next stage.
    pub async fn advance(
        &self,
        instance_id: &InstanceId,
        requested_by: &UserId,
    ) -> Result<StageTransition, GovernanceError> {
        let now = self.clock.now();
        let mut instance = self.workflows.load(instance_id).await?;
        let transition = instance.advance(requested_by, now)?;
        self.workflows.put(&instance).await?;
        self.workflows
            .append_transition(instance_id, &transition)
            .await?;

        // A completed procedure archives its meeting; records are kept,
        // never hard-deleted.
        if instance.status == WorkflowStatus::Completed {
            match self.meetings.load(&instance.meeting).await {
                Ok(mut meeting) => {
                    meeting.archive();
                    self.meetings.put(&meeting).await?;
                    debug!(meeting = %instance.meeting, "meeting archived");
                }
                Err(err) => warn!(meeting = %instance.meeting, %err, "archive skipped"),
            }
        }

        info!(
            instance = %instance_id,
            from = %transition.from_stage,
            to = %transition.to_stage,
            "stage advanced"
        );
        self.audit.emit(AuditEvent::StageAdvanced {
            instance: instance_id.clone(),
            from_stage: transition.from_stage.to_string(),
            to_stage: transition.to_stage.to_string(),
            triggered_by: requested_by.clone(),
            at: now,
        });

        Ok(transition)
    }

    /// Transition the instance into the failed state.
    pub async fn fail(
        &self,
        instance_id: &InstanceId,
        requested_by: &UserId,
        reason: &str,
    ) -> Result<StageTransition, GovernanceError> {
        let now = self.clock.now();
        let mut instance = self.workflows.load(instance_id).await?;
        let transition = instance.fail(requested_by, reason, now)?;
        self.workflows.put(&instance).await?;
        self.workflows
            .append_transition(instance_id, &transition)
            .await?;

        warn!(instance = %instance_id, reason, "workflow failed");
        self.audit.emit(AuditEvent::WorkflowFailed {
            instance: instance_id.clone(),
            stage: transition.from_stage.to_string(),
            reason: reason.to_string(),
            at: now,
        });

        Ok(transition)
    }

    /// Recover a failed instance, re-entering the stage it failed in.
    pub async fn recover(
        &self,
        instance_id: &InstanceId,
        requested_by: &UserId,
    ) -> Result<StageTransition, GovernanceError> {
        let now = self.clock.now();
        let mut instance = self.workflows.load(instance_id).await?;
        let transition = instance.recover(requested_by, now)?;
        self.workflows.put(&instance).await?;
        self.workflows
            .append_transition(instance_id, &transition)
            .await?;

        info!(instance = %instance_id, stage = %transition.to_stage, "workflow recovered");
        self.audit.emit(AuditEvent::WorkflowRecovered {
            instance: instance_id.clone(),
            stage: transition.to_stage.to_string(),
            at: now,
        });

        Ok(transition)
    }
}
