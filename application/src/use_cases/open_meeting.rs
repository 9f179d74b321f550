//! Open a meeting: create the meeting record and its workflow instance.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use plenum_domain::{
    GovernanceError, InstanceId, Meeting, MeetingId, MeetingStore, OrgId, StageSequence, UserId,
    WorkflowInstance, WorkflowStore,
};
use std::sync::Arc;
use tracing::info;

/// Input for opening a meeting.
#[derive(Debug, Clone)]
pub struct OpenMeetingInput {
    pub meeting_id: MeetingId,
    pub organization: OrgId,
    /// Identity authorized to drive the workflow.
    pub controller: UserId,
    /// The meeting procedure; an explicit configuration value, never a
    /// hidden default.
    pub sequence: StageSequence,
    pub quorum_required: u32,
    pub auto_progression: bool,
}

/// Creates the meeting aggregate and its workflow instance.
pub struct OpenMeetingUseCase {
    meetings: Arc<dyn MeetingStore>,
    workflows: Arc<dyn WorkflowStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl OpenMeetingUseCase {
    pub fn new(
        meetings: Arc<dyn MeetingStore>,
        workflows: Arc<dyn WorkflowStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            meetings,
            workflows,
            audit,
            clock,
        }
    }

    pub async fn execute(
        &self,
        input: OpenMeetingInput,
    ) -> Result<WorkflowInstance, GovernanceError> {
        let now = self.clock.now();

        let instance_id = InstanceId::generate();
        let mut instance = WorkflowInstance::new(
            instance_id.clone(),
            input.meeting_id.clone(),
            input.sequence,
            input.controller.clone(),
            input.quorum_required,
        );
        if input.auto_progression {
            instance = instance.with_auto_progression();
        }

        let meeting = Meeting::new(input.meeting_id.clone(), input.organization, now)
            .with_workflow(instance_id.clone());

        self.meetings.insert(&meeting).await?;
        self.workflows.insert(&instance).await?;

        info!(
            meeting = %input.meeting_id,
            instance = %instance_id,
            stages = instance.sequence.len(),
            "meeting opened"
        );
        self.audit.emit(AuditEvent::MeetingOpened {
            meeting: input.meeting_id,
            instance: instance_id,
            controller: input.controller,
            at: now,
        });

        Ok(instance)
    }
}
