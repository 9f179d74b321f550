//! The per-meeting workflow state machine.
//!
//! One `WorkflowInstance` drives one meeting through its stage sequence.
//! All methods are pure state transitions returning the violated invariant
//! on rejection; persistence and serialization of concurrent writers live
//! behind the versioned store contract.

use super::stage::{Stage, StageSequence};
use super::transition::StageTransition;
use crate::core::error::GovernanceError;
use crate::core::ids::{InstanceId, MeetingId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    NotStarted,
    InProgress,
    Waiting,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowStatus::NotStarted => "not_started",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::Waiting => "waiting",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
            WorkflowStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Cancelled)
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The procedural state machine for one meeting.
///
/// Invariant: `current_stage_index` is always within the sequence bounds
/// and never decreases except through [`WorkflowInstance::recover`], which
/// restores the exact index the failure happened at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: InstanceId,
    pub meeting: MeetingId,
    pub sequence: StageSequence,
    pub current_stage_index: usize,
    pub status: WorkflowStatus,
    pub quorum_required: u32,
    pub quorum_achieved: bool,
    pub attendance_count: u32,
    /// Voting session currently bound to this workflow, if open.
    pub active_voting_session: Option<SessionId>,
    /// Identity authorized to advance stages.
    pub controller: UserId,
    /// When enabled, any caller may advance provided conditions are met.
    pub auto_progression: bool,
    pub error_message: Option<String>,
    /// A failed workflow may be recovered exactly once.
    pub recovery_attempted: bool,
    /// Optimistic-concurrency version; bumped by the store on every write.
    pub version: u64,
}

impl WorkflowInstance {
    pub fn new(
        id: impl Into<InstanceId>,
        meeting: impl Into<MeetingId>,
        sequence: StageSequence,
        controller: impl Into<UserId>,
        quorum_required: u32,
    ) -> Self {
        Self {
            id: id.into(),
            meeting: meeting.into(),
            sequence,
            current_stage_index: 0,
            status: WorkflowStatus::NotStarted,
            quorum_required,
            quorum_achieved: false,
            attendance_count: 0,
            active_voting_session: None,
            controller: controller.into(),
            auto_progression: false,
            error_message: None,
            recovery_attempted: false,
            version: 0,
        }
    }

    pub fn with_auto_progression(mut self) -> Self {
        self.auto_progression = true;
        self
    }

    /// The stage the meeting is currently in.
    pub fn current_stage(&self) -> &Stage {
        // Index bounds are a construction invariant.
        &self.sequence.stages()[self.current_stage_index]
    }

    /// Whether the current stage permits opening a voting session.
    pub fn in_voting_stage(&self) -> bool {
        self.status == WorkflowStatus::InProgress
            && self.sequence.is_voting_stage(self.current_stage())
    }

    fn check_driver(&self, requested_by: &UserId, action: &str) -> Result<(), GovernanceError> {
        if !self.auto_progression && requested_by != &self.controller {
            return Err(GovernanceError::NotAuthorized {
                user: requested_by.clone(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn reject_terminal(&self, operation: &str) -> Result<(), GovernanceError> {
        if self.status.is_terminal() || self.status == WorkflowStatus::Failed {
            return Err(GovernanceError::InvalidStage {
                stage: format!("{} ({})", self.current_stage(), self.status),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Advance to the next stage.
    ///
    /// Rejections, in the order checked: terminal status, unauthorized
    /// caller, stage locked by an open voting session, quorum gate not
    /// satisfied, quorum missing on entry to a voting stage. Advancing from
    /// the final stage completes the workflow.
    pub fn advance(
        &mut self,
        requested_by: &UserId,
        at: DateTime<Utc>,
    ) -> Result<StageTransition, GovernanceError> {
        self.reject_terminal("advance")?;
        self.check_driver(requested_by, "advance this workflow")?;

        let from = self.current_stage().clone();

        if self.current_stage_index + 1 >= self.sequence.len() {
            // Leaving the final stage completes the meeting procedure.
            if let Some(session) = &self.active_voting_session {
                return Err(GovernanceError::StageLocked {
                    session: session.clone(),
                });
            }
            self.status = WorkflowStatus::Completed;
            return Ok(StageTransition::new(
                from.clone(),
                from,
                requested_by.clone(),
                true,
                at,
            ));
        }

        let to = self.sequence.stages()[self.current_stage_index + 1].clone();

        if let Some(session) = &self.active_voting_session
            && !self.sequence.is_voting_stage(&to)
        {
            return Err(GovernanceError::StageLocked {
                session: session.clone(),
            });
        }

        if self.sequence.is_quorum_gate(&from) && !self.quorum_achieved {
            return Err(GovernanceError::QuorumNotMet {
                required: self.quorum_required,
                achieved: self.attendance_count,
            });
        }

        if self.sequence.is_voting_stage(&to) && !self.quorum_achieved {
            return Err(GovernanceError::QuorumNotMet {
                required: self.quorum_required,
                achieved: self.attendance_count,
            });
        }

        self.current_stage_index += 1;
        self.status = WorkflowStatus::InProgress;

        Ok(StageTransition::new(
            from,
            to,
            requested_by.clone(),
            true,
            at,
        ))
    }

    /// Record attendance against the required quorum.
    ///
    /// Must be invoked before any voting stage is entered; may be invoked
    /// repeatedly as attendance changes.
    pub fn record_quorum(&mut self, attendance_count: u32) -> Result<(), GovernanceError> {
        self.reject_terminal("record_quorum")?;
        self.attendance_count = attendance_count;
        self.quorum_achieved = attendance_count >= self.quorum_required;
        Ok(())
    }

    /// Transition into the failed state from any non-terminal stage.
    pub fn fail(
        &mut self,
        requested_by: &UserId,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<StageTransition, GovernanceError> {
        self.reject_terminal("fail")?;
        let stage = self.current_stage().clone();
        self.status = WorkflowStatus::Failed;
        self.error_message = Some(reason.into());
        Ok(StageTransition::new(
            stage.clone(),
            stage,
            requested_by.clone(),
            false,
            at,
        ))
    }

    /// Recover a failed workflow, re-entering the stage it failed in.
    ///
    /// At most one recovery is tracked; a second failure is final.
    pub fn recover(
        &mut self,
        requested_by: &UserId,
        at: DateTime<Utc>,
    ) -> Result<StageTransition, GovernanceError> {
        self.check_driver(requested_by, "recover this workflow")?;
        if self.status != WorkflowStatus::Failed {
            return Err(GovernanceError::InvalidStage {
                stage: format!("{} ({})", self.current_stage(), self.status),
                operation: "recover".to_string(),
            });
        }
        if self.recovery_attempted {
            return Err(GovernanceError::InvalidStage {
                stage: format!("{} (failed)", self.current_stage()),
                operation: "recover (already attempted once)".to_string(),
            });
        }
        self.recovery_attempted = true;
        self.error_message = None;
        self.status = WorkflowStatus::InProgress;
        let stage = self.current_stage().clone();
        Ok(StageTransition::new(
            stage.clone(),
            stage,
            requested_by.clone(),
            true,
            at,
        ))
    }

    /// Cancel the workflow. Terminal.
    pub fn cancel(&mut self, requested_by: &UserId) -> Result<(), GovernanceError> {
        self.reject_terminal("cancel")?;
        self.check_driver(requested_by, "cancel this workflow")?;
        self.status = WorkflowStatus::Cancelled;
        Ok(())
    }

    /// Bind an opened voting session to this workflow.
    pub fn attach_session(&mut self, session: SessionId) -> Result<(), GovernanceError> {
        if !self.in_voting_stage() {
            return Err(GovernanceError::InvalidStage {
                stage: format!("{} ({})", self.current_stage(), self.status),
                operation: "open voting session".to_string(),
            });
        }
        if let Some(existing) = &self.active_voting_session {
            return Err(GovernanceError::StageLocked {
                session: existing.clone(),
            });
        }
        self.active_voting_session = Some(session);
        Ok(())
    }

    /// Release the bound voting session after close or cancellation.
    pub fn detach_session(&mut self, session: &SessionId) {
        if self.active_voting_session.as_ref() == Some(session) {
            self.active_voting_session = None;
        }
    }
}
