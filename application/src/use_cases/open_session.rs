//! Open a voting session bound to the meeting's workflow.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use crate::ports::directory::MembershipDirectory;
use plenum_domain::{
    GovernanceError, ItemId, MeetingId, ResolutionId, ResolutionStore, SessionConfig, SessionId,
    SessionItem, SessionStore, VotingSession, WorkflowStore,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One resolution to put before the session.
#[derive(Debug, Clone)]
pub struct SessionItemSpec {
    pub resolution: ResolutionId,
    /// Per-item pass threshold override, in percent.
    pub threshold_override: Option<f64>,
}

/// Input for opening a voting session.
#[derive(Debug, Clone)]
pub struct OpenSessionInput {
    pub meeting: MeetingId,
    pub items: Vec<SessionItemSpec>,
    pub config: SessionConfig,
}

/// Opens a session: voting-stage gate, eligibility snapshot, workflow
/// binding.
pub struct OpenVotingSessionUseCase {
    workflows: Arc<dyn WorkflowStore>,
    sessions: Arc<dyn SessionStore>,
    resolutions: Arc<dyn ResolutionStore>,
    directory: Arc<dyn MembershipDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl OpenVotingSessionUseCase {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        sessions: Arc<dyn SessionStore>,
        resolutions: Arc<dyn ResolutionStore>,
        directory: Arc<dyn MembershipDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workflows,
            sessions,
            resolutions,
            directory,
            audit,
            clock,
        }
    }

    pub async fn execute(&self, input: OpenSessionInput) -> Result<VotingSession, GovernanceError> {
        let now = self.clock.now();

        if input.items.is_empty() {
            return Err(GovernanceError::EmptyBallot);
        }

        // Every resolution must exist before it is put to a vote.
        for spec in &input.items {
            self.resolutions.load(&spec.resolution).await?;
        }

        // Eligibility snapshot: distinct voting-capable members at open
        // time. Later membership changes do not affect this session.
        let roster = self.directory.voting_roster(&input.meeting).await;
        let eligible: HashSet<_> = roster
            .iter()
            .filter(|r| r.capabilities.can_vote)
            .map(|r| r.user.clone())
            .collect();
        let eligible_voter_count = eligible.len() as u32;

        let items: Vec<SessionItem> = input
            .items
            .iter()
            .map(|spec| {
                let item = SessionItem::new(ItemId::generate(), spec.resolution.clone());
                match spec.threshold_override {
                    Some(t) => item.with_threshold(t),
                    None => item,
                }
            })
            .collect();

        // Bind to the workflow first; the attach gate rejects a second
        // session while one is open, and the CAS write resolves races
        // between concurrent opens.
        let mut instance = self.workflows.load_for_meeting(&input.meeting).await?;
        if !instance.in_voting_stage() {
            return Err(GovernanceError::InvalidStage {
                stage: format!("{} ({})", instance.current_stage(), instance.status),
                operation: "open voting session".to_string(),
            });
        }

        let session_id = SessionId::generate();
        let mut session = VotingSession::new(
            session_id.clone(),
            input.meeting.clone(),
            instance.id.clone(),
            items,
            eligible_voter_count,
            input.config,
        )?;
        session.open(now)?;

        instance.attach_session(session_id.clone())?;
        self.workflows.put(&instance).await?;

        if let Err(err) = self.sessions.insert(&session).await {
            // Undo the binding so the workflow is not stuck pointing at a
            // session that was never persisted.
            warn!(session = %session_id, %err, "session insert failed, unbinding workflow");
            if let Ok(mut fresh) = self.workflows.load(&instance.id).await {
                fresh.detach_session(&session_id);
                let _ = self.workflows.put(&fresh).await;
            }
            return Err(err.into());
        }

        info!(
            meeting = %input.meeting,
            session = %session_id,
            items = session.items.len(),
            eligible = eligible_voter_count,
            "voting session opened"
        );
        self.audit.emit(AuditEvent::SessionOpened {
            meeting: input.meeting,
            session: session_id,
            item_count: session.items.len() as u32,
            eligible_voters: eligible_voter_count,
            at: now,
        });

        Ok(session)
    }
}
