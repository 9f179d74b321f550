//! Close, cancel, and read back voting sessions.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use plenum_domain::{
    tally_item, GovernanceError, ResolutionStatus, ResolutionStore, SessionId, SessionStatus,
    SessionStore, SessionView, TallyOutcome, WorkflowStore,
};
use std::sync::Arc;
use tracing::{error, info};

/// Per-item result of a completed close.
#[derive(Debug, Clone)]
pub struct ClosedItem {
    pub item: plenum_domain::ItemId,
    pub resolution: plenum_domain::ResolutionId,
    pub outcome: TallyOutcome,
}

pub struct CloseVotingSessionUseCase {
    sessions: Arc<dyn SessionStore>,
    resolutions: Arc<dyn ResolutionStore>,
    workflows: Arc<dyn WorkflowStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl CloseVotingSessionUseCase {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        resolutions: Arc<dyn ResolutionStore>,
        workflows: Arc<dyn WorkflowStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            resolutions,
            workflows,
            audit,
            clock,
        }
    }

    /// Close the session: `open -> counting -> completed`.
    ///
    /// Safely re-entrant: closing a completed session returns its recorded
    /// outcomes without further effect, and a session left in `counting`
    /// by an earlier tally failure can be closed again once the data is
    /// repaired. A tally inconsistency aborts the close and leaves the
    /// session in `counting` for manual investigation.
    pub async fn execute(&self, session_id: &SessionId) -> Result<Vec<ClosedItem>, GovernanceError> {
        let now = self.clock.now();
        let mut session = self.sessions.load(session_id).await?;

        if session.status == SessionStatus::Completed {
            return Ok(session
                .items
                .iter()
                .filter_map(|item| {
                    item.outcome.clone().map(|outcome| ClosedItem {
                        item: item.id.clone(),
                        resolution: item.resolution.clone(),
                        outcome,
                    })
                })
                .collect());
        }

        if session.status == SessionStatus::Open {
            session.begin_counting(now)?;
            self.sessions.put(&session).await?;
            // The put bumped the stored version; work from a fresh copy.
            session = self.sessions.load(session_id).await?;
        } else if session.status != SessionStatus::Counting {
            return Err(GovernanceError::SessionNotOpen {
                session: session_id.clone(),
                status: session.status.to_string(),
            });
        }

        // Tally every item before committing anything; one inconsistent
        // item fails the whole close.
        let mut closed = Vec::with_capacity(session.items.len());
        for item in &session.items {
            match tally_item(
                item,
                session.required_quorum,
                session.eligible_voter_count,
                session.pass_threshold_percent,
            ) {
                Ok(outcome) => closed.push(ClosedItem {
                    item: item.id.clone(),
                    resolution: item.resolution.clone(),
                    outcome,
                }),
                Err(err) => {
                    error!(
                        session = %session_id,
                        item = %item.id,
                        %err,
                        "tally failed; session stays in counting"
                    );
                    return Err(err);
                }
            }
        }

        for (item, result) in session.items.iter_mut().zip(&closed) {
            item.outcome = Some(result.outcome.clone());
        }
        session.complete()?;
        self.sessions.put(&session).await?;

        // Write outcomes back into the resolution catalog.
        for result in &closed {
            let round = session
                .items
                .iter()
                .find(|i| i.id == result.item)
                .and_then(|i| i.ballots().iter().map(|b| b.round).max())
                .unwrap_or(1);
            let status = if result.outcome.passed {
                ResolutionStatus::Passed
            } else {
                ResolutionStatus::Rejected
            };

            let mut resolution = self.resolutions.load(&result.resolution).await?;
            resolution.record_outcome(
                result.item.clone(),
                round,
                result.outcome.clone(),
                status,
                now,
            )?;
            self.resolutions.put(&resolution).await?;

            self.audit.emit(AuditEvent::ItemDecided {
                session: session_id.clone(),
                item: result.item.clone(),
                resolution: result.resolution.clone(),
                passed: result.outcome.passed,
                at: now,
            });
            self.audit.emit(AuditEvent::OutcomeRecorded {
                resolution: result.resolution.clone(),
                status: status.to_string(),
                round,
                at: now,
            });
        }

        // Release the workflow's session binding.
        let mut instance = self.workflows.load(&session.workflow_instance).await?;
        instance.detach_session(session_id);
        self.workflows.put(&instance).await?;

        info!(session = %session_id, items = closed.len(), "voting session closed");
        self.audit.emit(AuditEvent::SessionClosed {
            session: session_id.clone(),
            at: now,
        });

        Ok(closed)
    }
}

/// Cancels a session before counting begins.
pub struct CancelVotingSessionUseCase {
    sessions: Arc<dyn SessionStore>,
    workflows: Arc<dyn WorkflowStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl CancelVotingSessionUseCase {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        workflows: Arc<dyn WorkflowStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            workflows,
            audit,
            clock,
        }
    }

    pub async fn execute(&self, session_id: &SessionId) -> Result<(), GovernanceError> {
        let mut session = self.sessions.load(session_id).await?;
        session.cancel()?;
        self.sessions.put(&session).await?;

        let mut instance = self.workflows.load(&session.workflow_instance).await?;
        instance.detach_session(session_id);
        self.workflows.put(&instance).await?;

        info!(session = %session_id, "voting session cancelled");
        self.audit.emit(AuditEvent::SessionCancelled {
            session: session_id.clone(),
            at: self.clock.now(),
        });

        Ok(())
    }
}

/// Anonymity-honoring session read model.
pub struct SessionResultsUseCase {
    sessions: Arc<dyn SessionStore>,
}

impl SessionResultsUseCase {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Aggregate tallies are always returned; individual ballot rows only
    /// where the session's anonymity level permits the viewer.
    pub async fn execute(
        &self,
        session_id: &SessionId,
        viewer_is_admin: bool,
    ) -> Result<SessionView, GovernanceError> {
        let session = self.sessions.load(session_id).await?;
        Ok(session.view(viewer_is_admin))
    }
}
