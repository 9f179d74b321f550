//! Propose resolutions and read back their outcomes.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use crate::ports::directory::MembershipDirectory;
use plenum_domain::{
    GovernanceError, MeetingId, Resolution, ResolutionId, ResolutionStore, UserId,
};
use std::sync::Arc;
use tracing::info;

/// Input for proposing a resolution.
#[derive(Debug, Clone)]
pub struct ProposeResolutionInput {
    pub meeting: MeetingId,
    pub title: String,
    pub text: String,
    pub proposer: UserId,
    pub seconder: Option<UserId>,
    pub classification: Option<String>,
}

pub struct ProposeResolutionUseCase {
    resolutions: Arc<dyn ResolutionStore>,
    directory: Arc<dyn MembershipDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ProposeResolutionUseCase {
    pub fn new(
        resolutions: Arc<dyn ResolutionStore>,
        directory: Arc<dyn MembershipDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolutions,
            directory,
            audit,
            clock,
        }
    }

    pub async fn execute(
        &self,
        input: ProposeResolutionInput,
    ) -> Result<Resolution, GovernanceError> {
        let roles = self
            .directory
            .roles_for(&input.meeting, &input.proposer)
            .await;
        if !roles.iter().any(|r| r.capabilities.can_propose) {
            return Err(GovernanceError::NotAuthorized {
                user: input.proposer,
                action: "propose a resolution".to_string(),
            });
        }

        let now = self.clock.now();
        let mut resolution = Resolution::propose(
            ResolutionId::generate(),
            input.meeting.clone(),
            input.title,
            input.text,
            input.proposer.clone(),
            now,
        );
        if let Some(seconder) = input.seconder {
            resolution = resolution.with_seconder(seconder);
        }
        if let Some(classification) = input.classification {
            resolution = resolution.with_classification(classification);
        }

        self.resolutions.insert(&resolution).await?;

        info!(
            meeting = %input.meeting,
            resolution = %resolution.id,
            "resolution proposed"
        );
        self.audit.emit(AuditEvent::ResolutionProposed {
            meeting: input.meeting,
            resolution: resolution.id.clone(),
            proposer: input.proposer,
            at: now,
        });

        Ok(resolution)
    }
}

/// Reads a resolution with its full outcome history.
pub struct GetResolutionOutcomeUseCase {
    resolutions: Arc<dyn ResolutionStore>,
}

impl GetResolutionOutcomeUseCase {
    pub fn new(resolutions: Arc<dyn ResolutionStore>) -> Self {
        Self { resolutions }
    }

    pub async fn execute(&self, id: &ResolutionId) -> Result<Resolution, GovernanceError> {
        Ok(self.resolutions.load(id).await?)
    }
}
