//! The governance error taxonomy.
//!
//! Every rejection an operation can produce names its kind and the
//! invariant that was violated. Callers never see a bare internal error.

use super::ids::{ItemId, SessionId, UserId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Caller-visible errors for all governance operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GovernanceError {
    /// Operation is not legal in the workflow's current stage.
    #[error("operation '{operation}' is not legal in stage '{stage}'")]
    InvalidStage { stage: String, operation: String },

    /// A voting session is open and the requested stage change would leave it behind.
    #[error("stage is locked while voting session '{session}' is open")]
    StageLocked { session: SessionId },

    /// Advance past the quorum gate was attempted without quorum.
    #[error("quorum not met: {achieved} attending, {required} required")]
    QuorumNotMet { required: u32, achieved: u32 },

    /// A proxy grant must name two distinct identities.
    #[error("self-proxy rejected: '{user}' cannot delegate to themselves")]
    SelfProxy { user: UserId },

    /// Resulting delegation chain would exceed the depth limit.
    #[error("delegation chain depth {depth} exceeds the limit of {limit}")]
    ChainTooDeep { depth: u8, limit: u8 },

    /// Chain traversal exceeded its hop budget; the grant set contains a cycle.
    #[error("delegation cycle detected while resolving grantor '{grantor}'")]
    CycleDetected { grantor: UserId },

    /// A ballot already exists for this (item, voter, round).
    #[error("duplicate vote: '{voter}' already cast a ballot on item '{item}' in round {round}")]
    DuplicateVote {
        item: ItemId,
        voter: UserId,
        round: u32,
    },

    /// The voter has no voting capability and holds no resolved proxy.
    #[error("'{voter}' is ineligible: no voting capability and no proxy held")]
    Ineligible { voter: UserId },

    /// The voting session does not accept this operation in its current status.
    #[error("voting session '{session}' is not open (status: {status})")]
    SessionNotOpen { session: SessionId, status: String },

    /// The session's voting deadline has passed; only closing remains.
    #[error("voting deadline {deadline} has passed")]
    DeadlinePassed { deadline: DateTime<Utc> },

    /// A session may not be opened over an empty set of resolutions.
    #[error("empty ballot: a voting session needs at least one resolution")]
    EmptyBallot,

    /// Close-time consistency check failed; the session stays in `counting`.
    #[error(
        "tally error on item '{item}': {participating} participants exceed \
         the eligibility snapshot of {eligible}"
    )]
    TallyError {
        item: ItemId,
        participating: u32,
        eligible: u32,
    },

    /// A resolution outcome may be written exactly once per voting round.
    #[error("outcome for resolution already recorded in round {round}")]
    OutcomeAlreadyRecorded { round: u32 },

    /// The caller is not authorized to drive this workflow.
    #[error("'{user}' is not authorized to {action}")]
    NotAuthorized { user: UserId, action: String },

    /// Optimistic-concurrency conflict: the aggregate changed underneath the caller.
    #[error("stale state: {entity} was modified concurrently, reload and retry")]
    StaleState { entity: String },

    /// The addressed aggregate does not exist.
    #[error("{entity} not found: '{id}'")]
    NotFound { entity: String, id: String },

    /// Structural validation failure (bad sequence, bad window, bad config).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl GovernanceError {
    /// Permanent rejections are invariant violations that retrying can never fix.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GovernanceError::SelfProxy { .. }
                | GovernanceError::ChainTooDeep { .. }
                | GovernanceError::CycleDetected { .. }
                | GovernanceError::DuplicateVote { .. }
                | GovernanceError::OutcomeAlreadyRecorded { .. }
        )
    }

    /// Retryable errors may succeed after the caller reloads state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GovernanceError::StaleState { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_invariant() {
        let err = GovernanceError::QuorumNotMet {
            required: 5,
            achieved: 3,
        };
        assert_eq!(err.to_string(), "quorum not met: 3 attending, 5 required");

        let err = GovernanceError::ChainTooDeep { depth: 6, limit: 5 };
        assert!(err.to_string().contains("exceeds the limit of 5"));
    }

    #[test]
    fn test_permanence_classification() {
        assert!(
            GovernanceError::SelfProxy {
                user: UserId::new("a")
            }
            .is_permanent()
        );
        assert!(
            GovernanceError::StaleState {
                entity: "workflow".into()
            }
            .is_retryable()
        );
        assert!(
            !GovernanceError::QuorumNotMet {
                required: 5,
                achieved: 3
            }
            .is_permanent()
        );
    }
}
