//! Resolutions (motions) and their outcome records.

use crate::core::error::GovernanceError;
use crate::core::ids::{ItemId, MeetingId, ResolutionId, UserId};
use crate::voting::tally::TallyOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Proposed,
    Passed,
    Rejected,
    Tabled,
    Withdrawn,
    /// Superseded by an amending resolution.
    Amended,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResolutionStatus::Proposed => "proposed",
            ResolutionStatus::Passed => "passed",
            ResolutionStatus::Rejected => "rejected",
            ResolutionStatus::Tabled => "tabled",
            ResolutionStatus::Withdrawn => "withdrawn",
            ResolutionStatus::Amended => "amended",
        }
    }
}

impl std::fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decided outcome of one voting round, written exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub session_item: ItemId,
    pub round: u32,
    pub tally: TallyOutcome,
    pub decided_at: DateTime<Utc>,
}

/// A formal motion before the meeting.
///
/// Status is set exactly once per voting round by session closure. History
/// is immutable: re-voting a tabled resolution happens through a fresh
/// session item, and amendment happens through a new resolution that
/// references this one via `supersedes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub id: ResolutionId,
    pub meeting: MeetingId,
    pub title: String,
    pub text: String,
    pub classification: Option<String>,
    pub status: ResolutionStatus,
    pub proposer: UserId,
    pub seconder: Option<UserId>,
    pub supersedes: Option<ResolutionId>,
    /// One record per decided voting round, in decision order.
    pub outcomes: Vec<OutcomeRecord>,
    pub proposed_at: DateTime<Utc>,
}

impl Resolution {
    pub fn propose(
        id: ResolutionId,
        meeting: impl Into<MeetingId>,
        title: impl Into<String>,
        text: impl Into<String>,
        proposer: impl Into<UserId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            meeting: meeting.into(),
            title: title.into(),
            text: text.into(),
            classification: None,
            status: ResolutionStatus::Proposed,
            proposer: proposer.into(),
            seconder: None,
            supersedes: None,
            outcomes: Vec::new(),
            proposed_at: at,
        }
    }

    pub fn with_seconder(mut self, seconder: impl Into<UserId>) -> Self {
        self.seconder = Some(seconder.into());
        self
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// A new resolution superseding this one; the original is marked
    /// amended, its history untouched.
    pub fn supersede_with(
        &mut self,
        id: ResolutionId,
        title: impl Into<String>,
        text: impl Into<String>,
        proposer: impl Into<UserId>,
        at: DateTime<Utc>,
    ) -> Resolution {
        self.status = ResolutionStatus::Amended;
        let mut next = Resolution::propose(id, self.meeting.clone(), title, text, proposer, at);
        next.supersedes = Some(self.id.clone());
        next
    }

    /// Record the outcome of one voting round. Rejected when this round
    /// already has a record.
    pub fn record_outcome(
        &mut self,
        session_item: ItemId,
        round: u32,
        tally: TallyOutcome,
        status: ResolutionStatus,
        at: DateTime<Utc>,
    ) -> Result<(), GovernanceError> {
        if self.outcomes.iter().any(|o| o.round == round) {
            return Err(GovernanceError::OutcomeAlreadyRecorded { round });
        }
        self.outcomes.push(OutcomeRecord {
            session_item,
            round,
            tally,
            decided_at: at,
        });
        self.status = status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()
    }

    fn tally(passed: bool) -> TallyOutcome {
        TallyOutcome {
            votes_for: if passed { 3.0 } else { 1.0 },
            votes_against: if passed { 1.0 } else { 3.0 },
            votes_abstain: 0.0,
            voters_participated: 4,
            quorum_achieved: true,
            pass_percentage: if passed { 75.0 } else { 25.0 },
            effective_threshold: 50.0,
            passed,
        }
    }

    fn resolution() -> Resolution {
        Resolution::propose(
            ResolutionId::new("r-1"),
            "m-1",
            "Approve budget",
            "Resolved, that the 2027 budget be approved.",
            "alice",
            at(),
        )
    }

    #[test]
    fn test_outcome_recorded_exactly_once_per_round() {
        let mut r = resolution();
        r.record_outcome(
            ItemId::new("i-1"),
            1,
            tally(true),
            ResolutionStatus::Passed,
            at(),
        )
        .unwrap();
        assert_eq!(r.status, ResolutionStatus::Passed);

        let err = r
            .record_outcome(
                ItemId::new("i-1"),
                1,
                tally(false),
                ResolutionStatus::Rejected,
                at(),
            )
            .unwrap_err();
        assert_eq!(err, GovernanceError::OutcomeAlreadyRecorded { round: 1 });
        // History is intact.
        assert_eq!(r.outcomes.len(), 1);
        assert_eq!(r.status, ResolutionStatus::Passed);
    }

    #[test]
    fn test_tabled_resolution_revotes_in_new_round() {
        let mut r = resolution();
        r.record_outcome(
            ItemId::new("i-1"),
            1,
            tally(false),
            ResolutionStatus::Tabled,
            at(),
        )
        .unwrap();

        // The re-vote references the same resolution through a fresh item.
        r.record_outcome(
            ItemId::new("i-2"),
            2,
            tally(true),
            ResolutionStatus::Passed,
            at(),
        )
        .unwrap();
        assert_eq!(r.outcomes.len(), 2);
        assert_eq!(r.status, ResolutionStatus::Passed);
    }

    #[test]
    fn test_supersession_creates_referencing_resolution() {
        let mut original = resolution();
        let amended = original.supersede_with(
            ResolutionId::new("r-2"),
            "Approve budget (amended)",
            "Resolved, that the amended 2027 budget be approved.",
            "bob",
            at(),
        );
        assert_eq!(original.status, ResolutionStatus::Amended);
        assert_eq!(amended.supersedes, Some(ResolutionId::new("r-1")));
        assert_eq!(amended.status, ResolutionStatus::Proposed);
    }
}
