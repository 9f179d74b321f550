//! Voting sessions and session items.

use super::ballot::Ballot;
use super::tally::TallyOutcome;
use crate::core::error::GovernanceError;
use crate::core::ids::{InstanceId, ItemId, MeetingId, ResolutionId, SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How ballots are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingMethod {
    ShowOfHands,
    RollCall,
    SecretBallot,
    #[default]
    Electronic,
}

/// Who may see the ballot-to-voter mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymityLevel {
    /// Individual ballots are part of the public record.
    #[default]
    Public,
    /// Mapping withheld from ordinary read paths; administrators may see it.
    Anonymous,
    /// Mapping withheld from everyone, administrators included.
    Secret,
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Preparing,
    Open,
    Closed,
    Counting,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Preparing => "preparing",
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
            SessionStatus::Counting => "counting",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-session voting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub voting_method: VotingMethod,
    pub anonymity: AnonymityLevel,
    pub required_quorum: u32,
    pub pass_threshold_percent: f64,
    pub voting_deadline: Option<DateTime<Utc>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            voting_method: VotingMethod::default(),
            anonymity: AnonymityLevel::default(),
            required_quorum: 0,
            pass_threshold_percent: 50.0,
            voting_deadline: None,
        }
    }
}

/// One resolution's vote within a session: its own ballots, its own
/// optional threshold override, its own outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    pub id: ItemId,
    pub resolution: ResolutionId,
    pub threshold_override: Option<f64>,
    ballots: Vec<Ballot>,
    pub outcome: Option<TallyOutcome>,
}

impl SessionItem {
    pub fn new(id: ItemId, resolution: impl Into<ResolutionId>) -> Self {
        Self {
            id,
            resolution: resolution.into(),
            threshold_override: None,
            ballots: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_threshold(mut self, percent: f64) -> Self {
        self.threshold_override = Some(percent);
        self
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    /// Whether `(voter, round)` already cast here.
    pub fn has_ballot(&self, voter: &UserId, round: u32) -> bool {
        self.ballots
            .iter()
            .any(|b| &b.voter == voter && b.round == round)
    }

    /// Append a ballot, enforcing one row per `(voter, round)`.
    ///
    /// The uniqueness check and the insert are one unit; the store adapter
    /// calls this under the session aggregate's write lock, which is what
    /// makes two concurrent casts for the same voter race-safe.
    pub fn push_ballot(&mut self, mut ballot: Ballot) -> Result<(), GovernanceError> {
        if self.has_ballot(&ballot.voter, ballot.round) {
            return Err(GovernanceError::DuplicateVote {
                item: self.id.clone(),
                voter: ballot.voter.clone(),
                round: ballot.round,
            });
        }
        ballot.sequence = self.ballots.len() as u32 + 1;
        self.ballots.push(ballot);
        Ok(())
    }
}

/// One bounded voting event over one or more resolutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: SessionId,
    pub meeting: MeetingId,
    pub workflow_instance: InstanceId,
    pub status: SessionStatus,
    pub voting_method: VotingMethod,
    pub anonymity: AnonymityLevel,
    pub required_quorum: u32,
    /// Snapshot of eligible voters at open time; later membership changes
    /// do not retroactively change eligibility for this session.
    pub eligible_voter_count: u32,
    pub pass_threshold_percent: f64,
    pub voting_deadline: Option<DateTime<Utc>>,
    pub items: Vec<SessionItem>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version; bumped by the store on every write.
    pub version: u64,
}

impl VotingSession {
    /// Build a session in `preparing` over the given items.
    pub fn new(
        id: SessionId,
        meeting: impl Into<MeetingId>,
        workflow_instance: impl Into<InstanceId>,
        items: Vec<SessionItem>,
        eligible_voter_count: u32,
        config: SessionConfig,
    ) -> Result<Self, GovernanceError> {
        if items.is_empty() {
            return Err(GovernanceError::EmptyBallot);
        }
        Ok(Self {
            id,
            meeting: meeting.into(),
            workflow_instance: workflow_instance.into(),
            status: SessionStatus::Preparing,
            voting_method: config.voting_method,
            anonymity: config.anonymity,
            required_quorum: config.required_quorum,
            eligible_voter_count,
            pass_threshold_percent: config.pass_threshold_percent,
            voting_deadline: config.voting_deadline,
            items,
            opened_at: None,
            closed_at: None,
            version: 0,
        })
    }

    fn wrong_status(&self) -> GovernanceError {
        GovernanceError::SessionNotOpen {
            session: self.id.clone(),
            status: self.status.to_string(),
        }
    }

    /// Open the session for ballots.
    pub fn open(&mut self, at: DateTime<Utc>) -> Result<(), GovernanceError> {
        if self.status != SessionStatus::Preparing {
            return Err(self.wrong_status());
        }
        self.status = SessionStatus::Open;
        self.opened_at = Some(at);
        Ok(())
    }

    /// Whether ballots are accepted at `at`.
    ///
    /// Reaching the deadline does not auto-close; it only rejects further
    /// ballots. Closing remains an explicit action.
    pub fn check_accepts_ballots(&self, at: DateTime<Utc>) -> Result<(), GovernanceError> {
        if self.status != SessionStatus::Open {
            return Err(self.wrong_status());
        }
        if let Some(deadline) = self.voting_deadline
            && at >= deadline
        {
            return Err(GovernanceError::DeadlinePassed { deadline });
        }
        Ok(())
    }

    pub fn item(&self, id: &ItemId) -> Result<&SessionItem, GovernanceError> {
        self.items
            .iter()
            .find(|i| &i.id == id)
            .ok_or_else(|| GovernanceError::NotFound {
                entity: "session item".to_string(),
                id: id.to_string(),
            })
    }

    pub fn item_mut(&mut self, id: &ItemId) -> Result<&mut SessionItem, GovernanceError> {
        let session = self.id.clone();
        self.items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| GovernanceError::NotFound {
                entity: format!("session item in '{session}'"),
                id: id.to_string(),
            })
    }

    /// Begin counting. Ballot intake ends here.
    pub fn begin_counting(&mut self, at: DateTime<Utc>) -> Result<(), GovernanceError> {
        if self.status != SessionStatus::Open {
            return Err(self.wrong_status());
        }
        self.status = SessionStatus::Counting;
        self.closed_at = Some(at);
        Ok(())
    }

    /// Counting finished with consistent tallies.
    pub fn complete(&mut self) -> Result<(), GovernanceError> {
        if self.status != SessionStatus::Counting {
            return Err(self.wrong_status());
        }
        self.status = SessionStatus::Completed;
        Ok(())
    }

    /// Cancel before counting begins. Once counting has started the
    /// session must run to completion.
    pub fn cancel(&mut self) -> Result<(), GovernanceError> {
        match self.status {
            SessionStatus::Preparing | SessionStatus::Open => {
                self.status = SessionStatus::Cancelled;
                Ok(())
            }
            _ => Err(self.wrong_status()),
        }
    }

    /// Read view honoring the session's anonymity level.
    ///
    /// Aggregate tallies are always visible; individual ballot rows only
    /// where the level permits.
    pub fn view(&self, viewer_is_admin: bool) -> SessionView {
        let expose_ballots = match self.anonymity {
            AnonymityLevel::Public => true,
            AnonymityLevel::Anonymous => viewer_is_admin,
            AnonymityLevel::Secret => false,
        };
        SessionView {
            id: self.id.clone(),
            status: self.status,
            anonymity: self.anonymity,
            eligible_voter_count: self.eligible_voter_count,
            items: self
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id.clone(),
                    resolution: item.resolution.clone(),
                    ballot_count: item.ballots().len() as u32,
                    outcome: item.outcome.clone(),
                    ballots: expose_ballots.then(|| item.ballots().to_vec()),
                })
                .collect(),
        }
    }
}

/// Anonymity-filtered read model of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub status: SessionStatus,
    pub anonymity: AnonymityLevel,
    pub eligible_voter_count: u32,
    pub items: Vec<ItemView>,
}

/// Anonymity-filtered read model of one item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub resolution: ResolutionId,
    pub ballot_count: u32,
    pub outcome: Option<TallyOutcome>,
    /// Individual rows; `None` when the anonymity level withholds them.
    pub ballots: Option<Vec<Ballot>>,
}
