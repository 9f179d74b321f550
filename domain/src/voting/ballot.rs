//! Ballots.

use crate::core::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A voter's choice on one session item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotChoice {
    For,
    Against,
    Abstain,
    /// Recorded non-participation; contributes to no tally.
    Absent,
}

impl BallotChoice {
    pub fn as_str(&self) -> &str {
        match self {
            BallotChoice::For => "for",
            BallotChoice::Against => "against",
            BallotChoice::Abstain => "abstain",
            BallotChoice::Absent => "absent",
        }
    }

    /// Whether this choice counts as participating in the vote.
    pub fn participates(&self) -> bool {
        !matches!(self, BallotChoice::Absent)
    }
}

impl std::fmt::Display for BallotChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ballot row.
///
/// A voter appears at most once per round per item. When the voter is the
/// effective holder of proxies, all delegated weight is aggregated into
/// this single row and the represented grantors are listed in
/// `cast_as_proxy_for`. Proxy votes are never separate rows, which is what
/// rules out double counting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: UserId,
    pub cast_as_proxy_for: Vec<UserId>,
    pub choice: BallotChoice,
    /// Aggregated weight: the voter's own (if eligible) plus every
    /// resolved proxy's delegated weight.
    pub weight: f64,
    pub round: u32,
    /// Position in the item's append order, assigned at insert.
    pub sequence: u32,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(
        voter: impl Into<UserId>,
        choice: BallotChoice,
        weight: f64,
        round: u32,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            voter: voter.into(),
            cast_as_proxy_for: Vec::new(),
            choice,
            weight,
            round,
            sequence: 0,
            cast_at,
        }
    }

    pub fn on_behalf_of(mut self, grantors: Vec<UserId>) -> Self {
        self.cast_as_proxy_for = grantors;
        self
    }

    /// Number of voters this row represents (the caster plus proxied
    /// grantors).
    pub fn represented_count(&self) -> u32 {
        1 + self.cast_as_proxy_for.len() as u32
    }
}
