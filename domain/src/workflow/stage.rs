//! Stages and stage sequences.
//!
//! A meeting procedure is an ordered list of stage tags. The sequence is an
//! explicit configuration value handed to the engine at meeting-open, so
//! alternate procedures (AGM, emergency, committee) are first-class
//! configurations rather than a hidden constant.

use crate::core::error::GovernanceError;
use serde::{Deserialize, Serialize};

/// A procedural stage tag (e.g. `roll_call`, `voting_session`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stage(String);

impl Stage {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for Stage {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered, validated meeting procedure.
///
/// # Example
///
/// ```
/// use plenum_domain::workflow::stage::StageSequence;
///
/// let seq = StageSequence::default_board();
/// assert_eq!(seq.stages().first().unwrap().as_str(), "pre_meeting");
/// assert!(seq.is_voting_stage(&"voting_session".into()));
/// assert!(!seq.is_voting_stage(&"roll_call".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSequence {
    stages: Vec<Stage>,
    /// Stages during which voting sessions may be opened.
    voting_stages: Vec<Stage>,
    /// Stage that gates progression on recorded quorum, if any.
    quorum_gate: Option<Stage>,
}

impl StageSequence {
    /// Build a validated sequence.
    ///
    /// Rejects empty sequences, voting stages or quorum gates that are not
    /// part of the sequence, and a quorum gate ordered after the first
    /// voting stage (quorum must be checkable before any vote).
    pub fn new(
        stages: Vec<Stage>,
        voting_stages: Vec<Stage>,
        quorum_gate: Option<Stage>,
    ) -> Result<Self, GovernanceError> {
        if stages.is_empty() {
            return Err(GovernanceError::Validation(
                "stage sequence must not be empty".to_string(),
            ));
        }
        for voting in &voting_stages {
            if !stages.contains(voting) {
                return Err(GovernanceError::Validation(format!(
                    "voting stage '{voting}' is not part of the sequence"
                )));
            }
        }
        if let Some(gate) = &quorum_gate {
            let gate_index = stages.iter().position(|s| s == gate).ok_or_else(|| {
                GovernanceError::Validation(format!(
                    "quorum gate '{gate}' is not part of the sequence"
                ))
            })?;
            let first_voting = voting_stages
                .iter()
                .filter_map(|v| stages.iter().position(|s| s == v))
                .min();
            if let Some(first_voting) = first_voting
                && gate_index >= first_voting
            {
                return Err(GovernanceError::Validation(format!(
                    "quorum gate '{gate}' must precede the first voting stage"
                )));
            }
        }
        Ok(Self {
            stages,
            voting_stages,
            quorum_gate,
        })
    }

    /// The standard board meeting procedure.
    pub fn default_board() -> Self {
        Self::from_tags(
            &[
                "pre_meeting",
                "opening",
                "roll_call",
                "quorum_check",
                "agenda_approval",
                "regular_business",
                "voting_session",
                "new_business",
                "closing",
                "post_meeting",
            ],
            &["voting_session"],
            Some("quorum_check"),
        )
    }

    /// Build from string tags without re-validation; restricted to the
    /// built-in presets, which are correct by construction.
    fn from_tags(stages: &[&str], voting: &[&str], gate: Option<&str>) -> Self {
        Self {
            stages: stages.iter().map(|s| Stage::new(*s)).collect(),
            voting_stages: voting.iter().map(|s| Stage::new(*s)).collect(),
            quorum_gate: gate.map(Stage::new),
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage at `index`, if in bounds.
    pub fn stage_at(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn is_voting_stage(&self, stage: &Stage) -> bool {
        self.voting_stages.contains(stage)
    }

    pub fn is_quorum_gate(&self, stage: &Stage) -> bool {
        self.quorum_gate.as_ref() == Some(stage)
    }

    /// Whether any voting stage at or after `index` remains.
    pub fn voting_stage_ahead(&self, index: usize) -> bool {
        self.stages[index.min(self.stages.len())..]
            .iter()
            .any(|s| self.is_voting_stage(s))
    }
}
