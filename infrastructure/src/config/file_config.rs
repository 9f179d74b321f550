//! File configuration model.

use plenum_domain::{GovernanceError, StageSequence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Root configuration loaded from `plenum.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub governance: GovernanceSection,
    pub workflow: WorkflowSection,
    pub audit: AuditSection,
}

/// Defaults applied to voting sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceSection {
    /// Default pass threshold, percent of for + against.
    pub pass_threshold_percent: f64,
    /// Default participation quorum for sessions.
    pub required_quorum: u32,
}

impl Default for GovernanceSection {
    fn default() -> Self {
        Self {
            pass_threshold_percent: 50.0,
            required_quorum: 0,
        }
    }
}

/// Stage-sequence presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    /// Preset used when a meeting names none.
    pub default_sequence: String,
    pub presets: BTreeMap<String, SequenceSpec>,
}

/// A configured meeting procedure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SequenceSpec {
    pub stages: Vec<String>,
    pub voting_stages: Vec<String>,
    pub quorum_gate: Option<String>,
}

impl SequenceSpec {
    fn of(stages: &[&str], voting: &[&str], gate: Option<&str>) -> Self {
        Self {
            stages: stages.iter().map(|s| s.to_string()).collect(),
            voting_stages: voting.iter().map(|s| s.to_string()).collect(),
            quorum_gate: gate.map(|s| s.to_string()),
        }
    }

    /// Validate into a domain stage sequence.
    pub fn to_sequence(&self) -> Result<StageSequence, GovernanceError> {
        StageSequence::new(
            self.stages.iter().map(|s| s.as_str().into()).collect(),
            self.voting_stages.iter().map(|s| s.as_str().into()).collect(),
            self.quorum_gate.as_deref().map(|s| s.into()),
        )
    }
}

impl Default for WorkflowSection {
    fn default() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(
            "board".to_string(),
            SequenceSpec::of(
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
            ),
        );
        presets.insert(
            "agm".to_string(),
            SequenceSpec::of(
                &[
                    "pre_meeting",
                    "opening",
                    "roll_call",
                    "quorum_check",
                    "minutes_approval",
                    "annual_reports",
                    "voting_session",
                    "elections",
                    "new_business",
                    "closing",
                    "post_meeting",
                ],
                &["voting_session", "elections"],
                Some("quorum_check"),
            ),
        );
        presets.insert(
            "emergency".to_string(),
            SequenceSpec::of(
                &["opening", "quorum_check", "voting_session", "closing"],
                &["voting_session"],
                Some("quorum_check"),
            ),
        );
        presets.insert(
            "committee".to_string(),
            SequenceSpec::of(
                &[
                    "opening",
                    "roll_call",
                    "quorum_check",
                    "regular_business",
                    "voting_session",
                    "closing",
                ],
                &["voting_session"],
                Some("quorum_check"),
            ),
        );
        Self {
            default_sequence: "board".to_string(),
            presets,
        }
    }
}

impl WorkflowSection {
    /// Resolve a named preset into a validated sequence.
    pub fn sequence(&self, name: &str) -> Result<StageSequence, GovernanceError> {
        let spec = self.presets.get(name).ok_or_else(|| {
            GovernanceError::Validation(format!("unknown stage-sequence preset '{name}'"))
        })?;
        spec.to_sequence()
    }

    /// The preset used when none is named.
    pub fn default_sequence(&self) -> Result<StageSequence, GovernanceError> {
        self.sequence(&self.default_sequence)
    }
}

/// Audit log configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditSection {
    /// JSONL audit log path; absent disables file audit.
    pub log_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_presets_validate() {
        let section = WorkflowSection::default();
        for name in ["board", "agm", "emergency", "committee"] {
            let sequence = section.sequence(name).unwrap();
            assert!(!sequence.is_empty(), "preset {name} is empty");
        }
    }

    #[test]
    fn test_default_sequence_is_board() {
        let section = WorkflowSection::default();
        let sequence = section.default_sequence().unwrap();
        assert_eq!(sequence.len(), 10);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let section = WorkflowSection::default();
        let err = section.sequence("synod").unwrap_err();
        assert!(err.to_string().contains("synod"));
    }

    #[test]
    fn test_agm_has_two_voting_stages() {
        let section = WorkflowSection::default();
        let sequence = section.sequence("agm").unwrap();
        assert!(sequence.is_voting_stage(&"voting_session".into()));
        assert!(sequence.is_voting_stage(&"elections".into()));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = FileConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(
            parsed.governance.pass_threshold_percent,
            config.governance.pass_threshold_percent
        );
    }
}
