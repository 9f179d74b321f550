//! Immutable stage-transition audit records.

use super::stage::Stage;
use crate::core::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of one workflow transition.
///
/// `fail` and `recover` produce records with `from_stage == to_stage`;
/// `conditions_met` is false exactly when the transition recorded a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from_stage: Stage,
    pub to_stage: Stage,
    pub triggered_by: UserId,
    pub conditions_met: bool,
    pub timestamp: DateTime<Utc>,
}

impl StageTransition {
    pub fn new(
        from_stage: Stage,
        to_stage: Stage,
        triggered_by: UserId,
        conditions_met: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            from_stage,
            to_stage,
            triggered_by,
            conditions_met,
            timestamp,
        }
    }
}
