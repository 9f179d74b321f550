//! Meeting aggregate.

use crate::core::ids::{InstanceId, MeetingId, OrgId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled formal meeting.
///
/// Identity is immutable once created; the workflow pointer mutates during
/// the live session; completed meetings are archived, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub organization: OrgId,
    /// The workflow instance driving this meeting, set at meeting-open.
    pub workflow_instance: Option<InstanceId>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Meeting {
    pub fn new(id: impl Into<MeetingId>, organization: impl Into<OrgId>, at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            organization: organization.into(),
            workflow_instance: None,
            archived: false,
            created_at: at,
        }
    }

    /// Attach the workflow instance created at meeting-open.
    pub fn with_workflow(mut self, instance: InstanceId) -> Self {
        self.workflow_instance = Some(instance);
        self
    }

    /// Archive the meeting after completion. Idempotent.
    pub fn archive(&mut self) {
        self.archived = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_meeting_archive_is_idempotent() {
        let at = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        let mut meeting = Meeting::new("board-2026-08", "acme", at);
        assert!(!meeting.archived);
        meeting.archive();
        meeting.archive();
        assert!(meeting.archived);
    }
}
