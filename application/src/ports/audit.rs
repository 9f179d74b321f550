//! Audit sink port.
//!
//! Every state transition, grant, vote, and outcome is emitted as a side
//! channel. Emission is fire-and-forget: a sink that fails must never
//! block or fail the engine's own operations.

use chrono::{DateTime, Utc};
use plenum_domain::{GrantId, InstanceId, ItemId, MeetingId, ResolutionId, SessionId, UserId};
use serde::Serialize;

/// One audited engine event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    MeetingOpened {
        meeting: MeetingId,
        instance: InstanceId,
        controller: UserId,
        at: DateTime<Utc>,
    },
    StageAdvanced {
        instance: InstanceId,
        from_stage: String,
        to_stage: String,
        triggered_by: UserId,
        at: DateTime<Utc>,
    },
    QuorumRecorded {
        instance: InstanceId,
        attendance: u32,
        required: u32,
        achieved: bool,
        at: DateTime<Utc>,
    },
    WorkflowFailed {
        instance: InstanceId,
        stage: String,
        reason: String,
        at: DateTime<Utc>,
    },
    WorkflowRecovered {
        instance: InstanceId,
        stage: String,
        at: DateTime<Utc>,
    },
    ProxyGranted {
        meeting: MeetingId,
        grant: GrantId,
        grantor: UserId,
        holder: UserId,
        superseded: Option<GrantId>,
        at: DateTime<Utc>,
    },
    ProxyRevoked {
        meeting: MeetingId,
        grant: GrantId,
        revoked_by: UserId,
        reason: String,
        at: DateTime<Utc>,
    },
    ProxiesExpired {
        meeting: MeetingId,
        grants: Vec<GrantId>,
        at: DateTime<Utc>,
    },
    SessionOpened {
        meeting: MeetingId,
        session: SessionId,
        item_count: u32,
        eligible_voters: u32,
        at: DateTime<Utc>,
    },
    /// `voter` is present only for public sessions; anonymous and secret
    /// sessions keep the mapping out of the audit stream too.
    BallotCast {
        session: SessionId,
        item: ItemId,
        voter: Option<UserId>,
        weight: f64,
        represented: u32,
        round: u32,
        at: DateTime<Utc>,
    },
    SessionClosed {
        session: SessionId,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        session: SessionId,
        at: DateTime<Utc>,
    },
    ItemDecided {
        session: SessionId,
        item: ItemId,
        resolution: ResolutionId,
        passed: bool,
        at: DateTime<Utc>,
    },
    ResolutionProposed {
        meeting: MeetingId,
        resolution: ResolutionId,
        proposer: UserId,
        at: DateTime<Utc>,
    },
    OutcomeRecorded {
        resolution: ResolutionId,
        status: String,
        round: u32,
        at: DateTime<Utc>,
    },
}

/// Fire-and-forget audit emission.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Sink that drops everything; for tests and audit-less deployments.
pub struct NoAudit;

impl AuditSink for NoAudit {
    fn emit(&self, _event: AuditEvent) {}
}
