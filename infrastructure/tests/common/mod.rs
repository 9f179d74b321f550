//! Shared engine fixture for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use plenum_application::{
    AdvanceStageUseCase, CancelVotingSessionUseCase, CastBallotUseCase, CloseVotingSessionUseCase,
    ExpireProxiesUseCase, GrantProxyUseCase, OpenMeetingInput, OpenMeetingUseCase,
    OpenSessionInput, OpenVotingSessionUseCase, ProposeResolutionInput, ProposeResolutionUseCase,
    RecordQuorumUseCase, RevokeProxyUseCase, SessionItemSpec, SessionResultsUseCase,
};
use plenum_domain::{
    GovernanceError, MeetingId, MeetingRole, Resolution, RoleCapabilities, SessionConfig,
    StageSequence, UserId, VotingSession, WorkflowStore,
};
use plenum_infrastructure::{
    FixedClock, MemoryAuditSink, MemoryMeetingStore, MemoryProxyStore, MemoryResolutionStore,
    MemorySessionStore, MemoryWorkflowStore, StaticDirectory,
};
use std::sync::Arc;

pub fn t(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, h, 0, 0).unwrap()
}

pub struct Engine {
    pub meetings: Arc<MemoryMeetingStore>,
    pub workflows: Arc<MemoryWorkflowStore>,
    pub proxies: Arc<MemoryProxyStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub resolutions: Arc<MemoryResolutionStore>,
    pub directory: Arc<StaticDirectory>,
    pub audit: Arc<MemoryAuditSink>,
    pub clock: Arc<FixedClock>,

    pub open_meeting: OpenMeetingUseCase,
    pub advance: AdvanceStageUseCase,
    pub record_quorum: RecordQuorumUseCase,
    pub grant_proxy: GrantProxyUseCase,
    pub revoke_proxy: RevokeProxyUseCase,
    pub expire_proxies: ExpireProxiesUseCase,
    pub propose: ProposeResolutionUseCase,
    pub open_session: OpenVotingSessionUseCase,
    pub cast: CastBallotUseCase,
    pub close: CloseVotingSessionUseCase,
    pub cancel: CancelVotingSessionUseCase,
    pub results: SessionResultsUseCase,
}

impl Engine {
    pub fn new() -> Self {
        let meetings = Arc::new(MemoryMeetingStore::new());
        let workflows = Arc::new(MemoryWorkflowStore::new());
        let proxies = Arc::new(MemoryProxyStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let resolutions = Arc::new(MemoryResolutionStore::new());
        let directory = Arc::new(StaticDirectory::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let clock = Arc::new(FixedClock::at(t(9)));

        Self {
            open_meeting: OpenMeetingUseCase::new(
                meetings.clone(),
                workflows.clone(),
                audit.clone(),
                clock.clone(),
            ),
            advance: AdvanceStageUseCase::new(
                workflows.clone(),
                meetings.clone(),
                audit.clone(),
                clock.clone(),
            ),
            record_quorum: RecordQuorumUseCase::new(
                workflows.clone(),
                audit.clone(),
                clock.clone(),
            ),
            grant_proxy: GrantProxyUseCase::new(
                proxies.clone(),
                directory.clone(),
                audit.clone(),
                clock.clone(),
            ),
            revoke_proxy: RevokeProxyUseCase::new(proxies.clone(), audit.clone(), clock.clone()),
            expire_proxies: ExpireProxiesUseCase::new(
                proxies.clone(),
                audit.clone(),
                clock.clone(),
            ),
            propose: ProposeResolutionUseCase::new(
                resolutions.clone(),
                directory.clone(),
                audit.clone(),
                clock.clone(),
            ),
            open_session: OpenVotingSessionUseCase::new(
                workflows.clone(),
                sessions.clone(),
                resolutions.clone(),
                directory.clone(),
                audit.clone(),
                clock.clone(),
            ),
            cast: CastBallotUseCase::new(
                sessions.clone(),
                proxies.clone(),
                directory.clone(),
                audit.clone(),
                clock.clone(),
            ),
            close: CloseVotingSessionUseCase::new(
                sessions.clone(),
                resolutions.clone(),
                workflows.clone(),
                audit.clone(),
                clock.clone(),
            ),
            cancel: CancelVotingSessionUseCase::new(
                sessions.clone(),
                workflows.clone(),
                audit.clone(),
                clock.clone(),
            ),
            results: SessionResultsUseCase::new(sessions.clone()),
            meetings,
            workflows,
            proxies,
            sessions,
            resolutions,
            directory,
            audit,
            clock,
        }
    }

    /// Register a voting member with weight 1.0.
    pub fn add_voter(&self, meeting: &str, user: &str) {
        self.directory.add_role(MeetingRole::new(
            meeting,
            user,
            "director",
            1.0,
            RoleCapabilities::voting_member(),
        ));
    }

    /// Register a non-voting observer.
    pub fn add_observer(&self, meeting: &str, user: &str) {
        self.directory.add_role(MeetingRole::new(
            meeting,
            user,
            "observer",
            0.0,
            RoleCapabilities::observer(),
        ));
    }

    /// Open a meeting on the standard board sequence and advance it into
    /// the voting stage with quorum recorded.
    pub async fn meeting_in_voting_stage(
        &self,
        meeting: &str,
        attendance: u32,
    ) -> plenum_domain::InstanceId {
        let instance = self
            .open_meeting
            .execute(OpenMeetingInput {
                meeting_id: MeetingId::new(meeting),
                organization: "acme".into(),
                controller: UserId::new("chair"),
                sequence: StageSequence::default_board(),
                quorum_required: 3,
                auto_progression: false,
            })
            .await
            .unwrap();

        let chair = UserId::new("chair");
        self.record_quorum
            .execute(&instance.id, attendance)
            .await
            .unwrap();
        loop {
            let current = self.workflows.load(&instance.id).await.unwrap();
            if current.current_stage().as_str() == "voting_session" {
                break;
            }
            self.advance.advance(&instance.id, &chair).await.unwrap();
        }
        instance.id
    }

    /// Propose a resolution by `proposer` and put it before a new session.
    pub async fn session_over_resolution(
        &self,
        meeting: &str,
        proposer: &str,
        config: SessionConfig,
    ) -> (Resolution, VotingSession) {
        let resolution = self
            .propose
            .execute(ProposeResolutionInput {
                meeting: MeetingId::new(meeting),
                title: "Approve budget".to_string(),
                text: "Resolved, that the 2027 budget be approved.".to_string(),
                proposer: UserId::new(proposer),
                seconder: None,
                classification: None,
            })
            .await
            .unwrap();

        let session = self
            .open_session
            .execute(OpenSessionInput {
                meeting: MeetingId::new(meeting),
                items: vec![SessionItemSpec {
                    resolution: resolution.id.clone(),
                    threshold_override: None,
                }],
                config,
            })
            .await
            .unwrap();

        (resolution, session)
    }
}

/// Convenience: unwrap an error and assert its kind name.
pub fn assert_kind(err: &GovernanceError, fragment: &str) {
    assert!(
        err.to_string().contains(fragment),
        "expected error containing '{fragment}', got: {err}"
    );
}
