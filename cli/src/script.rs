//! Scripted meeting runner.
//!
//! Drives a whole meeting from a TOML script: roles, proxies, quorum,
//! resolutions, ballots, outcomes. Used for demos and as an operational
//! smoke check of the full engine stack.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use plenum_application::{
    AdvanceStageUseCase, CastBallotInput, CastBallotUseCase, CloseVotingSessionUseCase,
    GrantProxyInput, GrantProxyUseCase, OpenMeetingInput, OpenMeetingUseCase, OpenSessionInput,
    OpenVotingSessionUseCase, ProposeResolutionInput, ProposeResolutionUseCase,
    RecordQuorumUseCase,
};
use plenum_domain::{
    AnonymityLevel, BallotChoice, EffectiveWindow, MeetingId, MeetingRole, ProxyScope,
    ResolutionId, RoleCapabilities, SessionConfig, StageSequence, UserId, WorkflowStore,
};
use plenum_infrastructure::{
    FileConfig, JsonlAuditSink, MemoryMeetingStore, MemoryProxyStore, MemoryResolutionStore,
    MemorySessionStore, MemoryWorkflowStore, StaticDirectory, SystemClock,
};
use plenum_application::{AuditSink, NoAudit, SessionItemSpec};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// The TOML meeting script.
#[derive(Debug, Deserialize)]
pub struct MeetingScript {
    pub meeting: MeetingSection,
    #[serde(default)]
    pub roles: Vec<RoleSpec>,
    #[serde(default)]
    pub proxies: Vec<ProxySpec>,
    pub resolutions: Vec<ResolutionSpec>,
    #[serde(default)]
    pub votes: Vec<VoteSpec>,
    #[serde(default)]
    pub session: SessionSection,
}

#[derive(Debug, Deserialize)]
pub struct MeetingSection {
    pub id: String,
    pub organization: String,
    pub controller: String,
    pub quorum_required: u32,
    pub attendance: u32,
    /// Stage-sequence preset name; the configured default when absent.
    pub sequence: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleSpec {
    pub user: String,
    pub role: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub observer: bool,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct ProxySpec {
    pub grantor: String,
    pub holder: String,
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionSpec {
    pub title: String,
    pub text: String,
    pub proposer: String,
    pub seconder: Option<String>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct VoteSpec {
    pub voter: String,
    /// 1-based index into `resolutions`.
    pub resolution: usize,
    pub choice: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SessionSection {
    pub required_quorum: Option<u32>,
    pub pass_threshold_percent: Option<f64>,
    pub anonymity: Option<String>,
}

impl MeetingScript {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
    }
}

fn parse_choice(raw: &str) -> Result<BallotChoice> {
    Ok(match raw {
        "for" => BallotChoice::For,
        "against" => BallotChoice::Against,
        "abstain" => BallotChoice::Abstain,
        "absent" => BallotChoice::Absent,
        other => bail!("unknown ballot choice '{other}' (for|against|abstain|absent)"),
    })
}

fn parse_anonymity(raw: &str) -> Result<AnonymityLevel> {
    Ok(match raw {
        "public" => AnonymityLevel::Public,
        "anonymous" => AnonymityLevel::Anonymous,
        "secret" => AnonymityLevel::Secret,
        other => bail!("unknown anonymity level '{other}' (public|anonymous|secret)"),
    })
}

/// Run the scripted meeting end-to-end and print per-item outcomes.
pub async fn run(script: MeetingScript, config: &FileConfig) -> Result<()> {
    let meetings = Arc::new(MemoryMeetingStore::new());
    let workflows = Arc::new(MemoryWorkflowStore::new());
    let proxies = Arc::new(MemoryProxyStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let resolutions = Arc::new(MemoryResolutionStore::new());
    let directory = Arc::new(StaticDirectory::new());
    let clock = Arc::new(SystemClock);
    let audit: Arc<dyn AuditSink> = match &config.audit.log_path {
        Some(path) => match JsonlAuditSink::new(path) {
            Some(sink) => Arc::new(sink),
            None => Arc::new(NoAudit),
        },
        None => Arc::new(NoAudit),
    };

    let meeting_id = MeetingId::new(script.meeting.id.clone());
    let controller = UserId::new(script.meeting.controller.clone());

    // Roles.
    for role in &script.roles {
        let capabilities = if role.observer {
            RoleCapabilities::observer()
        } else if role.user == script.meeting.controller {
            RoleCapabilities::presiding()
        } else {
            RoleCapabilities::voting_member()
        };
        directory.add_role(MeetingRole::new(
            meeting_id.clone(),
            role.user.as_str(),
            role.role.as_str(),
            role.weight,
            capabilities,
        ));
    }

    let sequence: StageSequence = match &script.meeting.sequence {
        Some(name) => config.workflow.sequence(name)?,
        None => config.workflow.default_sequence()?,
    };

    // Open the meeting and bring it into the voting stage.
    let open_meeting = OpenMeetingUseCase::new(
        meetings.clone(),
        workflows.clone(),
        audit.clone(),
        clock.clone(),
    );
    let instance = open_meeting
        .execute(OpenMeetingInput {
            meeting_id: meeting_id.clone(),
            organization: script.meeting.organization.as_str().into(),
            controller: controller.clone(),
            sequence,
            quorum_required: script.meeting.quorum_required,
            auto_progression: false,
        })
        .await?;
    println!("meeting {} opened ({} stages)", meeting_id, instance.sequence.len());

    let record_quorum = RecordQuorumUseCase::new(workflows.clone(), audit.clone(), clock.clone());
    let achieved = record_quorum
        .execute(&instance.id, script.meeting.attendance)
        .await?;
    println!(
        "quorum: {}/{} attending ({})",
        script.meeting.attendance,
        script.meeting.quorum_required,
        if achieved { "met" } else { "NOT met" }
    );

    let advance = AdvanceStageUseCase::new(
        workflows.clone(),
        meetings.clone(),
        audit.clone(),
        clock.clone(),
    );
    loop {
        let current = workflows.load(&instance.id).await?;
        if current.in_voting_stage() {
            break;
        }
        let transition = advance.advance(&instance.id, &controller).await?;
        println!("  stage: {} -> {}", transition.from_stage, transition.to_stage);
    }

    // Proxies.
    let grant_proxy = GrantProxyUseCase::new(
        proxies.clone(),
        directory.clone(),
        audit.clone(),
        clock.clone(),
    );
    for proxy in &script.proxies {
        let grant = grant_proxy
            .execute(GrantProxyInput {
                meeting: meeting_id.clone(),
                grantor: UserId::new(proxy.grantor.as_str()),
                holder: UserId::new(proxy.holder.as_str()),
                window: EffectiveWindow::from(Utc::now()),
                voting_weight: proxy.weight,
                scope: ProxyScope::Meeting,
                max_votes_allowed: None,
                can_sub_delegate: false,
                parent_grant: None,
            })
            .await?;
        println!("proxy: {} -> {} ({})", proxy.grantor, proxy.holder, grant);
    }

    // Resolutions.
    let propose = ProposeResolutionUseCase::new(
        resolutions.clone(),
        directory.clone(),
        audit.clone(),
        clock.clone(),
    );
    let mut proposed: Vec<ResolutionId> = Vec::with_capacity(script.resolutions.len());
    for spec in &script.resolutions {
        let resolution = propose
            .execute(ProposeResolutionInput {
                meeting: meeting_id.clone(),
                title: spec.title.clone(),
                text: spec.text.clone(),
                proposer: UserId::new(spec.proposer.as_str()),
                seconder: spec.seconder.as_deref().map(UserId::new),
                classification: None,
            })
            .await?;
        println!("resolution {}: {}", proposed.len() + 1, resolution.title);
        proposed.push(resolution.id);
    }

    // Session.
    let open_session = OpenVotingSessionUseCase::new(
        workflows.clone(),
        sessions.clone(),
        resolutions.clone(),
        directory.clone(),
        audit.clone(),
        clock.clone(),
    );
    let session_config = SessionConfig {
        required_quorum: script
            .session
            .required_quorum
            .unwrap_or(config.governance.required_quorum),
        pass_threshold_percent: script
            .session
            .pass_threshold_percent
            .unwrap_or(config.governance.pass_threshold_percent),
        anonymity: match &script.session.anonymity {
            Some(raw) => parse_anonymity(raw)?,
            None => AnonymityLevel::Public,
        },
        ..SessionConfig::default()
    };
    let session = open_session
        .execute(OpenSessionInput {
            meeting: meeting_id.clone(),
            items: script
                .resolutions
                .iter()
                .zip(&proposed)
                .map(|(spec, id)| SessionItemSpec {
                    resolution: id.clone(),
                    threshold_override: spec.threshold,
                })
                .collect(),
            config: session_config,
        })
        .await?;
    println!(
        "session {} open: {} item(s), {} eligible voters",
        session.id,
        session.items.len(),
        session.eligible_voter_count
    );

    // Ballots.
    let cast = CastBallotUseCase::new(
        sessions.clone(),
        proxies.clone(),
        directory.clone(),
        audit.clone(),
        clock.clone(),
    );
    for vote in &script.votes {
        let item = session
            .items
            .get(vote.resolution.saturating_sub(1))
            .with_context(|| format!("vote references unknown resolution {}", vote.resolution))?;
        let ballot = cast
            .execute(CastBallotInput {
                session: session.id.clone(),
                item: item.id.clone(),
                voter: UserId::new(vote.voter.as_str()),
                choice: parse_choice(&vote.choice)?,
                round: 1,
            })
            .await?;
        println!(
            "  ballot: {} {} (weight {:.1})",
            vote.voter, vote.choice, ballot.weight
        );
    }

    // Close and report.
    let close = CloseVotingSessionUseCase::new(
        sessions.clone(),
        resolutions.clone(),
        workflows.clone(),
        audit.clone(),
        clock.clone(),
    );
    let closed = close.execute(&session.id).await?;
    println!();
    for (index, item) in closed.iter().enumerate() {
        let outcome = &item.outcome;
        println!(
            "item {}: for {:.1} / against {:.1} / abstain {:.1} | {:.1}% vs {:.1}% | quorum {} | {}",
            index + 1,
            outcome.votes_for,
            outcome.votes_against,
            outcome.votes_abstain,
            outcome.pass_percentage,
            outcome.effective_threshold,
            if outcome.quorum_achieved { "met" } else { "missed" },
            if outcome.passed { "PASSED" } else { "REJECTED" }
        );
    }

    Ok(())
}
