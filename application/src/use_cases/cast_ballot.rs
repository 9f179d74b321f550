//! Cast a ballot, aggregating every weight the voter controls.
//!
//! The voter may vote on their own behalf, as the effective holder of one
//! or more proxy chains, or both. All of it lands in a single ballot row;
//! a voter who has delegated their own authority away contributes no own
//! weight.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use crate::ports::directory::MembershipDirectory;
use plenum_domain::{
    resolve_voting_weight, AnonymityLevel, Ballot, BallotChoice, GovernanceError, ItemId,
    ProxyStore, SessionId, SessionStore, UserId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Attempts to reconcile proxy vote-use accounting after a CAS conflict.
const VOTE_USE_RETRIES: usize = 3;

/// Input for casting a ballot.
#[derive(Debug, Clone)]
pub struct CastBallotInput {
    pub session: SessionId,
    pub item: ItemId,
    pub voter: UserId,
    pub choice: BallotChoice,
    pub round: u32,
}

pub struct CastBallotUseCase {
    sessions: Arc<dyn SessionStore>,
    proxies: Arc<dyn ProxyStore>,
    directory: Arc<dyn MembershipDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl CastBallotUseCase {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        proxies: Arc<dyn ProxyStore>,
        directory: Arc<dyn MembershipDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            proxies,
            directory,
            audit,
            clock,
        }
    }

    pub async fn execute(&self, input: CastBallotInput) -> Result<Ballot, GovernanceError> {
        let now = self.clock.now();

        let session = self.sessions.load(&input.session).await?;
        // Pre-check; the store re-validates atomically at append time.
        session.check_accepts_ballots(now)?;
        session.item(&input.item)?;

        let roles = self
            .directory
            .roles_for(&session.meeting, &input.voter)
            .await;
        let (own_weight, own_eligible) = resolve_voting_weight(&roles);

        let graph = self.proxies.load_or_default(&session.meeting).await?;

        // Own weight counts only while it is not delegated away.
        let delegated_away = graph.active_grant_of(&input.voter, now).is_some();
        let resolved = graph.grantors_resolving_to(&input.voter, now)?;

        let casts_own = own_eligible && !delegated_away;
        if !casts_own && resolved.is_empty() {
            return Err(GovernanceError::Ineligible { voter: input.voter });
        }
        let own_contribution = if casts_own { own_weight } else { 0.0 };

        let proxy_weight: f64 = resolved.iter().map(|p| p.weight).sum();
        let grantors: Vec<UserId> = resolved.iter().map(|p| p.grantor.clone()).collect();

        let ballot = Ballot::new(
            input.voter.clone(),
            input.choice,
            own_contribution + proxy_weight,
            input.round,
            now,
        )
        .on_behalf_of(grantors);

        debug!(
            session = %input.session,
            item = %input.item,
            weight = ballot.weight,
            represented = ballot.represented_count(),
            "appending ballot"
        );
        self.sessions
            .append_ballot(&input.session, &input.item, ballot.clone())
            .await??;

        // Account the vote on every link of each resolved chain. The
        // ballot itself is already durable; a concurrent graph write only
        // forces a reload of the accounting, never a second ballot.
        if !resolved.is_empty() {
            let mut attempt = 0;
            loop {
                let mut graph = self.proxies.load_or_default(&session.meeting).await?;
                for proxy in &resolved {
                    graph.record_vote_use(proxy);
                }
                match self.proxies.put(&graph).await {
                    Ok(()) => break,
                    Err(err) if attempt < VOTE_USE_RETRIES => {
                        attempt += 1;
                        debug!(%err, attempt, "retrying proxy vote-use accounting");
                    }
                    Err(err) => {
                        warn!(%err, "proxy vote-use accounting not persisted");
                        break;
                    }
                }
            }
        }

        info!(
            session = %input.session,
            item = %input.item,
            round = input.round,
            "ballot cast"
        );
        let audited_voter = match session.anonymity {
            AnonymityLevel::Public => Some(input.voter),
            AnonymityLevel::Anonymous | AnonymityLevel::Secret => None,
        };
        self.audit.emit(AuditEvent::BallotCast {
            session: input.session,
            item: input.item,
            voter: audited_voter,
            weight: ballot.weight,
            represented: ballot.represented_count(),
            round: input.round,
            at: now,
        });

        Ok(ballot)
    }
}
