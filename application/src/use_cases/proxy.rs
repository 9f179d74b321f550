//! Proxy administration: grant, revoke, expire-sweep.

use crate::ports::audit::{AuditEvent, AuditSink};
use crate::ports::clock::Clock;
use crate::ports::directory::MembershipDirectory;
use plenum_domain::{
    resolve_voting_weight, EffectiveWindow, GovernanceError, GrantId, GrantRequest, MeetingId,
    ProxyScope, ProxyStore, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Input for granting a proxy.
#[derive(Debug, Clone)]
pub struct GrantProxyInput {
    pub meeting: MeetingId,
    pub grantor: UserId,
    pub holder: UserId,
    pub window: EffectiveWindow,
    /// Delegated weight; defaults to the grantor's resolved role weight.
    pub voting_weight: Option<f64>,
    pub scope: ProxyScope,
    pub max_votes_allowed: Option<u32>,
    pub can_sub_delegate: bool,
    pub parent_grant: Option<GrantId>,
}

/// Creates a grant, auto-revoking any conflicting prior grant in the same
/// aggregate write.
pub struct GrantProxyUseCase {
    proxies: Arc<dyn ProxyStore>,
    directory: Arc<dyn MembershipDirectory>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl GrantProxyUseCase {
    pub fn new(
        proxies: Arc<dyn ProxyStore>,
        directory: Arc<dyn MembershipDirectory>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            proxies,
            directory,
            audit,
            clock,
        }
    }

    pub async fn execute(&self, input: GrantProxyInput) -> Result<GrantId, GovernanceError> {
        let now = self.clock.now();

        let weight = match input.voting_weight {
            Some(w) => w,
            None => {
                let roles = self
                    .directory
                    .roles_for(&input.meeting, &input.grantor)
                    .await;
                let (weight, eligible) = resolve_voting_weight(&roles);
                if !eligible {
                    return Err(GovernanceError::Ineligible {
                        voter: input.grantor,
                    });
                }
                weight
            }
        };

        let mut graph = self.proxies.load_or_default(&input.meeting).await?;
        let mut request = GrantRequest::new(input.grantor.clone(), input.holder.clone(), input.window)
            .with_weight(weight);
        request.scope = input.scope;
        request.max_votes_allowed = input.max_votes_allowed;
        request.can_sub_delegate = input.can_sub_delegate;
        request.parent_grant = input.parent_grant;

        let (grant_id, superseded) = graph.grant(request, now)?;
        self.proxies.put(&graph).await?;

        info!(
            meeting = %input.meeting,
            grant = %grant_id,
            grantor = %input.grantor,
            holder = %input.holder,
            superseded = superseded.is_some(),
            "proxy granted"
        );
        self.audit.emit(AuditEvent::ProxyGranted {
            meeting: input.meeting,
            grant: grant_id.clone(),
            grantor: input.grantor,
            holder: input.holder,
            superseded,
            at: now,
        });

        Ok(grant_id)
    }
}

/// Explicitly revokes a grant. Idempotent; never cascades to
/// sub-delegations.
pub struct RevokeProxyUseCase {
    proxies: Arc<dyn ProxyStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl RevokeProxyUseCase {
    pub fn new(
        proxies: Arc<dyn ProxyStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            proxies,
            audit,
            clock,
        }
    }

    pub async fn execute(
        &self,
        meeting: &MeetingId,
        grant_id: &GrantId,
        revoked_by: &UserId,
        reason: &str,
    ) -> Result<(), GovernanceError> {
        let mut graph = self.proxies.load_or_default(meeting).await?;
        graph.revoke(grant_id, revoked_by, reason)?;
        self.proxies.put(&graph).await?;

        info!(meeting = %meeting, grant = %grant_id, reason, "proxy revoked");
        self.audit.emit(AuditEvent::ProxyRevoked {
            meeting: meeting.clone(),
            grant: grant_id.clone(),
            revoked_by: revoked_by.clone(),
            reason: reason.to_string(),
            at: self.clock.now(),
        });

        Ok(())
    }
}

/// Batch-expires grants whose window elapsed. Idempotent: running the
/// sweep twice produces no further change and emits no further events.
pub struct ExpireProxiesUseCase {
    proxies: Arc<dyn ProxyStore>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl ExpireProxiesUseCase {
    pub fn new(
        proxies: Arc<dyn ProxyStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            proxies,
            audit,
            clock,
        }
    }

    /// Returns the grants expired by this sweep.
    pub async fn execute(&self, meeting: &MeetingId) -> Result<Vec<GrantId>, GovernanceError> {
        let now = self.clock.now();
        let mut graph = self.proxies.load_or_default(meeting).await?;
        let expired = graph.expire_sweep(now);
        if expired.is_empty() {
            debug!(meeting = %meeting, "expire sweep: nothing to do");
            return Ok(expired);
        }
        self.proxies.put(&graph).await?;

        info!(meeting = %meeting, count = expired.len(), "proxies expired");
        self.audit.emit(AuditEvent::ProxiesExpired {
            meeting: meeting.clone(),
            grants: expired.clone(),
            at: now,
        });

        Ok(expired)
    }
}
