//! The proxy delegation arena.
//!
//! All grants for one meeting form a single aggregate, so granting and the
//! conflict auto-revocation it triggers commit as one write. Grants are
//! indexed by id; `parent_grant` is a back-reference only. Chain traversal
//! is iterative with a hop counter, never recursive.

use super::grant::{GrantStatus, ProxyGrant, ProxyScope, MAX_CHAIN_DEPTH};
use crate::core::error::GovernanceError;
use crate::core::ids::{GrantId, MeetingId, UserId};
use crate::core::window::EffectiveWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for a new grant.
#[derive(Debug, Clone)]
pub struct GrantRequest {
    pub grantor: UserId,
    pub holder: UserId,
    pub window: EffectiveWindow,
    pub voting_weight: f64,
    pub scope: ProxyScope,
    pub max_votes_allowed: Option<u32>,
    pub can_sub_delegate: bool,
    /// Present when this grant sub-delegates authority received through
    /// an existing grant.
    pub parent_grant: Option<GrantId>,
}

impl GrantRequest {
    pub fn new(grantor: impl Into<UserId>, holder: impl Into<UserId>, window: EffectiveWindow) -> Self {
        Self {
            grantor: grantor.into(),
            holder: holder.into(),
            window,
            voting_weight: 1.0,
            scope: ProxyScope::Meeting,
            max_votes_allowed: None,
            can_sub_delegate: false,
            parent_grant: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.voting_weight = weight;
        self
    }

    pub fn with_sub_delegation(mut self) -> Self {
        self.can_sub_delegate = true;
        self
    }

    pub fn with_parent(mut self, parent: GrantId) -> Self {
        self.parent_grant = Some(parent);
        self
    }

    pub fn with_vote_limit(mut self, max: u32) -> Self {
        self.max_votes_allowed = Some(max);
        self
    }
}

/// A grantor's chain resolved to the identity that ultimately casts the
/// ballot, with the delegated weight and the links crossed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProxy {
    pub grantor: UserId,
    /// Weight of the originating grant (the authority actually delegated).
    pub weight: f64,
    /// Every grant crossed, origin first.
    pub chain: Vec<GrantId>,
}

/// The per-meeting delegation aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyGraph {
    pub meeting: MeetingId,
    grants: HashMap<GrantId, ProxyGrant>,
    /// Optimistic-concurrency version; bumped by the store on every write.
    pub version: u64,
}

impl ProxyGraph {
    pub fn new(meeting: impl Into<MeetingId>) -> Self {
        Self {
            meeting: meeting.into(),
            grants: HashMap::new(),
            version: 0,
        }
    }

    pub fn get(&self, id: &GrantId) -> Option<&ProxyGrant> {
        self.grants.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyGrant> {
        self.grants.values()
    }

    /// The grantor's single active outgoing grant at `at`, if any.
    ///
    /// At most one exists by construction; [`ProxyGraph::grant`] auto-revokes
    /// the previous one.
    pub fn active_grant_of(&self, grantor: &UserId, at: DateTime<Utc>) -> Option<&ProxyGrant> {
        self.grants
            .values()
            .find(|g| &g.grantor == grantor && g.is_active_at(at))
    }

    /// Create a grant, auto-revoking any prior active grant by the same
    /// grantor (reason "superseded").
    ///
    /// Returns the new grant's id and the id of the superseded grant, if
    /// one was revoked.
    pub fn grant(
        &mut self,
        request: GrantRequest,
        at: DateTime<Utc>,
    ) -> Result<(GrantId, Option<GrantId>), GovernanceError> {
        if request.grantor == request.holder {
            return Err(GovernanceError::SelfProxy {
                user: request.grantor,
            });
        }

        let chain_depth = match &request.parent_grant {
            Some(parent_id) => {
                let parent = self.grants.get(parent_id).ok_or_else(|| {
                    GovernanceError::NotFound {
                        entity: "proxy grant".to_string(),
                        id: parent_id.to_string(),
                    }
                })?;
                if parent.holder != request.grantor {
                    return Err(GovernanceError::Validation(format!(
                        "sub-delegation must be made by the parent grant's holder \
                         ('{}' is not '{}')",
                        request.grantor, parent.holder
                    )));
                }
                if !parent.can_sub_delegate {
                    return Err(GovernanceError::Validation(format!(
                        "grant '{parent_id}' does not permit sub-delegation"
                    )));
                }
                parent.chain_depth + 1
            }
            None => 1,
        };

        if chain_depth > MAX_CHAIN_DEPTH {
            return Err(GovernanceError::ChainTooDeep {
                depth: chain_depth,
                limit: MAX_CHAIN_DEPTH,
            });
        }

        // Conflict auto-revocation: at most one active grant per grantor.
        let superseded = self
            .grants
            .values()
            .find(|g| g.grantor == request.grantor && g.status == GrantStatus::Active)
            .map(|g| g.id.clone());
        if let Some(prior_id) = &superseded
            && let Some(prior) = self.grants.get_mut(prior_id)
        {
            prior.revoke(&request.grantor, "superseded");
        }

        let id = GrantId::generate();
        let grant = ProxyGrant {
            id: id.clone(),
            meeting: self.meeting.clone(),
            grantor: request.grantor,
            holder: request.holder,
            scope: request.scope,
            voting_weight: request.voting_weight,
            max_votes_allowed: request.max_votes_allowed,
            votes_cast: 0,
            window: request.window,
            status: GrantStatus::Active,
            revocation_reason: None,
            revoked_by: None,
            can_sub_delegate: request.can_sub_delegate,
            parent_grant: request.parent_grant,
            chain_depth,
            created_at: at,
        };
        self.grants.insert(id.clone(), grant);

        Ok((id, superseded))
    }

    /// Explicitly revoke a grant. Idempotent. Does not cascade to
    /// sub-delegated grants; those live out their own windows.
    pub fn revoke(
        &mut self,
        grant_id: &GrantId,
        revoked_by: &UserId,
        reason: impl Into<String>,
    ) -> Result<(), GovernanceError> {
        let grant = self
            .grants
            .get_mut(grant_id)
            .ok_or_else(|| GovernanceError::NotFound {
                entity: "proxy grant".to_string(),
                id: grant_id.to_string(),
            })?;
        grant.revoke(revoked_by, reason);
        Ok(())
    }

    /// Walk the active chain from `grantor` to the identity that
    /// ultimately holds the authority at `at`.
    ///
    /// Returns `None` when the grantor has no active delegation. A link is
    /// crossed onward only if it permits sub-delegation; otherwise the walk
    /// stops at that link's holder. Traversal is hop-capped as a cycle
    /// defense even though [`ProxyGraph::grant`] prevents cycle creation.
    pub fn resolve_effective_holder(
        &self,
        grantor: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<ResolvedProxy>, GovernanceError> {
        let Some(first) = self.active_grant_of(grantor, at) else {
            return Ok(None);
        };

        let mut chain = vec![first.id.clone()];
        let mut current = first;
        let mut hops: u8 = 1;

        loop {
            if !current.can_sub_delegate {
                break;
            }
            let Some(next) = self.active_grant_of(&current.holder, at) else {
                break;
            };
            hops += 1;
            if hops > MAX_CHAIN_DEPTH + 1 {
                return Err(GovernanceError::CycleDetected {
                    grantor: grantor.clone(),
                });
            }
            chain.push(next.id.clone());
            current = next;
        }

        Ok(Some(ResolvedProxy {
            grantor: grantor.clone(),
            weight: first.voting_weight,
            chain,
        }))
    }

    /// Every grantor whose active chain terminates at `holder` at `at`.
    pub fn grantors_resolving_to(
        &self,
        holder: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Vec<ResolvedProxy>, GovernanceError> {
        let mut resolved = Vec::new();
        let mut grantors: Vec<&UserId> = self
            .grants
            .values()
            .filter(|g| g.is_active_at(at))
            .map(|g| &g.grantor)
            .collect();
        grantors.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        grantors.dedup();
        for grantor in grantors {
            if let Some(proxy) = self.resolve_effective_holder(grantor, at)?
                && self.holder_of(&proxy) == Some(holder)
            {
                resolved.push(proxy);
            }
        }
        resolved.sort_by(|a, b| a.grantor.as_str().cmp(b.grantor.as_str()));
        Ok(resolved)
    }

    /// The identity a resolved chain terminates at.
    pub fn holder_of(&self, proxy: &ResolvedProxy) -> Option<&UserId> {
        proxy
            .chain
            .last()
            .and_then(|id| self.grants.get(id))
            .map(|g| &g.holder)
    }

    /// Account a cast vote on every link of a resolved chain.
    pub fn record_vote_use(&mut self, proxy: &ResolvedProxy) {
        for id in &proxy.chain {
            if let Some(grant) = self.grants.get_mut(id) {
                grant.record_vote_use();
            }
        }
    }

    /// Batch-expire all active grants whose window elapsed before `now`.
    /// Idempotent; returns the ids that transitioned this call.
    pub fn expire_sweep(&mut self, now: DateTime<Utc>) -> Vec<GrantId> {
        let mut expired = Vec::new();
        for grant in self.grants.values_mut() {
            if grant.expire(now) {
                expired.push(grant.id.clone());
            }
        }
        expired.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, h, 0, 0).unwrap()
    }

    fn window() -> EffectiveWindow {
        EffectiveWindow::between(t(8), t(20))
    }

    fn graph() -> ProxyGraph {
        ProxyGraph::new("m-1")
    }

    #[test]
    fn test_self_proxy_rejected() {
        let mut g = graph();
        let err = g
            .grant(GrantRequest::new("alice", "alice", window()), t(9))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::SelfProxy { .. }));
    }

    #[test]
    fn test_new_grant_supersedes_prior_active() {
        let mut g = graph();
        let (first, none) = g
            .grant(GrantRequest::new("alice", "bob", window()), t(9))
            .unwrap();
        assert!(none.is_none());

        let (_second, revoked) = g
            .grant(GrantRequest::new("alice", "carol", window()), t(10))
            .unwrap();
        assert_eq!(revoked.as_ref(), Some(&first));

        let prior = g.get(&first).unwrap();
        assert_eq!(prior.status, GrantStatus::Revoked);
        assert_eq!(prior.revocation_reason.as_deref(), Some("superseded"));

        // Only the new grant is active.
        let active = g.active_grant_of(&UserId::new("alice"), t(11)).unwrap();
        assert_eq!(active.holder, UserId::new("carol"));
    }

    #[test]
    fn test_chain_depth_enforced() {
        let mut g = graph();
        // a1 -> a2 -> ... -> a6, each link sub-delegating the last.
        let mut parent: Option<GrantId> = None;
        for i in 1..=4 {
            let request = {
                let base = GrantRequest::new(format!("a{i}"), format!("a{}", i + 1), window())
                    .with_sub_delegation();
                match &parent {
                    Some(p) => base.with_parent(p.clone()),
                    None => base,
                }
            };
            let (id, _) = g.grant(request, t(9)).unwrap();
            parent = Some(id);
        }
        // Depth 5 is still legal.
        let (id5, _) = g
            .grant(
                GrantRequest::new("a5", "a6", window())
                    .with_sub_delegation()
                    .with_parent(parent.unwrap()),
                t(9),
            )
            .unwrap();
        // Depth 6 exceeds the limit.
        let err = g
            .grant(
                GrantRequest::new("a6", "a7", window())
                    .with_sub_delegation()
                    .with_parent(id5),
                t(9),
            )
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::ChainTooDeep {
                depth: 6,
                limit: MAX_CHAIN_DEPTH
            }
        );
    }

    #[test]
    fn test_sub_delegation_requires_parent_permission() {
        let mut g = graph();
        let (parent, _) = g
            .grant(GrantRequest::new("alice", "bob", window()), t(9))
            .unwrap();
        let err = g
            .grant(
                GrantRequest::new("bob", "carol", window()).with_parent(parent),
                t(9),
            )
            .unwrap_err();
        assert!(err.to_string().contains("does not permit sub-delegation"));
    }

    #[test]
    fn test_resolve_direct_chain() {
        let mut g = graph();
        g.grant(GrantRequest::new("alice", "bob", window()), t(9))
            .unwrap();

        let resolved = g
            .resolve_effective_holder(&UserId::new("alice"), t(10))
            .unwrap()
            .unwrap();
        assert_eq!(g.holder_of(&resolved), Some(&UserId::new("bob")));
        assert_eq!(resolved.chain.len(), 1);
    }

    #[test]
    fn test_resolve_follows_sub_delegation() {
        let mut g = graph();
        let (first, _) = g
            .grant(
                GrantRequest::new("alice", "bob", window()).with_sub_delegation(),
                t(9),
            )
            .unwrap();
        g.grant(
            GrantRequest::new("bob", "carol", window()).with_parent(first),
            t(9),
        )
        .unwrap();

        let resolved = g
            .resolve_effective_holder(&UserId::new("alice"), t(10))
            .unwrap()
            .unwrap();
        assert_eq!(g.holder_of(&resolved), Some(&UserId::new("carol")));
        assert_eq!(resolved.chain.len(), 2);
    }

    #[test]
    fn test_walk_stops_where_sub_delegation_is_not_permitted() {
        let mut g = graph();
        // alice -> bob without sub-delegation; bob -> carol independently.
        g.grant(GrantRequest::new("alice", "bob", window()), t(9))
            .unwrap();
        g.grant(GrantRequest::new("bob", "carol", window()), t(9))
            .unwrap();

        let resolved = g
            .resolve_effective_holder(&UserId::new("alice"), t(10))
            .unwrap()
            .unwrap();
        // Alice's authority stays with bob even though bob delegated his own.
        assert_eq!(g.holder_of(&resolved), Some(&UserId::new("bob")));
    }

    #[test]
    fn test_expired_link_terminates_walk() {
        let mut g = graph();
        let (first, _) = g
            .grant(
                GrantRequest::new("alice", "bob", window()).with_sub_delegation(),
                t(9),
            )
            .unwrap();
        g.grant(
            GrantRequest::new("bob", "carol", EffectiveWindow::between(t(8), t(10)))
                .with_parent(first),
            t(9),
        )
        .unwrap();

        // At 12:00 bob's onward grant has expired; alice resolves to bob.
        let resolved = g
            .resolve_effective_holder(&UserId::new("alice"), t(12))
            .unwrap()
            .unwrap();
        assert_eq!(g.holder_of(&resolved), Some(&UserId::new("bob")));
    }

    #[test]
    fn test_cycle_detection_is_defensive() {
        // Force a cycle by hand to exercise the traversal cap; grant()
        // cannot create one.
        let mut g = graph();
        let (a_to_b, _) = g
            .grant(
                GrantRequest::new("alice", "bob", window()).with_sub_delegation(),
                t(9),
            )
            .unwrap();
        let (b_to_a, _) = g
            .grant(
                GrantRequest::new("bob", "alice", window()).with_sub_delegation(),
                t(9),
            )
            .unwrap();
        assert!(g.get(&a_to_b).is_some() && g.get(&b_to_a).is_some());

        let err = g
            .resolve_effective_holder(&UserId::new("alice"), t(10))
            .unwrap_err();
        assert_eq!(
            err,
            GovernanceError::CycleDetected {
                grantor: UserId::new("alice")
            }
        );
    }

    #[test]
    fn test_grantors_resolving_to_holder() {
        let mut g = graph();
        g.grant(GrantRequest::new("alice", "bob", window()), t(9))
            .unwrap();
        g.grant(GrantRequest::new("dan", "bob", window()).with_weight(2.0), t(9))
            .unwrap();
        g.grant(GrantRequest::new("erin", "carol", window()), t(9))
            .unwrap();

        let to_bob = g.grantors_resolving_to(&UserId::new("bob"), t(10)).unwrap();
        assert_eq!(to_bob.len(), 2);
        assert_eq!(to_bob[0].grantor, UserId::new("alice"));
        assert_eq!(to_bob[1].grantor, UserId::new("dan"));
        assert_eq!(to_bob[1].weight, 2.0);
    }

    #[test]
    fn test_revocation_does_not_cascade() {
        let mut g = graph();
        let (first, _) = g
            .grant(
                GrantRequest::new("alice", "bob", window()).with_sub_delegation(),
                t(9),
            )
            .unwrap();
        let (second, _) = g
            .grant(
                GrantRequest::new("bob", "carol", window()).with_parent(first.clone()),
                t(9),
            )
            .unwrap();

        g.revoke(&first, &UserId::new("alice"), "changed plans")
            .unwrap();

        // The sub-delegated grant stays active on its own lifecycle.
        assert_eq!(g.get(&second).unwrap().status, GrantStatus::Active);
        // But alice no longer delegates to anyone.
        assert!(
            g.resolve_effective_holder(&UserId::new("alice"), t(10))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_expire_sweep_is_idempotent() {
        let mut g = graph();
        g.grant(
            GrantRequest::new("alice", "bob", EffectiveWindow::between(t(8), t(10))),
            t(9),
        )
        .unwrap();
        g.grant(GrantRequest::new("dan", "bob", window()), t(9))
            .unwrap();

        let swept = g.expire_sweep(t(11));
        assert_eq!(swept.len(), 1);
        let again = g.expire_sweep(t(11));
        assert!(again.is_empty());
    }

    #[test]
    fn test_vote_use_accounting_walks_the_chain() {
        let mut g = graph();
        let (first, _) = g
            .grant(
                GrantRequest::new("alice", "bob", window())
                    .with_sub_delegation()
                    .with_vote_limit(1),
                t(9),
            )
            .unwrap();
        let (second, _) = g
            .grant(
                GrantRequest::new("bob", "carol", window()).with_parent(first.clone()),
                t(9),
            )
            .unwrap();

        let resolved = g
            .resolve_effective_holder(&UserId::new("alice"), t(10))
            .unwrap()
            .unwrap();
        g.record_vote_use(&resolved);

        assert_eq!(g.get(&first).unwrap().status, GrantStatus::Executed);
        assert_eq!(g.get(&second).unwrap().votes_cast, 1);
    }
}
