//! Proxy grant records.

use crate::core::ids::{GrantId, MeetingId, ResolutionId, UserId};
use crate::core::window::EffectiveWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum delegation chain depth, inclusive.
pub const MAX_CHAIN_DEPTH: u8 = 5;

/// What a grant covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxyScope {
    /// All votes in the meeting.
    #[default]
    Meeting,
    /// A single resolution.
    Resolution(ResolutionId),
}

/// Lifecycle status of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    Active,
    Revoked,
    Expired,
    /// The grant's vote allowance has been used up.
    Executed,
}

impl GrantStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GrantStatus::Active => "active",
            GrantStatus::Revoked => "revoked",
            GrantStatus::Expired => "expired",
            GrantStatus::Executed => "executed",
        }
    }
}

impl std::fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delegation of one identity's voting authority to another for a meeting.
///
/// `parent_grant` is a back-reference into the arena only; it never owns
/// the parent. `chain_depth` is 1 for a direct grant and
/// `parent.chain_depth + 1` for a sub-delegation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyGrant {
    pub id: GrantId,
    pub meeting: MeetingId,
    pub grantor: UserId,
    pub holder: UserId,
    pub scope: ProxyScope,
    /// The voting weight the grantor delegated.
    pub voting_weight: f64,
    /// Resolution-scoped usage limit; `None` means unlimited.
    pub max_votes_allowed: Option<u32>,
    pub votes_cast: u32,
    pub window: EffectiveWindow,
    pub status: GrantStatus,
    pub revocation_reason: Option<String>,
    pub revoked_by: Option<UserId>,
    pub can_sub_delegate: bool,
    pub parent_grant: Option<GrantId>,
    pub chain_depth: u8,
    pub created_at: DateTime<Utc>,
}

impl ProxyGrant {
    /// Whether the grant confers authority at `at`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.status == GrantStatus::Active && self.window.contains(at)
    }

    /// Revoke the grant. Idempotent: revoking a grant that is no longer
    /// active leaves it untouched.
    pub fn revoke(&mut self, revoked_by: &UserId, reason: impl Into<String>) {
        if self.status == GrantStatus::Active {
            self.status = GrantStatus::Revoked;
            self.revoked_by = Some(revoked_by.clone());
            self.revocation_reason = Some(reason.into());
        }
    }

    /// Transition an active grant whose window has elapsed to expired.
    /// Returns true when a transition happened.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == GrantStatus::Active && self.window.expired_at(now) {
            self.status = GrantStatus::Expired;
            true
        } else {
            false
        }
    }

    /// Account one vote cast under this grant. Reaching the allowance
    /// transitions the grant to `executed`.
    pub fn record_vote_use(&mut self) {
        self.votes_cast += 1;
        if let Some(max) = self.max_votes_allowed
            && self.votes_cast >= max
        {
            self.status = GrantStatus::Executed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, h, 0, 0).unwrap()
    }

    fn grant() -> ProxyGrant {
        ProxyGrant {
            id: GrantId::new("g-1"),
            meeting: MeetingId::new("m-1"),
            grantor: UserId::new("alice"),
            holder: UserId::new("bob"),
            scope: ProxyScope::Meeting,
            voting_weight: 1.0,
            max_votes_allowed: Some(2),
            votes_cast: 0,
            window: EffectiveWindow::between(t(9), t(17)),
            status: GrantStatus::Active,
            revocation_reason: None,
            revoked_by: None,
            can_sub_delegate: false,
            parent_grant: None,
            chain_depth: 1,
            created_at: t(9),
        }
    }

    #[test]
    fn test_active_window_bounds() {
        let g = grant();
        assert!(!g.is_active_at(t(8)));
        assert!(g.is_active_at(t(12)));
        assert!(!g.is_active_at(t(17)));
    }

    #[test]
    fn test_revoke_is_idempotent() {
        let mut g = grant();
        g.revoke(&UserId::new("alice"), "changed my mind");
        assert_eq!(g.status, GrantStatus::Revoked);
        assert_eq!(g.revocation_reason.as_deref(), Some("changed my mind"));

        // A second revocation does not overwrite the first reason.
        g.revoke(&UserId::new("chair"), "superseded");
        assert_eq!(g.revocation_reason.as_deref(), Some("changed my mind"));
    }

    #[test]
    fn test_expire_only_active_and_elapsed() {
        let mut g = grant();
        assert!(!g.expire(t(12)));
        assert!(g.expire(t(18)));
        assert_eq!(g.status, GrantStatus::Expired);
        // Idempotent.
        assert!(!g.expire(t(19)));
    }

    #[test]
    fn test_vote_allowance_executes_grant() {
        let mut g = grant();
        g.record_vote_use();
        assert_eq!(g.status, GrantStatus::Active);
        g.record_vote_use();
        assert_eq!(g.status, GrantStatus::Executed);
        assert_eq!(g.votes_cast, 2);
    }
}
