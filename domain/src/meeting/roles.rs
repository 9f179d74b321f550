//! Meeting roles and voting-weight resolution.
//!
//! Role data is owned by the external membership system; this module only
//! defines its shape and the pure weight resolution consumed by the voting
//! engine. A user may hold several roles in one meeting.

use crate::core::ids::{MeetingId, UserId};
use serde::{Deserialize, Serialize};

/// Role a participant holds in a meeting (chair, director, observer, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTag(String);

impl RoleTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for RoleTag {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a role lets its holder do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleCapabilities {
    pub can_vote: bool,
    pub can_preside: bool,
    pub can_propose: bool,
}

impl RoleCapabilities {
    /// Full voting membership (vote + propose).
    pub fn voting_member() -> Self {
        Self {
            can_vote: true,
            can_preside: false,
            can_propose: true,
        }
    }

    /// Chair capabilities (vote + preside + propose).
    pub fn presiding() -> Self {
        Self {
            can_vote: true,
            can_preside: true,
            can_propose: true,
        }
    }

    /// Non-voting attendance.
    pub fn observer() -> Self {
        Self::default()
    }
}

/// One role binding for a user in a meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingRole {
    pub meeting: MeetingId,
    pub user: UserId,
    pub role: RoleTag,
    pub voting_weight: f64,
    pub capabilities: RoleCapabilities,
}

impl MeetingRole {
    pub fn new(
        meeting: impl Into<MeetingId>,
        user: impl Into<UserId>,
        role: impl Into<RoleTag>,
        voting_weight: f64,
        capabilities: RoleCapabilities,
    ) -> Self {
        Self {
            meeting: meeting.into(),
            user: user.into(),
            role: role.into(),
            voting_weight,
            capabilities,
        }
    }
}

/// Resolve a participant's base voting weight from their active roles.
///
/// Returns `(weight, eligible)`. A user with no voting-capable role is
/// ineligible; weights of multiple voting roles add up.
///
/// # Example
///
/// ```
/// use plenum_domain::meeting::roles::{resolve_voting_weight, MeetingRole, RoleCapabilities};
///
/// let roles = vec![
///     MeetingRole::new("m-1", "alice", "director", 1.0, RoleCapabilities::voting_member()),
///     MeetingRole::new("m-1", "alice", "treasurer", 0.5, RoleCapabilities::voting_member()),
/// ];
/// assert_eq!(resolve_voting_weight(&roles), (1.5, true));
///
/// let observer = vec![
///     MeetingRole::new("m-1", "bob", "observer", 0.0, RoleCapabilities::observer()),
/// ];
/// assert_eq!(resolve_voting_weight(&observer), (0.0, false));
/// ```
pub fn resolve_voting_weight(roles: &[MeetingRole]) -> (f64, bool) {
    let weight: f64 = roles
        .iter()
        .filter(|r| r.capabilities.can_vote)
        .map(|r| r.voting_weight)
        .sum();
    let eligible = roles.iter().any(|r| r.capabilities.can_vote);
    (weight, eligible)
}
