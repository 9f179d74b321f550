//! Membership directory port.
//!
//! Identity, membership, and role data are owned by an external system;
//! the engine consumes them read-only through this port.

use async_trait::async_trait;
use plenum_domain::{MeetingId, MeetingRole, OrgId, UserId};

/// Read access to the external membership system.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Whether the user is an active member of the organization.
    async fn is_active_member(&self, org: &OrgId, user: &UserId) -> bool;

    /// All roles the user holds in the meeting.
    async fn roles_for(&self, meeting: &MeetingId, user: &UserId) -> Vec<MeetingRole>;

    /// Every role binding for the meeting, used to snapshot eligibility
    /// when a voting session opens.
    async fn voting_roster(&self, meeting: &MeetingId) -> Vec<MeetingRole>;
}
