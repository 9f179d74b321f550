//! Static membership directory.
//!
//! Fixture- or config-driven adapter for the external membership system:
//! members and per-meeting role bindings registered up front.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_application::ports::directory::MembershipDirectory;
use plenum_domain::{MeetingId, MeetingRole, OrgId, UserId};

#[derive(Default)]
pub struct StaticDirectory {
    members: DashMap<OrgId, Vec<UserId>>,
    roles: DashMap<MeetingId, Vec<MeetingRole>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, org: impl Into<OrgId>, user: impl Into<UserId>) {
        self.members.entry(org.into()).or_default().push(user.into());
    }

    pub fn add_role(&self, role: MeetingRole) {
        self.roles.entry(role.meeting.clone()).or_default().push(role);
    }
}

#[async_trait]
impl MembershipDirectory for StaticDirectory {
    async fn is_active_member(&self, org: &OrgId, user: &UserId) -> bool {
        self.members
            .get(org)
            .map(|m| m.contains(user))
            .unwrap_or(false)
    }

    async fn roles_for(&self, meeting: &MeetingId, user: &UserId) -> Vec<MeetingRole> {
        self.roles
            .get(meeting)
            .map(|roles| {
                roles
                    .iter()
                    .filter(|r| &r.user == user)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn voting_roster(&self, meeting: &MeetingId) -> Vec<MeetingRole> {
        self.roles
            .get(meeting)
            .map(|roles| roles.value().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_domain::RoleCapabilities;

    #[tokio::test]
    async fn test_roles_filtered_per_user() {
        let dir = StaticDirectory::new();
        dir.add_role(MeetingRole::new(
            "m-1",
            "alice",
            "director",
            1.0,
            RoleCapabilities::voting_member(),
        ));
        dir.add_role(MeetingRole::new(
            "m-1",
            "bob",
            "observer",
            0.0,
            RoleCapabilities::observer(),
        ));

        let alice = dir
            .roles_for(&MeetingId::new("m-1"), &UserId::new("alice"))
            .await;
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].role.as_str(), "director");

        let roster = dir.voting_roster(&MeetingId::new("m-1")).await;
        assert_eq!(roster.len(), 2);
    }

    #[tokio::test]
    async fn test_membership_lookup() {
        let dir = StaticDirectory::new();
        dir.add_member("acme", "alice");
        assert!(
            dir.is_active_member(&OrgId::new("acme"), &UserId::new("alice"))
                .await
        );
        assert!(
            !dir.is_active_member(&OrgId::new("acme"), &UserId::new("mallory"))
                .await
        );
    }
}
