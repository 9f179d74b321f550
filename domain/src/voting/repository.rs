//! Voting session store contract.

use super::ballot::Ballot;
use super::session::VotingSession;
use crate::core::ids::{ItemId, SessionId};
use crate::core::store::StoreError;
use crate::core::error::GovernanceError;
use async_trait::async_trait;

/// Versioned store for voting sessions.
///
/// Ballot appends go through [`SessionStore::append_ballot`], which must
/// run the `(item, voter, round)` uniqueness check and the insert as one
/// atomic unit against the stored aggregate. Casting on different sessions
/// proceeds in parallel; two concurrent casts for the same voter and item
/// must leave exactly one ballot.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session; fails if the id already exists.
    async fn insert(&self, session: &VotingSession) -> Result<(), StoreError>;

    /// Load a session by id.
    async fn load(&self, id: &SessionId) -> Result<VotingSession, StoreError>;

    /// Compare-and-swap write of a mutated session.
    async fn put(&self, session: &VotingSession) -> Result<(), StoreError>;

    /// Atomically validate and append one ballot to an item of an open
    /// session. Domain rejections (duplicate vote, closed session,
    /// deadline) come back in the outer `Ok`.
    async fn append_ballot(
        &self,
        session: &SessionId,
        item: &ItemId,
        ballot: Ballot,
    ) -> Result<Result<(), GovernanceError>, StoreError>;
}
