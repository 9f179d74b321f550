//! In-memory voting session store.
//!
//! `append_ballot` runs the session-open check, the `(item, voter, round)`
//! uniqueness check, and the insert under the session entry's write guard:
//! one atomic unit per session, fully parallel across sessions.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_domain::{
    Ballot, GovernanceError, ItemId, SessionId, SessionStore, StoreError, VotingSession,
};

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, VotingSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &VotingSession) -> Result<(), StoreError> {
        if self.sessions.contains_key(&session.id) {
            return Err(StoreError::AlreadyExists {
                entity: "voting session".to_string(),
                id: session.id.to_string(),
            });
        }
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<VotingSession, StoreError> {
        self.sessions
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("voting session", id))
    }

    async fn put(&self, session: &VotingSession) -> Result<(), StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&session.id)
            .ok_or_else(|| StoreError::not_found("voting session", &session.id))?;
        if entry.version != session.version {
            return Err(StoreError::conflict("voting session", &session.id));
        }
        let mut next = session.clone();
        next.version += 1;
        *entry = next;
        Ok(())
    }

    async fn append_ballot(
        &self,
        session: &SessionId,
        item: &ItemId,
        ballot: Ballot,
    ) -> Result<Result<(), GovernanceError>, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(session)
            .ok_or_else(|| StoreError::not_found("voting session", session))?;

        // Validate against current state, not the caller's snapshot: a
        // close or deadline that landed since the caller loaded must win.
        if let Err(err) = entry.check_accepts_ballots(ballot.cast_at) {
            return Ok(Err(err));
        }
        let outcome = match entry.item_mut(item) {
            Ok(item) => item.push_ballot(ballot),
            Err(err) => Err(err),
        };
        if outcome.is_ok() {
            entry.version += 1;
        }
        Ok(outcome)
    }
}
