//! In-memory meeting store.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_domain::{Meeting, MeetingId, MeetingStore, StoreError};

#[derive(Default)]
pub struct MemoryMeetingStore {
    meetings: DashMap<MeetingId, Meeting>,
}

impl MemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MeetingStore for MemoryMeetingStore {
    async fn insert(&self, meeting: &Meeting) -> Result<(), StoreError> {
        if self.meetings.contains_key(&meeting.id) {
            return Err(StoreError::AlreadyExists {
                entity: "meeting".to_string(),
                id: meeting.id.to_string(),
            });
        }
        self.meetings.insert(meeting.id.clone(), meeting.clone());
        Ok(())
    }

    async fn load(&self, id: &MeetingId) -> Result<Meeting, StoreError> {
        self.meetings
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("meeting", id))
    }

    async fn put(&self, meeting: &Meeting) -> Result<(), StoreError> {
        let mut entry = self
            .meetings
            .get_mut(&meeting.id)
            .ok_or_else(|| StoreError::not_found("meeting", &meeting.id))?;
        *entry = meeting.clone();
        Ok(())
    }
}
