//! In-memory resolution store.

use async_trait::async_trait;
use dashmap::DashMap;
use plenum_domain::{MeetingId, Resolution, ResolutionId, ResolutionStore, StoreError};

#[derive(Default)]
pub struct MemoryResolutionStore {
    resolutions: DashMap<ResolutionId, Resolution>,
    /// Proposal order per meeting.
    by_meeting: DashMap<MeetingId, Vec<ResolutionId>>,
}

impl MemoryResolutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResolutionStore for MemoryResolutionStore {
    async fn insert(&self, resolution: &Resolution) -> Result<(), StoreError> {
        if self.resolutions.contains_key(&resolution.id) {
            return Err(StoreError::AlreadyExists {
                entity: "resolution".to_string(),
                id: resolution.id.to_string(),
            });
        }
        self.resolutions
            .insert(resolution.id.clone(), resolution.clone());
        self.by_meeting
            .entry(resolution.meeting.clone())
            .or_default()
            .push(resolution.id.clone());
        Ok(())
    }

    async fn load(&self, id: &ResolutionId) -> Result<Resolution, StoreError> {
        self.resolutions
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| StoreError::not_found("resolution", id))
    }

    async fn put(&self, resolution: &Resolution) -> Result<(), StoreError> {
        let mut entry = self
            .resolutions
            .get_mut(&resolution.id)
            .ok_or_else(|| StoreError::not_found("resolution", &resolution.id))?;
        *entry = resolution.clone();
        Ok(())
    }

    async fn for_meeting(&self, meeting: &MeetingId) -> Result<Vec<Resolution>, StoreError> {
        let ids = self
            .by_meeting
            .get(meeting)
            .map(|e| e.value().clone())
            .unwrap_or_default();
        let mut resolutions = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(r) = self.resolutions.get(&id) {
                resolutions.push(r.value().clone());
            }
        }
        Ok(resolutions)
    }
}
