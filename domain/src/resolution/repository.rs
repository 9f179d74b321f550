//! Resolution store contract.

use super::entities::Resolution;
use crate::core::ids::{MeetingId, ResolutionId};
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Store for the resolution catalog.
#[async_trait]
pub trait ResolutionStore: Send + Sync {
    /// Insert a newly proposed resolution; fails if the id already exists.
    async fn insert(&self, resolution: &Resolution) -> Result<(), StoreError>;

    /// Load a resolution by id.
    async fn load(&self, id: &ResolutionId) -> Result<Resolution, StoreError>;

    /// Replace a resolution record.
    async fn put(&self, resolution: &Resolution) -> Result<(), StoreError>;

    /// All resolutions proposed for a meeting, in proposal order.
    async fn for_meeting(&self, meeting: &MeetingId) -> Result<Vec<Resolution>, StoreError>;
}
