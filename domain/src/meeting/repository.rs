//! Meeting store contract.

use super::entities::Meeting;
use crate::core::ids::MeetingId;
use crate::core::store::StoreError;
use async_trait::async_trait;

/// Key-addressed store for meeting aggregates.
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Insert a new meeting; fails if the id already exists.
    async fn insert(&self, meeting: &Meeting) -> Result<(), StoreError>;

    /// Load a meeting by id.
    async fn load(&self, id: &MeetingId) -> Result<Meeting, StoreError>;

    /// Replace a meeting aggregate.
    async fn put(&self, meeting: &Meeting) -> Result<(), StoreError>;
}
