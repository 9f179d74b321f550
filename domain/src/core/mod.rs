//! Core domain primitives shared by every module.

pub mod error;
pub mod ids;
pub mod store;
pub mod window;

pub use error::GovernanceError;
pub use ids::{
    GrantId, InstanceId, ItemId, MeetingId, OrgId, ResolutionId, SessionId, UserId,
};
pub use store::StoreError;
pub use window::EffectiveWindow;
