//! Meetings and meeting roles.

pub mod entities;
pub mod repository;
pub mod roles;

pub use entities::Meeting;
pub use repository::MeetingStore;
pub use roles::{resolve_voting_weight, MeetingRole, RoleCapabilities, RoleTag};
