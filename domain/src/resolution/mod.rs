//! The resolution catalog.

pub mod entities;
pub mod repository;

pub use entities::{OutcomeRecord, Resolution, ResolutionStatus};
pub use repository::ResolutionStore;
