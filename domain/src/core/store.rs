//! Shared persistence error for the repository traits.
//!
//! The engine works against abstract key-addressed stores with atomic
//! read-modify-write per aggregate. Adapters live in the infrastructure
//! layer; the traits next to each aggregate module.

use super::error::GovernanceError;
use thiserror::Error;

/// Errors surfaced by store adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed aggregate does not exist.
    #[error("{entity} not found: '{id}'")]
    NotFound { entity: String, id: String },

    /// The aggregate's version no longer matches the caller's copy.
    #[error("version conflict on {entity} '{id}'")]
    VersionConflict { entity: String, id: String },

    /// An aggregate with this key already exists.
    #[error("{entity} already exists: '{id}'")]
    AlreadyExists { entity: String, id: String },

    /// Underlying medium failure; retryable by the caller with backoff.
    #[error("store unavailable: {0}")]
    Io(String),
}

impl StoreError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(entity: &str, id: impl std::fmt::Display) -> Self {
        StoreError::VersionConflict {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for GovernanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => GovernanceError::NotFound { entity, id },
            StoreError::VersionConflict { entity, .. } => {
                GovernanceError::StaleState { entity }
            }
            StoreError::AlreadyExists { entity, id } => GovernanceError::Validation(format!(
                "{entity} already exists: '{id}'"
            )),
            StoreError::Io(msg) => GovernanceError::Validation(format!("store unavailable: {msg}")),
        }
    }
}
