//! Configuration loading.

pub mod file_config;
pub mod loader;

pub use file_config::{AuditSection, FileConfig, GovernanceSection, SequenceSpec, WorkflowSection};
pub use loader::ConfigLoader;
