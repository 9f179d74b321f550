//! Audit sink adapters.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlAuditSink;
pub use memory::MemoryAuditSink;
