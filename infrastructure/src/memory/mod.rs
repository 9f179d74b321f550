//! In-memory store adapters.
//!
//! The reference implementation of the persistence contract: versioned
//! aggregates in `DashMap`s, compare-and-swap writes inside the entry
//! guard. A database adapter would implement the same traits with the
//! same atomicity per aggregate.

pub mod meeting;
pub mod proxy;
pub mod resolution;
pub mod session;
pub mod workflow;

pub use meeting::MemoryMeetingStore;
pub use proxy::MemoryProxyStore;
pub use resolution::MemoryResolutionStore;
pub use session::MemorySessionStore;
pub use workflow::MemoryWorkflowStore;
