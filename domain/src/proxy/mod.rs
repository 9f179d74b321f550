//! Proxy grants and delegation chain resolution.

pub mod grant;
pub mod graph;
pub mod repository;

pub use grant::{GrantStatus, ProxyGrant, ProxyScope, MAX_CHAIN_DEPTH};
pub use graph::{GrantRequest, ProxyGraph, ResolvedProxy};
pub use repository::ProxyStore;
