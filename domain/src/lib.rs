//! Domain layer for plenum
//!
//! This crate contains the governance entities, state machines, and tally
//! logic. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Workflow
//!
//! A meeting runs through an ordered stage sequence driven by a
//! [`workflow::WorkflowInstance`]; transitions are validated, recorded,
//! and serialized per instance.
//!
//! ## Delegation
//!
//! Voting authority can be delegated through [`proxy::ProxyGraph`], a
//! per-meeting arena of grants with depth and cycle constraints.
//!
//! ## Voting
//!
//! A [`voting::VotingSession`] collects one ballot per eligible voter per
//! round and decides pass/fail under quorum and threshold rules.

pub mod core;
pub mod meeting;
pub mod proxy;
pub mod resolution;
pub mod voting;
pub mod workflow;

// Re-export commonly used types
pub use crate::core::{
    error::GovernanceError,
    ids::{GrantId, InstanceId, ItemId, MeetingId, OrgId, ResolutionId, SessionId, UserId},
    store::StoreError,
    window::EffectiveWindow,
};
pub use meeting::{
    entities::Meeting,
    repository::MeetingStore,
    roles::{resolve_voting_weight, MeetingRole, RoleCapabilities, RoleTag},
};
pub use proxy::{
    grant::{GrantStatus, ProxyGrant, ProxyScope, MAX_CHAIN_DEPTH},
    graph::{GrantRequest, ProxyGraph, ResolvedProxy},
    repository::ProxyStore,
};
pub use resolution::{
    entities::{OutcomeRecord, Resolution, ResolutionStatus},
    repository::ResolutionStore,
};
pub use voting::{
    ballot::{Ballot, BallotChoice},
    repository::SessionStore,
    session::{
        AnonymityLevel, ItemView, SessionConfig, SessionItem, SessionStatus, SessionView,
        VotingMethod, VotingSession,
    },
    tally::{tally_item, TallyOutcome},
};
pub use workflow::{
    instance::{WorkflowInstance, WorkflowStatus},
    repository::WorkflowStore,
    stage::{Stage, StageSequence},
    transition::StageTransition,
};
