//! Application layer for plenum
//!
//! This crate contains use cases and port definitions. It depends only on
//! the domain layer; store and sink adapters live in infrastructure.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    audit::{AuditEvent, AuditSink, NoAudit},
    clock::Clock,
    directory::MembershipDirectory,
};
pub use use_cases::advance_stage::AdvanceStageUseCase;
pub use use_cases::cast_ballot::{CastBallotInput, CastBallotUseCase};
pub use use_cases::close_session::{
    CancelVotingSessionUseCase, ClosedItem, CloseVotingSessionUseCase, SessionResultsUseCase,
};
pub use use_cases::open_meeting::{OpenMeetingInput, OpenMeetingUseCase};
pub use use_cases::open_session::{OpenSessionInput, OpenVotingSessionUseCase, SessionItemSpec};
pub use use_cases::proxy::{
    ExpireProxiesUseCase, GrantProxyInput, GrantProxyUseCase, RevokeProxyUseCase,
};
pub use use_cases::record_quorum::RecordQuorumUseCase;
pub use use_cases::resolutions::{
    GetResolutionOutcomeUseCase, ProposeResolutionInput, ProposeResolutionUseCase,
};
