//! Voting sessions, ballots, and tallying.

pub mod ballot;
pub mod repository;
pub mod session;
pub mod tally;

pub use ballot::{Ballot, BallotChoice};
pub use repository::SessionStore;
pub use session::{
    AnonymityLevel, ItemView, SessionConfig, SessionItem, SessionStatus, SessionView,
    VotingMethod, VotingSession,
};
pub use tally::{tally_item, TallyOutcome};
