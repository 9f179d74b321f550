//! Close-time tally computation.
//!
//! Pass percentage is computed over for + against only; abstentions reduce
//! neither side. The threshold comparison is inclusive: an item sitting
//! exactly at the threshold passes.

use super::ballot::BallotChoice;
use super::session::SessionItem;
use crate::core::error::GovernanceError;
use serde::{Deserialize, Serialize};

/// The decided outcome of one session item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyOutcome {
    pub votes_for: f64,
    pub votes_against: f64,
    pub votes_abstain: f64,
    /// Voters represented by participating ballots (proxied grantors
    /// included, recorded absences excluded).
    pub voters_participated: u32,
    pub quorum_achieved: bool,
    /// For-percentage of for + against; 0 when nobody voted either way.
    pub pass_percentage: f64,
    pub effective_threshold: f64,
    pub passed: bool,
}

/// Tally one item against the session's quorum and threshold rules.
///
/// `eligible_voter_count` is the eligibility snapshot taken at session
/// open; a participation count above it means ballots double-counted
/// somewhere and the whole close must abort.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use plenum_domain::core::ids::ItemId;
/// use plenum_domain::voting::ballot::{Ballot, BallotChoice};
/// use plenum_domain::voting::session::SessionItem;
/// use plenum_domain::voting::tally::tally_item;
///
/// let at = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
/// let mut item = SessionItem::new(ItemId::new("i-1"), "r-1");
/// item.push_ballot(Ballot::new("alice", BallotChoice::For, 1.0, 1, at)).unwrap();
/// item.push_ballot(Ballot::new("bob", BallotChoice::Against, 1.0, 1, at)).unwrap();
///
/// // Threshold 50.0, split 1.0 / 1.0: exactly at the threshold, passes.
/// let outcome = tally_item(&item, 2, 10, 50.0).unwrap();
/// assert_eq!(outcome.pass_percentage, 50.0);
/// assert!(outcome.passed);
/// ```
pub fn tally_item(
    item: &SessionItem,
    required_quorum: u32,
    eligible_voter_count: u32,
    default_threshold: f64,
) -> Result<TallyOutcome, GovernanceError> {
    let mut votes_for = 0.0;
    let mut votes_against = 0.0;
    let mut votes_abstain = 0.0;
    let mut voters_participated: u32 = 0;

    for ballot in item.ballots() {
        match ballot.choice {
            BallotChoice::For => votes_for += ballot.weight,
            BallotChoice::Against => votes_against += ballot.weight,
            BallotChoice::Abstain => votes_abstain += ballot.weight,
            BallotChoice::Absent => {}
        }
        if ballot.choice.participates() {
            voters_participated += ballot.represented_count();
        }
    }

    if voters_participated > eligible_voter_count {
        return Err(GovernanceError::TallyError {
            item: item.id.clone(),
            participating: voters_participated,
            eligible: eligible_voter_count,
        });
    }

    let quorum_achieved = voters_participated >= required_quorum;
    let decided_weight = votes_for + votes_against;
    let pass_percentage = if decided_weight > 0.0 {
        votes_for / decided_weight * 100.0
    } else {
        0.0
    };
    let effective_threshold = item.threshold_override.unwrap_or(default_threshold);
    let passed = quorum_achieved && decided_weight > 0.0 && pass_percentage >= effective_threshold;

    Ok(TallyOutcome {
        votes_for,
        votes_against,
        votes_abstain,
        voters_participated,
        quorum_achieved,
        pass_percentage,
        effective_threshold,
        passed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{ItemId, UserId};
    use crate::voting::ballot::Ballot;
    use chrono::{DateTime, TimeZone, Utc};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap()
    }

    fn item_with(choices: &[(&str, BallotChoice, f64)]) -> SessionItem {
        let mut item = SessionItem::new(ItemId::new("i-1"), "r-1");
        for (voter, choice, weight) in choices {
            item.push_ballot(Ballot::new(*voter, *choice, *weight, 1, at()))
                .unwrap();
        }
        item
    }

    #[test]
    fn test_weighted_sums() {
        let item = item_with(&[
            ("a", BallotChoice::For, 2.0),
            ("b", BallotChoice::Against, 1.0),
            ("c", BallotChoice::Abstain, 1.0),
        ]);
        let outcome = tally_item(&item, 1, 10, 50.0).unwrap();
        assert_eq!(outcome.votes_for, 2.0);
        assert_eq!(outcome.votes_against, 1.0);
        assert_eq!(outcome.votes_abstain, 1.0);
        assert_eq!(outcome.voters_participated, 3);
    }

    #[test]
    fn test_abstentions_excluded_from_denominator() {
        // 5 for, 5 against, 2 abstain: 50% exactly, inclusive pass.
        let item = item_with(&[
            ("a", BallotChoice::For, 5.0),
            ("b", BallotChoice::Against, 5.0),
            ("c", BallotChoice::Abstain, 2.0),
        ]);
        let outcome = tally_item(&item, 1, 20, 50.0).unwrap();
        assert_eq!(outcome.pass_percentage, 50.0);
        assert!(outcome.passed);
    }

    #[test]
    fn test_just_below_threshold_fails() {
        let item = item_with(&[
            ("a", BallotChoice::For, 49.0),
            ("b", BallotChoice::Against, 51.0),
        ]);
        let outcome = tally_item(&item, 1, 200, 50.0).unwrap();
        assert!(!outcome.passed);
    }

    #[test]
    fn test_quorum_failure_rejects_regardless_of_split() {
        let item = item_with(&[
            ("a", BallotChoice::For, 4.0),
            ("b", BallotChoice::For, 1.0),
        ]);
        // Two participants against a required quorum of five.
        let outcome = tally_item(&item, 5, 10, 50.0).unwrap();
        assert!(!outcome.quorum_achieved);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_proxy_ballot_counts_represented_voters() {
        let mut item = SessionItem::new(ItemId::new("i-1"), "r-1");
        item.push_ballot(
            Ballot::new("bob", BallotChoice::For, 3.0, 1, at())
                .on_behalf_of(vec![UserId::new("alice"), UserId::new("dan")]),
        )
        .unwrap();
        item.push_ballot(Ballot::new("erin", BallotChoice::Against, 1.0, 1, at()))
            .unwrap();

        let outcome = tally_item(&item, 4, 10, 50.0).unwrap();
        // One row represents three voters; quorum of four is met.
        assert_eq!(outcome.voters_participated, 4);
        assert!(outcome.quorum_achieved);
    }

    #[test]
    fn test_absent_ballots_do_not_participate() {
        let item = item_with(&[
            ("a", BallotChoice::For, 1.0),
            ("b", BallotChoice::Absent, 1.0),
        ]);
        let outcome = tally_item(&item, 2, 10, 50.0).unwrap();
        assert_eq!(outcome.voters_participated, 1);
        assert!(!outcome.quorum_achieved);
    }

    #[test]
    fn test_double_count_guard() {
        let mut item = SessionItem::new(ItemId::new("i-1"), "r-1");
        item.push_ballot(
            Ballot::new("bob", BallotChoice::For, 5.0, 1, at()).on_behalf_of(vec![
                UserId::new("a"),
                UserId::new("b"),
                UserId::new("c"),
                UserId::new("d"),
            ]),
        )
        .unwrap();

        let err = tally_item(&item, 1, 3, 50.0).unwrap_err();
        assert_eq!(
            err,
            GovernanceError::TallyError {
                item: ItemId::new("i-1"),
                participating: 5,
                eligible: 3
            }
        );
    }

    #[test]
    fn test_no_decided_weight_never_passes() {
        let item = item_with(&[("a", BallotChoice::Abstain, 1.0)]);
        let outcome = tally_item(&item, 1, 10, 0.0).unwrap();
        assert_eq!(outcome.pass_percentage, 0.0);
        assert!(!outcome.passed);
    }

    #[test]
    fn test_threshold_override() {
        let mut item = item_with(&[
            ("a", BallotChoice::For, 6.0),
            ("b", BallotChoice::Against, 4.0),
        ]);
        item.threshold_override = Some(66.7);
        let outcome = tally_item(&item, 1, 10, 50.0).unwrap();
        assert_eq!(outcome.effective_threshold, 66.7);
        assert!(!outcome.passed);
    }
}
