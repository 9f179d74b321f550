//! Concurrency discipline: single-writer aggregates, atomic ballot
//! uniqueness, parallelism across voters.

mod common;

use common::{t, Engine};
use futures::future::join_all;
use plenum_domain::{
    Ballot, BallotChoice, GovernanceError, ProxyStore, SessionConfig, SessionStore, UserId,
    WorkflowStore,
};
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_advances_from_same_index_one_wins() {
    let engine = Engine::new();
    engine.add_voter("m-1", "chair");
    let instance_id = engine.meeting_in_voting_stage("m-1", 3).await;

    // Two drivers hold the same snapshot of the instance.
    let mut copy_a = engine.workflows.load(&instance_id).await.unwrap();
    let mut copy_b = engine.workflows.load(&instance_id).await.unwrap();
    assert_eq!(copy_a.current_stage_index, copy_b.current_stage_index);

    let chair = UserId::new("chair");
    copy_a.advance(&chair, t(11)).unwrap();
    copy_b.advance(&chair, t(11)).unwrap();

    // The compare-and-swap write admits exactly one of them.
    engine.workflows.put(&copy_a).await.unwrap();
    let err: GovernanceError = engine.workflows.put(&copy_b).await.unwrap_err().into();
    assert!(matches!(err, GovernanceError::StaleState { .. }));

    let current = engine.workflows.load(&instance_id).await.unwrap();
    assert_eq!(current.current_stage_index, copy_a.current_stage_index);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_casts_leave_one_ballot() {
    let engine = Engine::new();
    engine.add_voter("m-1", "chair");
    engine.add_voter("m-1", "alice");
    engine.meeting_in_voting_stage("m-1", 3).await;
    let (_, session) = engine
        .session_over_resolution("m-1", "alice", SessionConfig::default())
        .await;

    let sessions = engine.sessions.clone();
    let item = session.items[0].id.clone();

    // Eight simultaneous attempts to cast the same (item, voter, round).
    let attempts = (0..8).map(|_| {
        let sessions = sessions.clone();
        let session_id = session.id.clone();
        let item = item.clone();
        tokio::spawn(async move {
            let ballot = Ballot::new("alice", BallotChoice::For, 1.0, 1, t(11));
            sessions.append_ballot(&session_id, &item, ballot).await
        })
    });
    let results: Vec<_> = join_all(attempts).await;

    let mut accepted = 0;
    let mut duplicates = 0;
    for result in results {
        match result.unwrap().unwrap() {
            Ok(()) => accepted += 1,
            Err(GovernanceError::DuplicateVote { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected rejection: {other}"),
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 7);

    let stored = engine.sessions.load(&session.id).await.unwrap();
    assert_eq!(stored.item(&item).unwrap().ballots().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_voters_cast_fully_in_parallel() {
    let engine = Arc::new(Engine::new());
    let voters: Vec<String> = (1..=16).map(|i| format!("v{i}")).collect();
    engine.add_voter("m-1", "chair");
    for v in &voters {
        engine.add_voter("m-1", v);
    }
    engine.meeting_in_voting_stage("m-1", 17).await;
    let (_, session) = engine
        .session_over_resolution("m-1", "v1", SessionConfig::default())
        .await;

    let casts = voters.iter().map(|voter| {
        let engine = engine.clone();
        let input = plenum_application::CastBallotInput {
            session: session.id.clone(),
            item: session.items[0].id.clone(),
            voter: UserId::new(voter.clone()),
            choice: BallotChoice::For,
            round: 1,
        };
        tokio::spawn(async move { engine.cast.execute(input).await })
    });

    for result in join_all(casts).await {
        result.unwrap().unwrap();
    }

    let closed = engine.close.execute(&session.id).await.unwrap();
    assert_eq!(closed[0].outcome.votes_for, 16.0);
    assert_eq!(closed[0].outcome.voters_participated, 16);
}

#[tokio::test]
async fn test_stale_proxy_write_is_rejected() {
    let engine = Engine::new();
    engine.add_voter("m-1", "alice");
    engine.add_voter("m-1", "bob");
    engine.add_voter("m-1", "carol");

    let meeting = plenum_domain::MeetingId::new("m-1");
    let graph_a = engine.proxies.load_or_default(&meeting).await.unwrap();
    let graph_b = engine.proxies.load_or_default(&meeting).await.unwrap();

    // Writer A lands first; writer B's snapshot is stale and must not
    // produce a second active grant for the same grantor.
    let mut a = graph_a;
    a.grant(
        plenum_domain::GrantRequest::new("alice", "bob", plenum_domain::EffectiveWindow::from(t(9))),
        t(9),
    )
    .unwrap();
    engine.proxies.put(&a).await.unwrap();

    let mut b = graph_b;
    b.grant(
        plenum_domain::GrantRequest::new("alice", "carol", plenum_domain::EffectiveWindow::from(t(9))),
        t(9),
    )
    .unwrap();
    let err = engine.proxies.put(&b).await.unwrap_err();
    assert!(matches!(
        err,
        plenum_domain::StoreError::VersionConflict { .. }
    ));

    let current = engine.proxies.load_or_default(&meeting).await.unwrap();
    let active = current.active_grant_of(&UserId::new("alice"), t(10)).unwrap();
    assert_eq!(active.holder, UserId::new("bob"));
}
