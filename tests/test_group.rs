//! Integration tests for `BulkGroup`
//!
//! Fan-out, per-agent outcome accounting, failure isolation and cancellation.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{BrokenPush, Behavior, FakePlatform, fast_options, identity, init_logging};
use kodegen_finesse_agent::{
    AgentError, BulkGroup, GroupReport, MemoryPushSource, Method, OperationOutcome, OutcomeKind,
    PresenceState, SessionOptions, TransitionOptions,
};
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

type Group = BulkGroup<Arc<FakePlatform>, MemoryPushSource>;

fn names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("agent{i:03}")).collect()
}

async fn populated_group(count: usize, state: PresenceState) -> (Group, Arc<FakePlatform>) {
    init_logging();
    let push = MemoryPushSource::new();
    let platform = FakePlatform::new(push.clone());
    let names = names(count);
    for name in &names {
        platform.add_agent(name, state);
    }
    let group = Group::new(fast_options()).unwrap();
    let outcomes = group
        .add_bulk(
            names.iter().map(|n| identity(n)).collect(),
            Arc::clone(&platform),
            push,
        )
        .await;
    assert_eq!(outcomes.len(), count);
    assert!(outcomes.iter().all(OperationOutcome::is_success));
    (group, platform)
}

fn agents_of(outcomes: &[OperationOutcome]) -> HashSet<String> {
    outcomes.iter().map(|o| o.agent.clone()).collect()
}

#[tokio::test]
async fn test_add_bulk_adds_every_agent() {
    let (group, platform) = populated_group(25, PresenceState::Logout).await;
    assert_eq!(group.len(), 25);
    assert_eq!(platform.count(Method::Get), 25);
    assert!(
        group
            .statuses()
            .iter()
            .all(|(_, state)| *state == PresenceState::Logout)
    );
}

#[tokio::test]
async fn test_add_bulk_reports_each_failed_identity() {
    init_logging();
    let push = MemoryPushSource::new();
    let platform = FakePlatform::new(push.clone());
    platform.add_agent("known1", PresenceState::Logout);
    platform.add_agent("known2", PresenceState::Logout);
    let group = Group::new(fast_options()).unwrap();

    let outcomes = group
        .add_bulk(
            vec![identity("known1"), identity("missing"), identity("known2")],
            Arc::clone(&platform),
            push,
        )
        .await;

    assert_eq!(outcomes.len(), 3);
    let report = GroupReport::from_outcomes(&outcomes);
    assert_eq!(report.succeeded, 2);
    assert_eq!(
        report.failures.get(&OutcomeKind::IdentityResolution),
        Some(&1)
    );
    assert_eq!(group.len(), 2);
}

#[tokio::test]
async fn test_add_with_broken_push_leaves_group_unchanged() {
    init_logging();
    let platform = FakePlatform::new(MemoryPushSource::new());
    platform.add_agent("agent01", PresenceState::Logout);
    let group: BulkGroup<Arc<FakePlatform>, BrokenPush> =
        BulkGroup::new(fast_options()).unwrap();

    let err = assert_err!(
        group
            .add(identity("agent01"), Arc::clone(&platform), BrokenPush)
            .await
    );
    assert!(matches!(err, AgentError::Subscription(_)));
    assert!(group.is_empty());
}

#[tokio::test]
async fn test_every_agent_gets_exactly_one_outcome() {
    let (group, platform) = populated_group(40, PresenceState::Logout).await;

    let outcomes = group.ready(TransitionOptions::forced()).await;
    assert_eq!(outcomes.len(), 40);
    assert_eq!(agents_of(&outcomes).len(), 40);
    assert!(outcomes.iter().all(OperationOutcome::is_success));
    assert!(
        group
            .statuses()
            .iter()
            .all(|(_, state)| *state == PresenceState::Ready)
    );
    // login + ready per agent
    assert_eq!(platform.count(Method::Put), 80);
}

#[tokio::test]
async fn test_failures_stay_with_their_agents() {
    let (group, platform) = populated_group(12, PresenceState::Ready).await;
    let broken: HashSet<String> = names(12).into_iter().step_by(3).collect();
    for name in &broken {
        platform.set_behavior(name, Behavior::Unreachable);
    }

    let outcomes = group.not_ready(TransitionOptions::default()).await;
    assert_eq!(outcomes.len(), 12);

    let failed: HashSet<String> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| {
            assert_eq!(o.kind(), OutcomeKind::RequestFailed);
            o.agent.clone()
        })
        .collect();
    assert_eq!(failed, broken);

    for session in group.sessions() {
        let expected = if broken.contains(session.name()) {
            PresenceState::Ready
        } else {
            PresenceState::NotReady
        };
        assert_eq!(session.last_state(), expected, "{}", session.name());
    }
}

#[tokio::test]
async fn test_mixed_failures_are_counted_by_kind() {
    let (group, platform) = populated_group(4, PresenceState::Ready).await;
    platform.set_behavior("agent000", Behavior::Status(500));
    platform.set_behavior("agent001", Behavior::Silent);
    platform.set_behavior("agent002", Behavior::Reject("CF_INVALID_AGENT_STATE".into()));

    let outcomes = group.not_ready(TransitionOptions::default()).await;
    let report = GroupReport::from_outcomes(&outcomes);
    assert_eq!(report.total, 4);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failures.get(&OutcomeKind::ResponseError), Some(&1));
    assert_eq!(report.failures.get(&OutcomeKind::NotificationTimeout), Some(&1));
    assert_eq!(report.failures.get(&OutcomeKind::PayloadUnparseable), Some(&1));
    assert_eq!(report.to_string(), "from 4 agents success requests is 1");
}

#[tokio::test]
async fn test_wrong_state_agents_are_refused_individually() {
    let (group, platform) = populated_group(6, PresenceState::Logout).await;
    for name in ["agent001", "agent004"] {
        platform.set_state(name, PresenceState::NotReady);
    }
    for session in group.sessions() {
        assert_ok!(session.refresh_status().await);
    }

    let outcomes = group.login(TransitionOptions::default()).await;
    let refused: HashSet<String> = outcomes
        .iter()
        .filter(|o| o.kind() == OutcomeKind::WrongState)
        .map(|o| o.agent.clone())
        .collect();
    assert_eq!(
        refused,
        HashSet::from(["agent001".to_string(), "agent004".to_string()])
    );
    assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);
}

#[tokio::test]
async fn test_empty_group_yields_no_outcomes() {
    init_logging();
    let group = Group::new(fast_options()).unwrap();
    assert!(group.is_empty());
    assert!(group.login(TransitionOptions::default()).await.is_empty());
    assert!(group.logout(TransitionOptions::forced()).await.is_empty());
}

#[tokio::test]
async fn test_unknown_operation_name() {
    let (group, platform) = populated_group(3, PresenceState::Ready).await;

    let outcomes = group.run_named("TALKING", TransitionOptions::default()).await;
    assert_eq!(outcomes.len(), 3);
    assert!(
        outcomes
            .iter()
            .all(|o| o.kind() == OutcomeKind::UnknownCommand)
    );
    assert_eq!(platform.count(Method::Put), 0);

    let outcomes = group.run_named("NOT_READY", TransitionOptions::default()).await;
    assert!(outcomes.iter().all(OperationOutcome::is_success));
}

#[tokio::test]
async fn test_cancel_keeps_returned_outcomes_and_stops_new_work() {
    let (group, platform) = populated_group(5, PresenceState::Logout).await;

    let before = group.login(TransitionOptions::default()).await;
    let snapshot: Vec<(String, OutcomeKind)> =
        before.iter().map(|o| (o.agent.clone(), o.kind())).collect();

    group.cancel();
    group.cancel();
    assert!(group.is_cancelled());

    let after: Vec<(String, OutcomeKind)> =
        before.iter().map(|o| (o.agent.clone(), o.kind())).collect();
    assert_eq!(snapshot, after);
    assert!(before.iter().all(OperationOutcome::is_success));

    let puts = platform.count(Method::Put);
    let outcomes = group.ready(TransitionOptions::default()).await;
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(|o| o.kind() == OutcomeKind::Cancelled));
    assert_eq!(platform.count(Method::Put), puts);

    let err = assert_err!(
        group
            .add(identity("late"), Arc::clone(&platform), MemoryPushSource::new())
            .await
    );
    assert!(matches!(err, AgentError::Cancelled(_)));
}

#[tokio::test]
async fn test_cancel_during_an_operation_ends_pending_waits_only() {
    init_logging();
    let push = MemoryPushSource::new();
    let platform = FakePlatform::new(push.clone());
    let names = names(4);
    for name in &names {
        platform.add_agent(name, PresenceState::Ready);
    }
    let options = SessionOptions::builder()
        .confirmation_timeout(Duration::from_secs(10))
        .delivery_timeout(Duration::from_millis(100))
        .subscribe_settle(Duration::ZERO)
        .build();
    let group = Group::new(options).unwrap();
    let added = group
        .add_bulk(
            names.iter().map(|n| identity(n)).collect(),
            Arc::clone(&platform),
            push.clone(),
        )
        .await;
    assert!(added.iter().all(OperationOutcome::is_success));

    let silent: HashSet<String> = names[..2].iter().cloned().collect();
    for name in &silent {
        platform.set_behavior(name, Behavior::Silent);
    }

    let started = Instant::now();
    let (outcomes, ()) = tokio::join!(group.not_ready(TransitionOptions::default()), async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        group.cancel();
    });
    assert!(started.elapsed() < Duration::from_secs(2));

    assert_eq!(outcomes.len(), 4);
    assert_eq!(agents_of(&outcomes).len(), 4);
    for outcome in &outcomes {
        if silent.contains(&outcome.agent) {
            assert_eq!(outcome.kind(), OutcomeKind::Cancelled, "{}", outcome.agent);
        } else {
            assert!(outcome.is_success(), "{}", outcome.agent);
            assert_eq!(platform.state_of(&outcome.agent), PresenceState::NotReady);
        }
    }
    assert_eq!(platform.count(Method::Put), 4);

    let ids: Vec<String> = names.iter().map(|n| platform.id_of(n)).collect();
    let deadline = Instant::now() + Duration::from_secs(2);
    while ids.iter().any(|id| push.subscriber_count(id) > 0) {
        assert!(Instant::now() < deadline, "push listeners still subscribed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
