//! Property-based tests for invariants that must hold after any sequence
//! of coordinator operations: the ineligible set stays a subset of the
//! queued set, and at most one topic is ever mid-deletion at a time.
//!
//! Teardown ordering, failover reconstruction, and cross-topic ordering
//! are exercised as literal scenario tests in `tdc/tests/scenarios.rs`
//! instead, since those describe specific sequences rather than properties
//! that hold over arbitrary traces.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use tdc_kernel::{ClusterView, DeletionCoordinator};
use tdc_types::{EnqueueTime, PartitionId, TopicToBeDeleted};

const TOPICS: [&str; 3] = ["A", "B", "C"];
const BROKERS: [i32; 2] = [1, 2];

struct FixedView;

impl ClusterView for FixedView {
    fn live_brokers(&self) -> HashSet<i32> {
        BROKERS.iter().copied().collect()
    }
    fn shutting_down_brokers(&self) -> HashSet<i32> {
        HashSet::new()
    }
    fn partitions_for_topic(&self, topic: &str) -> Vec<PartitionId> {
        vec![PartitionId::new(topic, 0)]
    }
    fn replica_assignment(&self, _partition: &PartitionId) -> Vec<i32> {
        BROKERS.to_vec()
    }
}

#[derive(Debug, Clone)]
enum Action {
    Enqueue(usize, u64),
    CompleteReplicas(usize),
    FailReplicas(usize),
    ResumeFor(usize),
    MarkIneligible(usize),
    Reset,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0..TOPICS.len(), 0u64..10).prop_map(|(i, t)| Action::Enqueue(i, t)),
        (0..TOPICS.len()).prop_map(Action::CompleteReplicas),
        (0..TOPICS.len()).prop_map(Action::FailReplicas),
        (0..TOPICS.len()).prop_map(Action::ResumeFor),
        (0..TOPICS.len()).prop_map(Action::MarkIneligible),
        Just(Action::Reset),
    ]
}

fn apply(coordinator: &mut DeletionCoordinator, view: &FixedView, action: &Action) {
    match action {
        Action::Enqueue(i, t) => {
            let topic = TOPICS[*i];
            let _ = coordinator.enqueue(vec![TopicToBeDeleted::new(topic, EnqueueTime(*t))], view);
        }
        Action::CompleteReplicas(i) => {
            let topic = TOPICS[*i];
            let replicas: Vec<_> = BROKERS
                .iter()
                .map(|b| tdc_types::ReplicaId::new(PartitionId::new(topic, 0), *b))
                .collect();
            let _ = coordinator.complete_replica_deletion(&replicas, view);
        }
        Action::FailReplicas(i) => {
            let topic = TOPICS[*i];
            let replicas: Vec<_> = BROKERS
                .iter()
                .map(|b| tdc_types::ReplicaId::new(PartitionId::new(topic, 0), *b))
                .collect();
            let _ = coordinator.fail_replica_deletion(&replicas, view);
        }
        Action::ResumeFor(i) => {
            let mut set = HashSet::new();
            set.insert(TOPICS[*i].to_string());
            let _ = coordinator.resume_for_topics(&set, view);
        }
        Action::MarkIneligible(i) => {
            let mut set = HashSet::new();
            set.insert(TOPICS[*i].to_string());
            coordinator.mark_ineligible(&set);
        }
        Action::Reset => coordinator.reset(),
    }
}

proptest! {
    /// After every action in an arbitrary trace: the ineligible set stays a
    /// subset of the queued set, and at most one topic is ever mid-deletion.
    #[test]
    fn invariants_hold_after_any_trace(actions in prop::collection::vec(action_strategy(), 0..40)) {
        let view = FixedView;
        let mut coordinator = DeletionCoordinator::new(true);

        for action in &actions {
            apply(&mut coordinator, &view, action);

            for topic in TOPICS {
                if coordinator.is_topic_ineligible(topic) {
                    prop_assert!(coordinator.is_topic_queued(topic));
                }
            }

            let in_progress_count = TOPICS
                .iter()
                .filter(|t| coordinator.is_topic_deletion_in_progress(t))
                .count();
            prop_assert!(in_progress_count <= 1);
        }
    }
}

/// Enqueuing the same topic twice is equivalent to enqueuing it once.
#[test]
fn enqueue_twice_matches_enqueue_once() {
    let view = FixedView;
    let topic = TopicToBeDeleted::new("A", EnqueueTime(1));

    let mut once = DeletionCoordinator::new(true);
    once.enqueue(vec![topic.clone()], &view).unwrap();

    let mut twice = DeletionCoordinator::new(true);
    twice.enqueue(vec![topic.clone()], &view).unwrap();
    twice.enqueue(vec![topic], &view).unwrap();

    assert_eq!(once.queued_topic_count(), twice.queued_topic_count());
    assert_eq!(
        once.is_topic_deletion_in_progress("A"),
        twice.is_topic_deletion_in_progress("A")
    );
}
