//! The deletion coordinator (C5) — the heart of this crate.
//!
//! Every public method takes `&mut self` (the three coordinator-owned sets
//! plus the two projections are an exclusively-owned aggregate confined to
//! one logical thread) and returns the effects the runtime must execute;
//! it never performs I/O itself.

use std::collections::{HashMap, HashSet};

use tdc_types::{PartitionId, ReplicaDeletionState, ReplicaId, TopicToBeDeleted};

use crate::error::KernelError;
use crate::effects::{DeletionOutcome, Effect};
use crate::projection::{PartitionProjection, ReplicaProjection};
use crate::view::ClusterView;
use tdc_types::PartitionDeletionState;

/// The deletion coordinator.
///
/// All operations are no-ops when `enabled` is `false`, except [`Self::init`].
#[derive(Debug)]
pub struct DeletionCoordinator {
    enabled: bool,
    topics_to_be_deleted: HashMap<String, TopicToBeDeleted>,
    partitions_to_be_deleted: HashSet<PartitionId>,
    topics_ineligible_for_deletion: HashSet<String>,
    replicas: ReplicaProjection,
    partitions: PartitionProjection,
}

impl DeletionCoordinator {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            topics_to_be_deleted: HashMap::new(),
            partitions_to_be_deleted: HashSet::new(),
            topics_ineligible_for_deletion: HashSet::new(),
            replicas: ReplicaProjection::new(),
            partitions: PartitionProjection::new(),
        }
    }

    // ------------------------------------------------------------------
    // Read-only queries
    // ------------------------------------------------------------------

    pub fn is_topic_queued(&self, topic: &str) -> bool {
        self.topics_to_be_deleted.contains_key(topic)
    }

    pub fn is_partition_queued(&self, partition: &PartitionId) -> bool {
        self.partitions_to_be_deleted.contains(partition)
    }

    pub fn is_topic_ineligible(&self, topic: &str) -> bool {
        if !self.enabled {
            return true;
        }
        self.topics_ineligible_for_deletion.contains(topic)
    }

    pub fn is_topic_deletion_in_progress(&self, topic: &str) -> bool {
        self.replicas
            .any_replica_of_topic_in_state(topic, ReplicaDeletionState::ReplicaDeletionStarted)
    }

    pub fn is_topic_eligible(&self, topic: &str) -> bool {
        self.is_topic_queued(topic)
            && !self.is_topic_deletion_in_progress(topic)
            && !self.is_topic_ineligible(topic)
    }

    /// Observability helper: how many times `start_replica_deletion` has
    /// run for this topic. Never read by the deletion logic itself.
    pub fn retry_count(&self, topic: &str) -> Option<u32> {
        self.topics_to_be_deleted.get(topic).map(|t| t.retry_count)
    }

    pub fn queued_topic_count(&self) -> usize {
        self.topics_to_be_deleted.len()
    }

    // ------------------------------------------------------------------
    // Public contract
    // ------------------------------------------------------------------

    /// Called exactly once when the node becomes controller.
    pub fn init(
        &mut self,
        initial_queued: Vec<TopicToBeDeleted>,
        initial_ineligible: HashSet<String>,
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled {
            let effects = initial_queued
                .into_iter()
                .map(|t| Effect::PurgeStaleIntentMarker { topic: t.topic_name })
                .collect();
            return Ok(effects);
        }

        self.topics_to_be_deleted.clear();
        self.partitions_to_be_deleted.clear();
        self.topics_ineligible_for_deletion.clear();
        self.replicas.clear();
        self.partitions.clear();

        for topic in initial_queued {
            self.partitions_to_be_deleted
                .extend(view.partitions_for_topic(&topic.topic_name));
            self.topics_to_be_deleted
                .insert(topic.topic_name.clone(), topic);
        }

        self.topics_ineligible_for_deletion = initial_ineligible
            .into_iter()
            .filter(|t| self.topics_to_be_deleted.contains_key(t))
            .collect();

        tracing::info!(
            queued = self.topics_to_be_deleted.len(),
            ineligible = self.topics_ineligible_for_deletion.len(),
            "deletion coordinator initialized"
        );

        Ok(Vec::new())
    }

    /// Called when the intent-marker watch fires with new children.
    pub fn enqueue(
        &mut self,
        topics: Vec<TopicToBeDeleted>,
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled || topics.is_empty() {
            return Ok(Vec::new());
        }

        for topic in topics {
            tracing::info!(topic = %topic.topic_name, "topic enqueued for deletion");
            self.partitions_to_be_deleted
                .extend(view.partitions_for_topic(&topic.topic_name));
            self.topics_to_be_deleted
                .insert(topic.topic_name.clone(), topic);
        }

        self.resume(view)
    }

    /// Called on controller resignation. Discards all in-memory state;
    /// late-arriving responses are dropped by the event loop via the
    /// controller-epoch check, not by anything in this struct.
    pub fn reset(&mut self) {
        self.topics_to_be_deleted.clear();
        self.partitions_to_be_deleted.clear();
        self.topics_ineligible_for_deletion.clear();
        self.replicas.clear();
        self.partitions.clear();
        tracing::info!("deletion coordinator reset");
    }

    /// Called on events that might unblock deletion (broker startup,
    /// reassignment completion).
    pub fn resume_for_topics(
        &mut self,
        topics: &HashSet<String>,
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let unblocked: Vec<String> = topics
            .iter()
            .filter(|t| self.topics_to_be_deleted.contains_key(*t))
            .cloned()
            .collect();

        if unblocked.is_empty() {
            return Ok(Vec::new());
        }

        for topic in &unblocked {
            if self.topics_ineligible_for_deletion.remove(topic) {
                tracing::info!(topic = %topic, "topic no longer ineligible, resuming");
            }
        }

        self.resume(view)
    }

    /// Adds `topics ∩ names(topics_to_be_deleted)` to the ineligible set.
    /// Deliberately does not invoke `resume` (no progress is possible).
    pub fn mark_ineligible(&mut self, topics: &HashSet<String>) {
        if !self.enabled {
            return;
        }
        for topic in topics {
            if self.topics_to_be_deleted.contains_key(topic)
                && self.topics_ineligible_for_deletion.insert(topic.clone())
            {
                tracing::warn!(topic = %topic, "topic marked ineligible for deletion");
            }
        }
    }

    /// Called on stop-replica error responses or when a broker hosting an
    /// in-flight replica dies.
    pub fn fail_replica_deletion(
        &mut self,
        replicas: &[ReplicaId],
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let mut touched_topics = HashSet::new();
        for replica in replicas {
            let topic = replica.topic_name();
            if !self.is_topic_queued(topic) {
                continue;
            }
            // Only in-flight replicas can fail. A replica that already
            // completed (or was already torn down) has nothing to mark
            // ineligible, and `ReplicaDeletionSuccessful`/`NonExistentReplica`
            // have no legal transition to `ReplicaDeletionIneligible`.
            match self.replicas.get(replica) {
                Some(ReplicaDeletionState::ReplicaDeletionSuccessful)
                | Some(ReplicaDeletionState::NonExistentReplica) => continue,
                _ => {}
            }
            self.replicas
                .transition(replica, ReplicaDeletionState::ReplicaDeletionIneligible)?;
            tracing::warn!(replica = %replica, "replica deletion failed, marked ineligible");
            touched_topics.insert(topic.to_string());
        }

        self.mark_ineligible(&touched_topics);

        if touched_topics.is_empty() {
            return Ok(Vec::new());
        }
        self.resume(view)
    }

    /// Called on successful stop-replica responses.
    pub fn complete_replica_deletion(
        &mut self,
        replicas: &[ReplicaId],
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let mut any = false;
        for replica in replicas {
            if !self.is_topic_queued(replica.topic_name()) {
                continue;
            }
            self.replicas
                .transition(replica, ReplicaDeletionState::ReplicaDeletionSuccessful)?;
            tracing::debug!(replica = %replica, "replica deletion succeeded");
            any = true;
        }

        if !any {
            return Ok(Vec::new());
        }
        self.resume(view)
    }

    // ------------------------------------------------------------------
    // The resume algorithm
    // ------------------------------------------------------------------

    /// Invoked whenever state might have progressed: after enqueue, after a
    /// blocked topic is unblocked, and recursively after a topic tears down.
    pub fn resume(&mut self, view: &dyn ClusterView) -> Result<Vec<Effect>, KernelError> {
        if !self.enabled || self.topics_to_be_deleted.is_empty() {
            return Ok(Vec::new());
        }

        let topic = self.select_next_topic();
        let full_replicas = self.full_replica_set(&topic, view);

        let all_successful = !full_replicas.is_empty()
            && full_replicas.iter().all(|r| {
                self.replicas.get(r) == Some(ReplicaDeletionState::ReplicaDeletionSuccessful)
            });
        let any_started = full_replicas
            .iter()
            .any(|r| self.replicas.get(r) == Some(ReplicaDeletionState::ReplicaDeletionStarted));
        let any_ineligible = full_replicas.iter().any(|r| {
            self.replicas.get(r) == Some(ReplicaDeletionState::ReplicaDeletionIneligible)
        });

        let mut effects = Vec::new();

        if all_successful {
            effects.extend(self.complete_delete_topic(&topic, view)?);
            return Ok(effects);
        }

        if any_started {
            return Ok(effects);
        }

        if any_ineligible {
            for replica in &full_replicas {
                if self.replicas.get(replica) == Some(ReplicaDeletionState::ReplicaDeletionIneligible)
                {
                    self.replicas
                        .transition(replica, ReplicaDeletionState::OfflineReplica)?;
                }
            }
        }

        if self.is_topic_eligible(&topic) {
            effects.extend(self.on_topic_deletion(&[topic.clone()], view)?);
        } else {
            tracing::debug!(topic = %topic, "deletion currently blocked");
        }

        Ok(effects)
    }

    /// Selects the topic with the smallest `deletion_enqueue_time`,
    /// breaking ties by topic name.
    fn select_next_topic(&self) -> String {
        self.topics_to_be_deleted
            .values()
            .min_by(|a, b| {
                (a.deletion_enqueue_time, &a.topic_name).cmp(&(b.deletion_enqueue_time, &b.topic_name))
            })
            .map(|t| t.topic_name.clone())
            .expect("caller checked topics_to_be_deleted is non-empty")
    }

    fn full_replica_set(&self, topic: &str, view: &dyn ClusterView) -> Vec<ReplicaId> {
        self.partitions_to_be_deleted
            .iter()
            .filter(|p| p.topic_name == topic)
            .flat_map(|p| {
                view.replica_assignment(p)
                    .into_iter()
                    .map(move |broker_id| ReplicaId::new(p.clone(), broker_id))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // on_topic_deletion / on_partition_deletion / start_replica_deletion
    // ------------------------------------------------------------------

    fn on_topic_deletion(
        &mut self,
        topics: &[String],
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        let mut effects = Vec::new();

        let mut broker_ids: Vec<i32> = view
            .live_brokers()
            .union(&view.shutting_down_brokers())
            .copied()
            .collect();
        broker_ids.sort_unstable();

        for topic in topics {
            let partitions: Vec<PartitionId> = self
                .partitions_to_be_deleted
                .iter()
                .filter(|p| p.topic_name == *topic)
                .cloned()
                .collect();

            if !partitions.is_empty() {
                effects.push(Effect::SendUpdateMetadata {
                    partitions: partitions.clone(),
                    broker_ids: broker_ids.clone(),
                });
            }

            if let Some(t) = self.topics_to_be_deleted.get_mut(topic) {
                t.retry_count += 1;
            }

            effects.extend(self.on_partition_deletion(&partitions, view)?);
        }

        Ok(effects)
    }

    fn on_partition_deletion(
        &mut self,
        partitions: &[PartitionId],
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        let replicas: Vec<ReplicaId> = partitions
            .iter()
            .flat_map(|p| {
                view.replica_assignment(p)
                    .into_iter()
                    .map(move |broker_id| ReplicaId::new(p.clone(), broker_id))
            })
            .collect();

        self.start_replica_deletion(&replicas, view)
    }

    fn start_replica_deletion(
        &mut self,
        replicas: &[ReplicaId],
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        let mut by_topic: HashMap<String, Vec<ReplicaId>> = HashMap::new();
        for r in replicas {
            by_topic
                .entry(r.topic_name().to_string())
                .or_default()
                .push(r.clone());
        }

        let live = view.live_brokers();
        let mut effects = Vec::new();

        for (topic, group) in by_topic {
            let (alive, dead): (Vec<ReplicaId>, Vec<ReplicaId>) =
                group.into_iter().partition(|r| live.contains(&r.broker_id));

            let already_successful: HashSet<ReplicaId> = self
                .replicas
                .replicas_of_topic_in_state(&topic, ReplicaDeletionState::ReplicaDeletionSuccessful)
                .into_iter()
                .collect();

            let retry_set: Vec<ReplicaId> = alive
                .into_iter()
                .filter(|r| !already_successful.contains(r))
                .collect();

            for replica in &dead {
                self.replicas
                    .transition(replica, ReplicaDeletionState::ReplicaDeletionIneligible)?;
                tracing::warn!(replica = %replica, "replica host is dead, marked ineligible");
            }

            for replica in &retry_set {
                self.replicas
                    .transition(replica, ReplicaDeletionState::OfflineReplica)?;
            }
            for replica in &retry_set {
                self.replicas
                    .transition(replica, ReplicaDeletionState::ReplicaDeletionStarted)?;
                tracing::debug!(replica = %replica, "stop-replica(delete=true) dispatched");
                effects.push(Effect::SendStopReplica {
                    partition: replica.partition.clone(),
                    broker_id: replica.broker_id,
                    delete: true,
                });
            }

            if !dead.is_empty() {
                let mut touched = HashSet::new();
                touched.insert(topic);
                self.mark_ineligible(&touched);
            }
        }

        Ok(effects)
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    fn complete_delete_topic(
        &mut self,
        topic: &str,
        view: &dyn ClusterView,
    ) -> Result<Vec<Effect>, KernelError> {
        let mut effects = Vec::new();

        // Step 1: deregister the partition-modifications watch.
        effects.push(Effect::DeregisterPartitionModificationsWatch {
            topic: topic.to_string(),
        });

        // Step 2: Successful replicas -> NonExistentReplica.
        for replica in self
            .replicas
            .replicas_of_topic_in_state(topic, ReplicaDeletionState::ReplicaDeletionSuccessful)
        {
            self.replicas
                .transition(&replica, ReplicaDeletionState::NonExistentReplica)?;
            self.replicas.remove(&replica);
        }

        // Step 3: partitions -> OfflinePartition -> NonExistentPartition.
        let partitions: Vec<PartitionId> = self
            .partitions_to_be_deleted
            .iter()
            .filter(|p| p.topic_name == topic)
            .cloned()
            .collect();
        for partition in &partitions {
            self.partitions
                .transition(partition, PartitionDeletionState::OfflinePartition)?;
            self.partitions
                .transition(partition, PartitionDeletionState::NonExistentPartition)?;
            self.partitions.remove(partition);
        }

        // Step 4: remove the topic and its partitions from the queue.
        self.topics_to_be_deleted.remove(topic);
        self.partitions_to_be_deleted.retain(|p| p.topic_name != topic);

        // Step 5: durable-store deletes, intent marker last.
        effects.push(Effect::DeleteTopicMetadataPath {
            topic: topic.to_string(),
        });
        effects.push(Effect::DeleteTopicConfigPath {
            topic: topic.to_string(),
        });
        effects.push(Effect::DeleteDeletionIntentMarker {
            topic: topic.to_string(),
        });

        // Step 6: remove from the metadata cache.
        effects.push(Effect::RemoveFromMetadataCache {
            topic: topic.to_string(),
        });

        let outcome = if partitions.is_empty() {
            DeletionOutcome::Aborted
        } else {
            DeletionOutcome::Completed
        };
        tracing::info!(topic = %topic, outcome = ?outcome, "topic deletion torn down");

        // Step 7: advance to the next queued topic.
        effects.extend(self.resume(view)?);

        Ok(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;
    use tdc_types::EnqueueTime;

    /// A fixed, in-test cluster view: every partition in `assignments` has
    /// the given broker list; `live` controls which brokers are up.
    struct FixedView {
        assignments: StdHashMap<PartitionId, Vec<i32>>,
        topic_partitions: StdHashMap<String, Vec<PartitionId>>,
        live: HashSet<i32>,
    }

    impl ClusterView for FixedView {
        fn live_brokers(&self) -> HashSet<i32> {
            self.live.clone()
        }
        fn shutting_down_brokers(&self) -> HashSet<i32> {
            HashSet::new()
        }
        fn partitions_for_topic(&self, topic: &str) -> Vec<PartitionId> {
            self.topic_partitions.get(topic).cloned().unwrap_or_default()
        }
        fn replica_assignment(&self, partition: &PartitionId) -> Vec<i32> {
            self.assignments.get(partition).cloned().unwrap_or_default()
        }
    }

    fn topic_a_view(live: &[i32]) -> FixedView {
        let p0 = PartitionId::new("A", 0);
        let p1 = PartitionId::new("A", 1);
        let mut assignments = StdHashMap::new();
        assignments.insert(p0.clone(), vec![1, 2]);
        assignments.insert(p1.clone(), vec![1, 2]);
        let mut topic_partitions = StdHashMap::new();
        topic_partitions.insert("A".to_string(), vec![p0, p1]);
        FixedView {
            assignments,
            topic_partitions,
            live: live.iter().copied().collect(),
        }
    }

    fn enqueue_time(n: u64) -> EnqueueTime {
        EnqueueTime(n)
    }

    #[test]
    fn happy_path_dispatches_update_metadata_and_stop_replica() {
        let view = topic_a_view(&[1, 2]);
        let mut c = DeletionCoordinator::new(true);
        let effects = c
            .enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view)
            .unwrap();

        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::SendUpdateMetadata { .. })));
        let stop_replica_count = effects
            .iter()
            .filter(|e| matches!(e, Effect::SendStopReplica { delete: true, .. }))
            .count();
        assert_eq!(stop_replica_count, 4);
        assert!(c.is_topic_deletion_in_progress("A"));
    }

    #[test]
    fn completing_all_replicas_tears_down_topic() {
        let view = topic_a_view(&[1, 2]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view)
            .unwrap();

        let replicas = c.full_replica_set("A", &view);
        let effects = c.complete_replica_deletion(&replicas, &view).unwrap();

        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::DeleteDeletionIntentMarker { .. })));
        assert!(!c.is_topic_queued("A"));
    }

    #[test]
    fn failing_an_already_successful_replica_is_a_noop() {
        let view_down = topic_a_view(&[1]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view_down)
            .unwrap();

        let broker1_replicas: Vec<ReplicaId> = c
            .full_replica_set("A", &view_down)
            .into_iter()
            .filter(|r| r.broker_id == 1)
            .collect();
        c.complete_replica_deletion(&broker1_replicas, &view_down).unwrap();

        // Broker 1 just succeeded; it now dies too. Failing its (already
        // successful) replicas must not error.
        c.fail_replica_deletion(&broker1_replicas, &view_down).unwrap();
        assert!(c.is_topic_queued("A"));
    }

    #[test]
    fn broker_down_marks_topic_ineligible_but_retries_on_restart() {
        let view_down = topic_a_view(&[1]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view_down)
            .unwrap();

        assert!(c.is_topic_ineligible("A"));
        let broker1_replicas = c.full_replica_set("A", &view_down);
        let broker1_only: Vec<ReplicaId> = broker1_replicas
            .into_iter()
            .filter(|r| r.broker_id == 1)
            .collect();
        c.complete_replica_deletion(&broker1_only, &view_down).unwrap();
        assert!(c.is_topic_queued("A"));

        let view_restored = topic_a_view(&[1, 2]);
        let mut topics = HashSet::new();
        topics.insert("A".to_string());
        let effects = c.resume_for_topics(&topics, &view_restored).unwrap();
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::SendStopReplica { broker_id: 2, .. })));
    }

    #[test]
    fn fifo_across_two_topics() {
        let view = topic_a_view(&[1, 2]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view)
            .unwrap();
        c.enqueue(vec![TopicToBeDeleted::new("B", enqueue_time(2))], &view)
            .unwrap();

        assert!(c.is_topic_deletion_in_progress("A"));
        assert!(!c.is_topic_deletion_in_progress("B"));
        assert!(c.is_topic_queued("B"));
    }

    #[test]
    fn reset_clears_everything() {
        let view = topic_a_view(&[1, 2]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view)
            .unwrap();
        c.reset();
        assert_eq!(c.queued_topic_count(), 0);
        assert!(!c.is_topic_deletion_in_progress("A"));
    }

    #[test]
    fn disabled_coordinator_purges_stale_markers_on_init() {
        let view = topic_a_view(&[1, 2]);
        let mut c = DeletionCoordinator::new(false);
        let effects = c
            .init(
                vec![TopicToBeDeleted::new("X", enqueue_time(1))],
                HashSet::new(),
                &view,
            )
            .unwrap();
        assert_eq!(
            effects,
            vec![Effect::PurgeStaleIntentMarker {
                topic: "X".to_string()
            }]
        );
        assert!(!c.is_topic_queued("X"));
    }

    #[test]
    fn mark_ineligible_does_not_trigger_resume() {
        let view = topic_a_view(&[]);
        let mut c = DeletionCoordinator::new(true);
        c.enqueue(vec![TopicToBeDeleted::new("A", enqueue_time(1))], &view)
            .unwrap();
        let mut topics = HashSet::new();
        topics.insert("A".to_string());
        // No panic / no effects surfaced through this call by construction
        // (mark_ineligible has no return value).
        c.mark_ineligible(&topics);
        assert!(c.is_topic_ineligible("A"));
    }

    #[test]
    fn enqueue_is_idempotent() {
        let view = topic_a_view(&[1, 2]);
        let mut c1 = DeletionCoordinator::new(true);
        let mut c2 = DeletionCoordinator::new(true);

        let t = TopicToBeDeleted::new("A", enqueue_time(1));
        c1.enqueue(vec![t.clone()], &view).unwrap();
        c1.enqueue(vec![t.clone()], &view).unwrap();

        c2.enqueue(vec![t], &view).unwrap();

        assert_eq!(c1.queued_topic_count(), c2.queued_topic_count());
    }
}
