//! The controller event loop.
//!
//! Owns the coordinator, the cluster view, and the two external
//! collaborators (C3, C4). Every event is handled to completion before the
//! next is pulled off the channel: the coordinator never holds a mutex,
//! never blocks on I/O, and never calls `resume` from any thread other
//! than the event thread. All four upstream producers (watch thread,
//! broker dispatcher, failure detector, timers) are expected to feed the
//! same channel, so this loop only ever needs one `recv().await`, never a
//! `select!` across sources.

use std::collections::HashSet;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tdc_kernel::{DeletionCoordinator, Effect};
use tdc_types::{ReplicaId, TopicToBeDeleted};

use crate::cluster_view::InMemoryClusterView;
use crate::dispatch::BrokerDispatcher;
use crate::error::RuntimeError;
use crate::event::{ControllerEvent, StopReplicaResult};
use crate::store::MetadataStore;

pub struct ControllerEventLoop<S, D>
where
    S: MetadataStore,
    D: BrokerDispatcher,
{
    coordinator: DeletionCoordinator,
    cluster: InMemoryClusterView,
    store: S,
    dispatcher: D,
    controller_epoch: u64,
}

impl<S, D> ControllerEventLoop<S, D>
where
    S: MetadataStore,
    D: BrokerDispatcher,
{
    pub fn new(enabled: bool, controller_epoch: u64, store: S, dispatcher: D) -> Self {
        Self {
            coordinator: DeletionCoordinator::new(enabled),
            cluster: InMemoryClusterView::new(),
            store,
            dispatcher,
            controller_epoch,
        }
    }

    /// Mutable access to the cluster view, for test harnesses and the
    /// controller's own startup code to register topic/broker state
    /// before the first event arrives.
    pub fn cluster_view_mut(&mut self) -> &mut InMemoryClusterView {
        &mut self.cluster
    }

    pub fn coordinator(&self) -> &DeletionCoordinator {
        &self.coordinator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Called exactly once when this node becomes controller.
    pub fn init(
        &mut self,
        initial_queued: Vec<TopicToBeDeleted>,
        initial_ineligible: HashSet<String>,
    ) -> Result<(), RuntimeError> {
        let effects = self
            .coordinator
            .init(initial_queued, initial_ineligible, &self.cluster)?;
        self.apply_effects(effects)
    }

    /// Explicitly re-runs the `resume` algorithm. Controller startup calls
    /// this once after `init` to kick off any deletion that was already
    /// queued before this node became controller; elsewhere `resume` is
    /// invoked implicitly by the coordinator's own operations.
    pub fn resume(&mut self) -> Result<(), RuntimeError> {
        let effects = self.coordinator.resume(&self.cluster)?;
        self.apply_effects(effects)
    }

    /// Drains `rx` to completion, handling one event at a time. Returns on
    /// the first fatal error (a durable-store write failure during
    /// teardown) or when the channel closes.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<ControllerEvent>) -> Result<(), RuntimeError> {
        while let Some(event) = rx.recv().await {
            self.handle_event(event)?;
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: ControllerEvent) -> Result<(), RuntimeError> {
        match event {
            ControllerEvent::DeleteTopicsChildChange(topics) => {
                let effects = self.coordinator.enqueue(topics, &self.cluster)?;
                self.apply_effects(effects)
            }

            ControllerEvent::StopReplicaResponseReceived {
                controller_epoch,
                broker_id,
                entries,
            } => {
                if controller_epoch != self.controller_epoch {
                    debug!(
                        controller_epoch,
                        current = self.controller_epoch,
                        "dropping stale stop-replica response"
                    );
                    return Ok(());
                }

                let mut ok_replicas = Vec::new();
                let mut err_replicas = Vec::new();
                for entry in entries {
                    let replica = ReplicaId::new(entry.partition, broker_id);
                    match entry.result {
                        StopReplicaResult::Ok => ok_replicas.push(replica),
                        StopReplicaResult::Error(reason) => {
                            warn!(replica = %replica, reason, "stop-replica error response");
                            err_replicas.push(replica);
                        }
                    }
                }

                let mut effects = self
                    .coordinator
                    .complete_replica_deletion(&ok_replicas, &self.cluster)?;
                effects.extend(
                    self.coordinator
                        .fail_replica_deletion(&err_replicas, &self.cluster)?,
                );
                self.apply_effects(effects)
            }

            ControllerEvent::BrokerFailure { broker_id } => {
                self.cluster.set_broker_dead(broker_id);
                let replicas = self.cluster.replicas_on_broker(broker_id);
                let effects = self
                    .coordinator
                    .fail_replica_deletion(&replicas, &self.cluster)?;
                self.apply_effects(effects)
            }

            ControllerEvent::BrokerStartup { broker_id } => {
                self.cluster.set_broker_live(broker_id);
                let topics: HashSet<String> = self
                    .cluster
                    .replicas_on_broker(broker_id)
                    .into_iter()
                    .map(|r| r.topic_name().to_string())
                    .collect();
                let effects = self.coordinator.resume_for_topics(&topics, &self.cluster)?;
                self.apply_effects(effects)
            }

            ControllerEvent::PartitionReassignmentComplete { partition } => {
                let mut topics = HashSet::new();
                topics.insert(partition.topic_name);
                let effects = self.coordinator.resume_for_topics(&topics, &self.cluster)?;
                self.apply_effects(effects)
            }

            ControllerEvent::ControllerResignation => {
                self.coordinator.reset();
                info!("controller resigned, coordinator state dropped");
                Ok(())
            }
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) -> Result<(), RuntimeError> {
        for effect in effects {
            match effect {
                Effect::SendUpdateMetadata {
                    partitions,
                    broker_ids,
                } => self
                    .dispatcher
                    .send_update_metadata(&partitions, &broker_ids),

                Effect::SendStopReplica {
                    partition,
                    broker_id,
                    delete,
                } => self.dispatcher.send_stop_replica(&partition, broker_id, delete),

                Effect::DeregisterPartitionModificationsWatch { topic } => {
                    debug!(topic = %topic, "partition-modifications watch deregistered");
                }

                Effect::DeleteTopicMetadataPath { topic } => {
                    self.store.delete_topic_metadata(&topic)?;
                }

                Effect::DeleteTopicConfigPath { topic } => {
                    self.store.delete_topic_config(&topic)?;
                }

                Effect::DeleteDeletionIntentMarker { topic } => {
                    self.store.delete_intent_marker(&topic)?;
                }

                Effect::RemoveFromMetadataCache { topic } => {
                    self.cluster.remove_topic(&topic);
                }

                Effect::PurgeStaleIntentMarker { topic } => {
                    self.store.delete_intent_marker(&topic)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdc_types::{EnqueueTime, PartitionId};

    fn wire_topic_a(
        loop_: &mut ControllerEventLoop<crate::store::InMemoryMetadataStore, InMemoryBrokerDispatcher>,
    ) {
        loop_.cluster_view_mut().set_broker_live(1);
        loop_.cluster_view_mut().set_broker_live(2);
        loop_.cluster_view_mut().register_topic(
            "A",
            vec![
                (PartitionId::new("A", 0), vec![1, 2]),
                (PartitionId::new("A", 1), vec![1, 2]),
            ],
        );
    }

    #[test]
    fn enqueue_dispatches_update_metadata_and_stop_replica() {
        let mut event_loop = ControllerEventLoop::new(
            true,
            1,
            crate::store::InMemoryMetadataStore::new(),
            InMemoryBrokerDispatcher::new(),
        );
        wire_topic_a(&mut event_loop);

        event_loop
            .handle_event(ControllerEvent::DeleteTopicsChildChange(vec![
                TopicToBeDeleted::new("A", EnqueueTime(1)),
            ]))
            .unwrap();

        assert_eq!(event_loop.dispatcher().update_metadata_calls().len(), 1);
        assert_eq!(event_loop.dispatcher().stop_replica_calls().len(), 4);
        assert!(event_loop.coordinator().is_topic_deletion_in_progress("A"));
    }

    #[test]
    fn stale_epoch_response_is_dropped() {
        let mut event_loop = ControllerEventLoop::new(
            true,
            7,
            crate::store::InMemoryMetadataStore::new(),
            InMemoryBrokerDispatcher::new(),
        );
        wire_topic_a(&mut event_loop);
        event_loop
            .handle_event(ControllerEvent::DeleteTopicsChildChange(vec![
                TopicToBeDeleted::new("A", EnqueueTime(1)),
            ]))
            .unwrap();

        event_loop
            .handle_event(ControllerEvent::StopReplicaResponseReceived {
                controller_epoch: 6,
                broker_id: 1,
                entries: vec![crate::event::StopReplicaResponseEntry {
                    partition: PartitionId::new("A", 0),
                    result: StopReplicaResult::Ok,
                }],
            })
            .unwrap();

        // Still in progress: the stale-epoch response changed nothing.
        assert!(event_loop.coordinator().is_topic_deletion_in_progress("A"));
    }

    #[tokio::test]
    async fn run_drains_channel_until_closed() {
        let mut event_loop = ControllerEventLoop::new(
            true,
            1,
            crate::store::InMemoryMetadataStore::new(),
            InMemoryBrokerDispatcher::new(),
        );
        wire_topic_a(&mut event_loop);

        let (tx, rx) = mpsc::channel(8);
        tx.send(ControllerEvent::DeleteTopicsChildChange(vec![
            TopicToBeDeleted::new("A", EnqueueTime(1)),
        ]))
        .await
        .unwrap();
        drop(tx);

        event_loop.run(rx).await.unwrap();
        assert_eq!(event_loop.dispatcher().stop_replica_calls().len(), 4);
    }
}
