//! Mutable in-memory implementation of [`tdc_kernel::ClusterView`].
//!
//! The kernel only ever sees this through the read-only `ClusterView`
//! trait; [`ControllerEventLoop`](crate::event_loop::ControllerEventLoop)
//! is the only thing that mutates it, in response to `BrokerStartup` /
//! `BrokerFailure` events and topic/partition metadata changes, mirroring
//! how the real controller's metadata cache and broker liveness tracker
//! are updated outside the coordinator itself.

use std::collections::{HashMap, HashSet};

use tdc_kernel::ClusterView;
use tdc_types::PartitionId;

#[derive(Debug, Default)]
pub struct InMemoryClusterView {
    live_brokers: HashSet<i32>,
    shutting_down_brokers: HashSet<i32>,
    topic_partitions: HashMap<String, Vec<PartitionId>>,
    replica_assignment: HashMap<PartitionId, Vec<i32>>,
}

impl InMemoryClusterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_broker_live(&mut self, broker_id: i32) {
        self.shutting_down_brokers.remove(&broker_id);
        self.live_brokers.insert(broker_id);
    }

    pub fn set_broker_dead(&mut self, broker_id: i32) {
        self.live_brokers.remove(&broker_id);
        self.shutting_down_brokers.remove(&broker_id);
    }

    pub fn set_broker_shutting_down(&mut self, broker_id: i32) {
        self.live_brokers.remove(&broker_id);
        self.shutting_down_brokers.insert(broker_id);
    }

    /// Registers a topic's partitions and their replica assignment. Call
    /// this (mirroring the controller's metadata cache) before enqueuing
    /// the topic for deletion.
    pub fn register_topic(&mut self, topic: &str, assignments: Vec<(PartitionId, Vec<i32>)>) {
        let mut partitions = Vec::with_capacity(assignments.len());
        for (partition, brokers) in assignments {
            partitions.push(partition.clone());
            self.replica_assignment.insert(partition, brokers);
        }
        self.topic_partitions.insert(topic.to_string(), partitions);
    }

    /// Removes a topic's metadata entirely, mirroring
    /// `Effect::RemoveFromMetadataCache`.
    pub fn remove_topic(&mut self, topic: &str) {
        if let Some(partitions) = self.topic_partitions.remove(topic) {
            for partition in partitions {
                self.replica_assignment.remove(&partition);
            }
        }
    }

    /// All replicas currently assigned to `broker_id`, across every
    /// registered topic. Used by the event loop to translate a
    /// `BrokerFailure` event into the replica list `fail_replica_deletion`
    /// expects.
    pub fn replicas_on_broker(&self, broker_id: i32) -> Vec<tdc_types::ReplicaId> {
        self.replica_assignment
            .iter()
            .filter(|(_, brokers)| brokers.contains(&broker_id))
            .map(|(partition, _)| tdc_types::ReplicaId::new(partition.clone(), broker_id))
            .collect()
    }
}

impl ClusterView for InMemoryClusterView {
    fn live_brokers(&self) -> HashSet<i32> {
        self.live_brokers.clone()
    }

    fn shutting_down_brokers(&self) -> HashSet<i32> {
        self.shutting_down_brokers.clone()
    }

    fn partitions_for_topic(&self, topic: &str) -> Vec<PartitionId> {
        self.topic_partitions.get(topic).cloned().unwrap_or_default()
    }

    fn replica_assignment(&self, partition: &PartitionId) -> Vec<i32> {
        self.replica_assignment.get(partition).cloned().unwrap_or_default()
    }
}
