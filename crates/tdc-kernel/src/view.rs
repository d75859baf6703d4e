//! Read-only handle to controller context the coordinator does not own.
//!
//! The controller and the coordinator would otherwise reference each other
//! cyclically; this trait breaks that by giving the coordinator a
//! non-owning, read-only handle onto controller context, with all feedback
//! traveling back through the event queue instead of a direct call.
//! Production wires it to the controller's live metadata cache and broker
//! liveness tracker; tests wire it to `tdc_runtime`'s `InMemoryClusterView`.
use std::collections::HashSet;

use tdc_types::PartitionId;

pub trait ClusterView {
    /// Broker IDs currently alive and serving.
    fn live_brokers(&self) -> HashSet<i32>;

    /// Broker IDs in a controlled-shutdown state (still reachable for
    /// `UpdateMetadata`, but not for new replica placement).
    fn shutting_down_brokers(&self) -> HashSet<i32>;

    /// All partitions presently assigned to `topic` in the metadata cache.
    fn partitions_for_topic(&self, topic: &str) -> Vec<PartitionId>;

    /// The full replica assignment (broker IDs) for one partition.
    fn replica_assignment(&self, partition: &PartitionId) -> Vec<i32>;
}
