//! Ingress events consumed by the coordinator.
//!
//! Modeled as one tagged enum: the broker dispatcher never hands the
//! coordinator a closure, it enqueues a `StopReplicaResponseReceived`
//! event that the event loop routes.

use tdc_types::{PartitionId, TopicToBeDeleted};

/// The per-partition result inside one broker's stop-replica response
/// batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReplicaResult {
    Ok,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReplicaResponseEntry {
    pub partition: PartitionId,
    pub result: StopReplicaResult,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The intent-marker watch fired with new children.
    DeleteTopicsChildChange(Vec<TopicToBeDeleted>),

    /// A broker replied to a `StopReplica` batch. Carries the
    /// controller epoch it was dispatched under; the event loop drops
    /// events whose epoch doesn't match the current one.
    StopReplicaResponseReceived {
        controller_epoch: u64,
        broker_id: i32,
        entries: Vec<StopReplicaResponseEntry>,
    },

    /// A broker died.
    BrokerFailure { broker_id: i32 },

    /// A broker came back up.
    BrokerStartup { broker_id: i32 },

    /// A partition reassignment finished.
    PartitionReassignmentComplete { partition: PartitionId },

    /// This node is no longer controller.
    ControllerResignation,
}
