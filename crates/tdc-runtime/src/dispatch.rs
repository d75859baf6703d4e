//! Broker Request Dispatcher (C4) — cited contract and an in-memory test
//! double.
//!
//! The real dispatcher owns connections to every broker and turns each
//! `StopReplicaResponse` into a `StopReplicaResponseReceived` event on the
//! controller's event queue — no closure crosses this boundary.
//! `BrokerDispatcher` is reduced to the send side; the response side is the
//! [`crate::event::ControllerEvent`] the test harness or production
//! transport later enqueues.

use tdc_types::PartitionId;

pub trait BrokerDispatcher: Send {
    fn send_update_metadata(&mut self, partitions: &[PartitionId], broker_ids: &[i32]);

    fn send_stop_replica(&mut self, partition: &PartitionId, broker_id: i32, delete: bool);
}

/// Record of one outbound `StopReplica` request, kept for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReplicaCall {
    pub partition: PartitionId,
    pub broker_id: i32,
    pub delete: bool,
}

/// Record of one outbound `UpdateMetadata` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMetadataCall {
    pub partitions: Vec<PartitionId>,
    pub broker_ids: Vec<i32>,
}

/// In-memory dispatcher: records every request instead of sending it over
/// the wire.
#[derive(Debug, Default)]
pub struct InMemoryBrokerDispatcher {
    stop_replica_calls: Vec<StopReplicaCall>,
    update_metadata_calls: Vec<UpdateMetadataCall>,
}

impl InMemoryBrokerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_replica_calls(&self) -> &[StopReplicaCall] {
        &self.stop_replica_calls
    }

    pub fn update_metadata_calls(&self) -> &[UpdateMetadataCall] {
        &self.update_metadata_calls
    }
}

impl BrokerDispatcher for InMemoryBrokerDispatcher {
    fn send_update_metadata(&mut self, partitions: &[PartitionId], broker_ids: &[i32]) {
        self.update_metadata_calls.push(UpdateMetadataCall {
            partitions: partitions.to_vec(),
            broker_ids: broker_ids.to_vec(),
        });
    }

    fn send_stop_replica(&mut self, partition: &PartitionId, broker_id: i32, delete: bool) {
        self.stop_replica_calls.push(StopReplicaCall {
            partition: partition.clone(),
            broker_id,
            delete,
        });
    }
}
