//! Effects produced by the coordinator.
//!
//! The coordinator is pure - it produces effects but never executes them
//! directly. A runtime layer (`tdc-runtime`) dispatches each effect to the
//! broker request layer (C4) or the durable-store gateway (C3).

use serde::{Deserialize, Serialize};
use tdc_types::PartitionId;

/// An effect to be executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// `UpdateMetadata(partitions, leader = LeaderDuringDelete)` to every
    /// live or shutting-down broker, so brokers refuse client traffic for
    /// these partitions while deletion proceeds.
    SendUpdateMetadata {
        partitions: Vec<PartitionId>,
        broker_ids: Vec<i32>,
    },

    /// `StopReplica(delete)` to one broker for one replica.
    ///
    /// When `delete` is `true` this is the terminal, data-destroying call;
    /// the response comes back as a
    /// `ControllerEvent::StopReplicaResponseReceived` tagged event, never as
    /// a direct callback into the coordinator.
    SendStopReplica {
        partition: PartitionId,
        broker_id: i32,
        delete: bool,
    },

    /// Deregister the partition-modifications watch for a topic, step 1 of
    /// teardown. Prevents a race where a re-created same-named topic's
    /// watch fires against the old listener.
    DeregisterPartitionModificationsWatch { topic: String },

    /// Delete `/brokers/topics/<topic>` (recursive). The single site that
    /// ever removes this path.
    DeleteTopicMetadataPath { topic: String },

    /// Delete `/config/topics/<topic>` (recursive).
    DeleteTopicConfigPath { topic: String },

    /// Delete `/admin/delete_topics/<topic>`, the intent marker. Always
    /// the last durable-store write in teardown.
    DeleteDeletionIntentMarker { topic: String },

    /// Remove the topic from the controller's in-memory metadata cache.
    RemoveFromMetadataCache { topic: String },

    /// Delete a stale intent marker found at `init` time while deletion is
    /// globally disabled. Distinct from `DeleteDeletionIntentMarker`
    /// because it is emitted without any corresponding teardown.
    PurgeStaleIntentMarker { topic: String },
}

/// How one `complete_delete_topic` run ended. Exists only so the runtime
/// can log a single structured event; never stored past that call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionOutcome {
    Completed,
    Aborted,
}
