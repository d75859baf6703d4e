//! Core data model for the topic deletion coordinator.
//!
//! This crate has no logic beyond state-transition legality checks: it
//! defines the identity types, the two deletion state machines, and the
//! errors raised when a caller asks for an illegal transition. The
//! coordinator itself lives in `tdc-kernel`.

mod ids;
mod partition_state;
mod replica_state;

pub use ids::{EnqueueTime, PartitionId, ReplicaId, TopicToBeDeleted};
pub use partition_state::{IllegalPartitionTransition, PartitionDeletionState};
pub use replica_state::{IllegalReplicaTransition, ReplicaDeletionState};
