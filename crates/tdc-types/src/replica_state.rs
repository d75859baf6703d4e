//! Replica deletion substates and their transition function.
//!
//! This is the subset of the full replica state machine relevant to topic
//! deletion; the complete machine lives in the broker's replica-state-machine
//! component and is out of scope here.

use serde::{Deserialize, Serialize};

/// Deletion-relevant replica states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplicaDeletionState {
    /// Not serving, not yet instructed to delete.
    OfflineReplica,
    /// A `StopReplica(delete=true)` request is outstanding.
    ReplicaDeletionStarted,
    /// Broker acknowledged deletion with no error.
    ReplicaDeletionSuccessful,
    /// Deletion attempt failed or the broker is down; blocks completion.
    ReplicaDeletionIneligible,
    /// Terminal: removed from projections.
    NonExistentReplica,
}

impl ReplicaDeletionState {
    /// Returns `true` if `to` is a legal transition from `self`.
    ///
    /// ```text
    ///  OfflineReplica ──► ReplicaDeletionStarted ──► ReplicaDeletionSuccessful ──► NonExistentReplica
    ///                        │     ▲
    ///                   (failure) │ (retry via OfflineReplica)
    ///                        ▼     │
    ///                 ReplicaDeletionIneligible
    /// ```
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        use ReplicaDeletionState::{
            NonExistentReplica, OfflineReplica, ReplicaDeletionIneligible,
            ReplicaDeletionStarted, ReplicaDeletionSuccessful,
        };
        matches!(
            (self, to),
            (OfflineReplica, ReplicaDeletionStarted)
                | (ReplicaDeletionStarted, ReplicaDeletionSuccessful)
                | (ReplicaDeletionStarted, ReplicaDeletionIneligible)
                | (ReplicaDeletionIneligible, OfflineReplica)
                | (ReplicaDeletionSuccessful, NonExistentReplica)
                // dead-on-arrival classification in start_replica_deletion
                | (OfflineReplica, ReplicaDeletionIneligible)
        )
    }
}

/// Error returned when a caller asks for an illegal replica transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal replica transition {from:?} -> {to:?} for {replica}")]
pub struct IllegalReplicaTransition {
    pub replica: crate::ReplicaId,
    pub from: ReplicaDeletionState,
    pub to: ReplicaDeletionState,
}
