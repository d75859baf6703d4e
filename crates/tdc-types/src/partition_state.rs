//! Partition deletion substates and their transition function.

use serde::{Deserialize, Serialize};

/// Deletion-relevant partition states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionDeletionState {
    OfflinePartition,
    NonExistentPartition,
}

impl PartitionDeletionState {
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (
                PartitionDeletionState::OfflinePartition,
                PartitionDeletionState::NonExistentPartition,
            )
        )
    }
}

/// Error returned when a caller asks for an illegal partition transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal partition transition {from:?} -> {to:?} for {partition}")]
pub struct IllegalPartitionTransition {
    pub partition: crate::PartitionId,
    pub from: PartitionDeletionState,
    pub to: PartitionDeletionState,
}
