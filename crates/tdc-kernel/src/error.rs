//! Errors the coordinator's pure operations can return.

use tdc_types::{IllegalPartitionTransition, IllegalReplicaTransition};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error(transparent)]
    IllegalReplicaTransition(#[from] IllegalReplicaTransition),

    #[error(transparent)]
    IllegalPartitionTransition(#[from] IllegalPartitionTransition),
}
