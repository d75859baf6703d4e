//! Identity types for topics, partitions, and replicas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A topic partition, identified by its topic name and zero-based index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionId {
    pub topic_name: String,
    pub partition_index: u32,
}

impl PartitionId {
    pub fn new(topic_name: impl Into<String>, partition_index: u32) -> Self {
        Self {
            topic_name: topic_name.into(),
            partition_index,
        }
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic_name, self.partition_index)
    }
}

/// One replica of one partition, hosted on one broker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplicaId {
    pub partition: PartitionId,
    pub broker_id: i32,
}

impl ReplicaId {
    pub fn new(partition: PartitionId, broker_id: i32) -> Self {
        Self {
            partition,
            broker_id,
        }
    }

    pub fn topic_name(&self) -> &str {
        &self.partition.topic_name
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:broker{}", self.partition, self.broker_id)
    }
}

/// A monotonic timestamp, opaque to the coordinator beyond ordering.
///
/// `deletion_enqueue_time` is read from the durable store's node creation
/// time and must survive controller failover; it is never derived from the
/// local wall clock inside the kernel (the kernel has no clock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnqueueTime(pub u64);

/// A topic queued for deletion.
///
/// Identity is `topic_name`; `deletion_enqueue_time` is the FIFO key used by
/// [`crate::coordinator`]'s `resume` algorithm to pick the next topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicToBeDeleted {
    pub topic_name: String,
    pub deletion_enqueue_time: EnqueueTime,
    /// Number of times `start_replica_deletion` has run for this topic.
    /// Observability only; never read by the deletion logic itself.
    pub retry_count: u32,
}

impl TopicToBeDeleted {
    pub fn new(topic_name: impl Into<String>, deletion_enqueue_time: EnqueueTime) -> Self {
        Self {
            topic_name: topic_name.into(),
            deletion_enqueue_time,
            retry_count: 0,
        }
    }
}

/// Orders topics by `(deletion_enqueue_time, topic_name)` — the FIFO-with
/// deterministic-tiebreak order the `resume` algorithm selects by.
impl PartialOrd for TopicToBeDeleted {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TopicToBeDeleted {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.deletion_enqueue_time, &self.topic_name)
            .cmp(&(other.deletion_enqueue_time, &other.topic_name))
    }
}
