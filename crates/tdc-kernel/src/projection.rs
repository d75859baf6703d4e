//! Replica and partition state projections (C1, C2).
//!
//! Answer "any replica of topic T in state S?"-shaped queries and are
//! mutated only through explicit state-change operations. Folded into this
//! crate rather than split into their own crates because the coordinator
//! is their only caller (see `DESIGN.md`); the module boundary is kept so
//! the split remains easy if a second caller appears.

use std::collections::HashMap;

use tdc_types::{
    IllegalPartitionTransition, IllegalReplicaTransition, PartitionDeletionState, PartitionId,
    ReplicaDeletionState, ReplicaId,
};

/// C1: tracks the deletion substate of every replica the coordinator has
/// touched.
#[derive(Debug, Clone, Default)]
pub struct ReplicaProjection {
    states: HashMap<ReplicaId, ReplicaDeletionState>,
}

impl ReplicaProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn get(&self, id: &ReplicaId) -> Option<ReplicaDeletionState> {
        self.states.get(id).copied()
    }

    /// Sets a replica's state without checking transition legality. Used
    /// only for bootstrapping replicas the coordinator has never seen
    /// before (e.g. the dead-on-arrival classification in
    /// `start_replica_deletion`, or `init` rebuilding from scratch).
    pub fn force_set(&mut self, id: ReplicaId, state: ReplicaDeletionState) {
        self.states.insert(id, state);
    }

    /// Transitions a tracked (or untracked, defaulting to `OfflineReplica`)
    /// replica to `to`, rejecting illegal transitions.
    pub fn transition(
        &mut self,
        id: &ReplicaId,
        to: ReplicaDeletionState,
    ) -> Result<(), IllegalReplicaTransition> {
        let from = self
            .states
            .get(id)
            .copied()
            .unwrap_or(ReplicaDeletionState::OfflineReplica);
        if from == to {
            return Ok(());
        }
        if !from.can_transition_to(to) {
            return Err(IllegalReplicaTransition {
                replica: id.clone(),
                from,
                to,
            });
        }
        self.states.insert(id.clone(), to);
        Ok(())
    }

    /// Removes a replica from the projection entirely (the
    /// `NonExistentReplica` terminal state).
    pub fn remove(&mut self, id: &ReplicaId) {
        self.states.remove(id);
    }

    pub fn replicas_of_topic(&self, topic: &str) -> Vec<ReplicaId> {
        self.states
            .keys()
            .filter(|r| r.topic_name() == topic)
            .cloned()
            .collect()
    }

    pub fn replicas_of_topic_in_state(
        &self,
        topic: &str,
        state: ReplicaDeletionState,
    ) -> Vec<ReplicaId> {
        self.states
            .iter()
            .filter(|(r, s)| r.topic_name() == topic && **s == state)
            .map(|(r, _)| r.clone())
            .collect()
    }

    pub fn any_replica_of_topic_in_state(&self, topic: &str, state: ReplicaDeletionState) -> bool {
        self.states
            .iter()
            .any(|(r, s)| r.topic_name() == topic && *s == state)
    }
}

/// C2: tracks the deletion substate of every partition the coordinator has
/// touched.
#[derive(Debug, Clone, Default)]
pub struct PartitionProjection {
    states: HashMap<PartitionId, PartitionDeletionState>,
}

impl PartitionProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn get(&self, id: &PartitionId) -> Option<PartitionDeletionState> {
        self.states.get(id).copied()
    }

    pub fn transition(
        &mut self,
        id: &PartitionId,
        to: PartitionDeletionState,
    ) -> Result<(), IllegalPartitionTransition> {
        let from = self
            .states
            .get(id)
            .copied()
            .unwrap_or(PartitionDeletionState::OfflinePartition);
        if from == to {
            return Ok(());
        }
        if !from.can_transition_to(to) {
            return Err(IllegalPartitionTransition {
                partition: id.clone(),
                from,
                to,
            });
        }
        self.states.insert(id.clone(), to);
        Ok(())
    }

    pub fn remove(&mut self, id: &PartitionId) {
        self.states.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replica(topic: &str, idx: u32, broker: i32) -> ReplicaId {
        ReplicaId::new(PartitionId::new(topic, idx), broker)
    }

    #[test]
    fn untracked_replica_defaults_to_offline_and_can_start() {
        let mut p = ReplicaProjection::new();
        let r = replica("t", 0, 1);
        assert_eq!(p.get(&r), None);
        p.transition(&r, ReplicaDeletionState::ReplicaDeletionStarted).unwrap();
        assert_eq!(p.get(&r), Some(ReplicaDeletionState::ReplicaDeletionStarted));
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut p = ReplicaProjection::new();
        let r = replica("t", 0, 1);
        p.transition(&r, ReplicaDeletionState::ReplicaDeletionStarted).unwrap();
        let err = p
            .transition(&r, ReplicaDeletionState::NonExistentReplica)
            .unwrap_err();
        assert_eq!(err.from, ReplicaDeletionState::ReplicaDeletionStarted);
    }

    #[test]
    fn removal_drops_from_queries() {
        let mut p = ReplicaProjection::new();
        let r = replica("t", 0, 1);
        p.transition(&r, ReplicaDeletionState::ReplicaDeletionStarted).unwrap();
        p.remove(&r);
        assert!(p.replicas_of_topic("t").is_empty());
    }
}
