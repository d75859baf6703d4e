//! Pure functional core of the topic deletion coordinator.
//!
//! The coordinator never performs I/O, never reads a clock, and never
//! spawns a thread: every public operation takes the current state by
//! `&mut self` and a read-only [`ClusterView`], and returns the list of
//! [`Effect`]s a runtime must execute. This mirrors the functional-core /
//! imperative-shell split used elsewhere in this codebase (see
//! `DESIGN.md`).

pub mod coordinator;
pub mod effects;
pub mod error;
pub mod projection;
pub mod view;

pub use coordinator::DeletionCoordinator;
pub use effects::{DeletionOutcome, Effect};
pub use error::KernelError;
pub use projection::{PartitionProjection, ReplicaProjection};
pub use view::ClusterView;
