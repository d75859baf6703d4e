//! Topic Deletion Coordinator.
//!
//! Facade crate: wires `tdc-kernel`'s pure [`DeletionCoordinator`] to
//! `tdc-runtime`'s event loop and external-collaborator traits, and adds
//! the single deletion-enabled configuration flag.
//!
//! ```ignore
//! use tdc::{DeletionConfig, ControllerEventLoop, InMemoryMetadataStore, InMemoryBrokerDispatcher};
//!
//! let config = DeletionConfig::default();
//! let mut event_loop = ControllerEventLoop::new(
//!     config.enabled,
//!     controller_epoch,
//!     InMemoryMetadataStore::new(),
//!     InMemoryBrokerDispatcher::new(),
//! );
//! event_loop.init(initial_queued, initial_ineligible)?;
//! event_loop.run(rx).await?;
//! ```

mod config;

pub use config::{ConfigError, DeletionConfig};

pub use tdc_kernel::{ClusterView, DeletionCoordinator, Effect, KernelError};
pub use tdc_runtime::{
    BrokerDispatcher, ControllerEvent, ControllerEventLoop, InMemoryBrokerDispatcher,
    InMemoryClusterView, InMemoryMetadataStore, MetadataStore, RuntimeError,
    StopReplicaResponseEntry, StopReplicaResult,
};
pub use tdc_types::{
    EnqueueTime, PartitionDeletionState, PartitionId, ReplicaDeletionState, ReplicaId,
    TopicToBeDeleted,
};

/// Installs a `tracing` subscriber reading its filter from `RUST_LOG`,
/// defaulting to `info`. Call once at process startup; safe to call more
/// than once (later calls are ignored).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
