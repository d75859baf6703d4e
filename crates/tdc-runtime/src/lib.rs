//! Imperative shell for the topic deletion coordinator.
//!
//! Provides the external-collaborator traits for the durable store (C3)
//! and the broker request layer (C4) without implementing either in depth,
//! in-memory implementations of both for tests, a mutable `ClusterView`
//! implementation the event loop updates as brokers come and go, and the
//! `ControllerEventLoop` that ties everything to `tdc-kernel`'s pure
//! `DeletionCoordinator`.

pub mod cluster_view;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod event_loop;
pub mod store;

pub use cluster_view::InMemoryClusterView;
pub use dispatch::{BrokerDispatcher, InMemoryBrokerDispatcher};
pub use error::RuntimeError;
pub use event::{ControllerEvent, StopReplicaResponseEntry, StopReplicaResult};
pub use event_loop::ControllerEventLoop;
pub use store::{InMemoryMetadataStore, MetadataStore, StoreError};
