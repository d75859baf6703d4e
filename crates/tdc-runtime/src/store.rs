//! Metadata Store Gateway (C3) — cited contract and an in-memory test
//! double.
//!
//! The durable coordination store is an external collaborator whose
//! contract we only cite; the wire-level watch/CAS semantics of the real
//! store (a hierarchical key-value service with watches) are out of
//! scope. `MetadataStore` is that contract, reduced to the three
//! operations `complete_delete_topic` needs.

/// Errors a durable-store write can raise. Propagated out of
/// [`crate::event_loop::ControllerEventLoop::run`] as a fatal error during
/// teardown — the controller is expected to resign, not retry in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("durable store unavailable: {0}")]
    Unavailable(String),

    #[error("path not found: {0}")]
    NotFound(String),
}

pub trait MetadataStore: Send {
    /// Deletes `/brokers/topics/<topic>`, recursively.
    fn delete_topic_metadata(&mut self, topic: &str) -> Result<(), StoreError>;

    /// Deletes `/config/topics/<topic>`, recursively.
    fn delete_topic_config(&mut self, topic: &str) -> Result<(), StoreError>;

    /// Deletes `/admin/delete_topics/<topic>`.
    fn delete_intent_marker(&mut self, topic: &str) -> Result<(), StoreError>;
}

/// In-memory stand-in for the durable store, used by tests and by the
/// demo wiring in `tdc`.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    deleted_topic_metadata: Vec<String>,
    deleted_topic_config: Vec<String>,
    deleted_intent_markers: Vec<String>,
    /// When set, every write for this exact topic fails once, then
    /// succeeds — used to exercise the fatal-error propagation path.
    pub fail_once_for: Option<String>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted_topic_metadata(&self) -> &[String] {
        &self.deleted_topic_metadata
    }

    pub fn deleted_topic_config(&self) -> &[String] {
        &self.deleted_topic_config
    }

    pub fn deleted_intent_markers(&self) -> &[String] {
        &self.deleted_intent_markers
    }

    fn maybe_fail(&mut self, topic: &str) -> Result<(), StoreError> {
        if self.fail_once_for.as_deref() == Some(topic) {
            self.fail_once_for = None;
            return Err(StoreError::Unavailable(topic.to_string()));
        }
        Ok(())
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn delete_topic_metadata(&mut self, topic: &str) -> Result<(), StoreError> {
        self.maybe_fail(topic)?;
        self.deleted_topic_metadata.push(topic.to_string());
        Ok(())
    }

    fn delete_topic_config(&mut self, topic: &str) -> Result<(), StoreError> {
        self.maybe_fail(topic)?;
        self.deleted_topic_config.push(topic.to_string());
        Ok(())
    }

    fn delete_intent_marker(&mut self, topic: &str) -> Result<(), StoreError> {
        self.maybe_fail(topic)?;
        self.deleted_intent_markers.push(topic.to_string());
        Ok(())
    }
}
