//! Runtime-level errors.

use crate::store::StoreError;
use tdc_kernel::KernelError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// A durable-store write failed during teardown. Propagated as a fatal
    /// event to the event loop; the controller is expected to resign and
    /// let another node retry. There is no retry inside this crate.
    #[error("fatal durable-store failure during teardown: {0}")]
    Fatal(#[from] StoreError),
}
