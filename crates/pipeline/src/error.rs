//! Error types for pipeline operations.

use sensord_ring::RingError;
use thiserror::Error;

/// Errors that can occur wiring and running a dataflow pipeline.
///
/// The ring layer's own failure modes (too many readers, a detached
/// cursor) surface through this crate's `reader()`/`read_batch()`/
/// `read_up_to()` as `Ring`, so a caller one layer up never needs to name
/// `sensord-ring` directly.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A ring-buffer operation underlying this connection failed: either
    /// `attach` ran out of reader slots, or a read was issued against a
    /// cursor that has since been detached.
    #[error("ring buffer operation failed: {0}")]
    Ring(#[from] RingError),

    /// An operation targeted a bin that has already been fully stopped.
    #[error("bin is not running")]
    NotRunning,
}
