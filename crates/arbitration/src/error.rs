//! Error types for node arbitration.

use thiserror::Error;

/// Errors surfaced by [`crate::NodeBase`] and [`crate::AbstractSensorChannel`]
/// operations.
///
/// `request_data_range`/`request_interval` themselves never return these for
/// an unavailable value — the original `nodebase.cpp` silently ignores such
/// requests, and this crate preserves that behavior (see `DESIGN.md`, Open
/// Question 1). They exist for callers that want to validate proactively
/// against `available_data_ranges()`/a known interval set before requesting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    /// A requested range is not present in the node's (or its upstream's)
    /// available list.
    #[error("data range is not in the node's available set")]
    UnavailableRange,

    /// A requested interval could not be honored by the concrete setter.
    #[error("interval request could not be satisfied")]
    UnavailableInterval,

    /// The concrete `set_data_range`/`set_interval` hook rejected the head
    /// of a request queue.
    #[error("arbitration setter rejected the new head of the queue")]
    ArbitrationFailure,

    /// An upstream standby source refused to enter standby override.
    #[error("upstream standby source denied the override request")]
    StandbyDenied,
}
