//! `DataRange` / `DataRangeRequest`: typed sensor range metadata.
//!
//! Field-for-field mirror of `original_source/datatypes/datarange.h`'s
//! `DataRange`/`DataRangeRequest` (renamed to Rust case); the property-map
//! string wire format in `sensord::property` is a separate, later encoding
//! layered on top of this typed representation, not a replacement for it.

use crate::session::{SessionId, NO_SESSION};

/// A sensor's data range and resolution, as plain `f64`s (the original
/// stores these as `double`, not strings).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRange {
    pub min: f64,
    pub max: f64,
    pub resolution: f64,
}

impl DataRange {
    pub const fn new(min: f64, max: f64, resolution: f64) -> Self {
        Self { min, max, resolution }
    }
}

/// One session's pending (or currently effective) range request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRangeRequest {
    pub session: SessionId,
    pub range: DataRange,
}

impl DataRangeRequest {
    /// The request returned by `getCurrentDataRange()` when no session has
    /// an active request: `id = -1`, range = the node's default.
    pub const fn default_for(range: DataRange) -> Self {
        Self { session: NO_SESSION, range }
    }
}
