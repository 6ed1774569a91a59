//! `IntervalRequest`: per-session interval (sample period) request.
//!
//! Mirrors `original_source/datatypes/datarange.h`'s `IntervalRequest`.
//! Head selection is minimum-wins (fastest requested interval), ties
//! broken by insertion order — see spec §4.6 and `DESIGN.md` Open
//! Question 2.

use crate::session::{SessionId, NO_SESSION};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalRequest {
    pub session: SessionId,
    pub interval_ms: u32,
}

impl IntervalRequest {
    pub const fn default_for(interval_ms: u32) -> Self {
        Self { session: NO_SESSION, interval_ms }
    }
}

/// Picks the effective entry out of a request queue: the minimum
/// `interval_ms`, ties broken by earliest insertion (first occurrence in
/// queue order).
pub(crate) fn effective(queue: &[IntervalRequest]) -> Option<IntervalRequest> {
    queue.iter().copied().min_by_key(|r| r.interval_ms)
}
