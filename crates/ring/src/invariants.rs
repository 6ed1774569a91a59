//! Debug assertion macros for ring buffer invariants.
//!
//! Active only under `#[cfg(debug_assertions)]`; zero cost in release builds.

// =============================================================================
// INV-SEQ-01: Reader never laps ahead of the writer
// =============================================================================

/// **Invariant**: `reader_pos <= write_pos` at all times.
///
/// Used in: `RingBuffer::read` after computing the reader's new position.
macro_rules! debug_assert_reader_not_past_writer {
    ($reader_pos:expr, $write_pos:expr) => {
        debug_assert!(
            $reader_pos <= $write_pos,
            "INV-SEQ-01 violated: reader position {} ahead of writer position {}",
            $reader_pos,
            $write_pos
        )
    };
}

// =============================================================================
// INV-SEQ-02: Monotonic progress
// =============================================================================

/// **Invariant**: a sequence counter only increases.
///
/// Used in: `RingBuffer::write` for `write_pos`, `RingBuffer::read` for a
/// reader's cursor.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-SEQ-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-LAG-01: Bounded lag
// =============================================================================

/// **Invariant**: `write_pos - reader_pos <= capacity` (a reader can never be
/// further behind than the buffer holds; lapping is tracked explicitly as a
/// drop count, not allowed to desync the cursor arithmetic).
///
/// Used in: `RingBuffer::read` after clamping a lapped reader forward.
macro_rules! debug_assert_bounded_lag {
    ($lag:expr, $capacity:expr) => {
        debug_assert!(
            $lag <= $capacity as u64,
            "INV-LAG-01 violated: reader lag {} exceeds capacity {}",
            $lag,
            $capacity
        )
    };
}

pub(crate) use debug_assert_bounded_lag;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_reader_not_past_writer;
