//! Debug assertion macros for pipeline invariants.
//!
//! Active only under `#[cfg(debug_assertions)]`; zero cost in release builds.

// =============================================================================
// INV-PROP-01: Propagation wakes downstream readers
// =============================================================================

/// **Invariant**: a successful `Sink::push` always notifies waiting readers.
///
/// Used in: `Sink::push`.
macro_rules! debug_assert_data_notified {
    ($pushed:expr, $notified:expr) => {
        debug_assert!(
            !$pushed || $notified,
            "INV-PROP-01 violated: pushed a sample but did not notify waiting readers"
        )
    };
}

// =============================================================================
// INV-BIN-01: Reference-counted start/stop never goes negative
// =============================================================================

/// **Invariant**: `stop()` is never called more times than `start()`.
///
/// Used in: `BinLifecycle::stop`.
macro_rules! debug_assert_ref_count_nonnegative {
    ($prev_count:expr) => {
        debug_assert!(
            $prev_count > 0,
            "INV-BIN-01 violated: stop() called with ref count already at 0"
        )
    };
}

// =============================================================================
// INV-BIN-02: Cycle drains to a fixed point
// =============================================================================

/// **Invariant**: a propagation cycle only returns once a read from the
/// input yielded nothing — it never leaves samples sitting unprocessed
/// while there was still room to drain them.
///
/// Used in: `Bin::run_cycle`.
macro_rules! debug_assert_cycle_reached_fixed_point {
    ($last_batch_len:expr) => {
        debug_assert!(
            $last_batch_len == 0,
            "INV-BIN-02 violated: cycle exited with {} samples still unread",
            $last_batch_len
        )
    };
}

pub(crate) use debug_assert_cycle_reached_fixed_point;
pub(crate) use debug_assert_data_notified;
pub(crate) use debug_assert_ref_count_nonnegative;
