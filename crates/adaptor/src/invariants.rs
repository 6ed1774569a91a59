//! Debug assertion macros for adaptor invariants. Zero cost in release
//! builds, matching `sensord-pipeline`'s `invariants.rs`.

// =============================================================================
// INV-ADAPT-01: Reference-counted start/stop never goes negative
// =============================================================================

/// **Invariant**: `stop_adaptor()` is never called more times than
/// `start_adaptor()`.
macro_rules! debug_assert_ref_count_nonnegative {
    ($prev_count:expr) => {
        debug_assert!(
            $prev_count > 0,
            "INV-ADAPT-01 violated: stop_adaptor() called with ref count already at 0"
        )
    };
}

pub(crate) use debug_assert_ref_count_nonnegative;
