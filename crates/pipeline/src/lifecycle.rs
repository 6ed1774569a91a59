//! Reference-counted start/stop state shared by a `Bin` and its
//! `BinLifecycle` handles.
//!
//! Generalizes the teacher's `ShutdownState`/`ShutdownHandle`/
//! `ShutdownSignal` trio: instead of a one-shot closed/open flag, multiple
//! independent owners (sessions touching the same chain) each hold a start
//! reference, and the underlying dispatch thread only actually stops once
//! every reference has released it.

#[cfg(debug_assertions)]
use crate::invariants::debug_assert_ref_count_nonnegative;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug)]
pub(crate) struct LifecycleState {
    ref_count: AtomicUsize,
    running: AtomicBool,
}

impl LifecycleState {
    pub(crate) fn new() -> Self {
        Self { ref_count: AtomicUsize::new(0), running: AtomicBool::new(false) }
    }

    /// Returns `true` if this call is the one that transitions the bin from
    /// stopped to running (i.e. the caller should spawn the dispatch thread).
    pub(crate) fn start(&self) -> bool {
        let prev = self.ref_count.fetch_add(1, Ordering::AcqRel);
        if prev == 0 {
            self.running.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// Returns `true` if this call is the one that transitions the bin from
    /// running to stopped (i.e. the caller should join the dispatch thread).
    pub(crate) fn stop(&self) -> bool {
        let prev = self.ref_count.fetch_sub(1, Ordering::AcqRel);
        #[cfg(debug_assertions)]
        debug_assert_ref_count_nonnegative!(prev);
        if prev == 1 {
            self.running.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// A cloneable handle for starting and stopping a [`crate::Bin`] by
/// reference count.
///
/// Multiple sessions may each hold a clone; the bin's dispatch thread keeps
/// running as long as at least one clone has called `start()` more times
/// than `stop()`.
#[derive(Clone)]
pub struct BinLifecycle {
    pub(crate) state: Arc<LifecycleState>,
    pub(crate) wake: Arc<Notify>,
}

impl BinLifecycle {
    pub(crate) fn new() -> Self {
        Self { state: Arc::new(LifecycleState::new()), wake: Arc::new(Notify::new()) }
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}
