use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe write/read/drop counters for a [`crate::RingBuffer`].
///
/// Mirrors the teacher's `Metrics` snapshot shape, but backed by atomics
/// since readers and the one writer observe it concurrently.
#[derive(Debug, Default)]
pub struct RingMetrics {
    writes: AtomicU64,
    reads: AtomicU64,
    drops: AtomicU64,
}

impl RingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_drops(&self, n: u64) {
        if n > 0 {
            self.drops.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// A point-in-time, non-atomic-as-a-whole snapshot of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            drops: self.drops.load(Ordering::Relaxed),
        }
    }
}

/// A consistent-enough-for-observability copy of [`RingMetrics`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub writes: u64,
    pub reads: u64,
    pub drops: u64,
}
