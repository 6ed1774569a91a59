//! Configuration for bin dispatch behavior.

use std::time::Duration;

/// Configuration for a [`crate::Bin`]'s propagation cycle.
#[derive(Debug, Clone)]
pub struct BinConfig {
    /// Safety-net poll interval: even with `Notify`-driven wakeups, the
    /// dispatch loop re-checks its input on this cadence to catch a missed
    /// wakeup (mirrors the teacher's hybrid notify + poll-timer receiver).
    ///
    /// Default: 10ms.
    pub poll_interval: Duration,

    /// Hint for how many samples a single propagation cycle should drain
    /// from one input before yielding, to avoid one busy source starving
    /// others processed by the same bin.
    ///
    /// Default: 64.
    pub batch_hint: usize,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(10), batch_hint: 64 }
    }
}

impl BinConfig {
    /// Shorter poll interval, smaller batches — for interactive sensors
    /// (e.g. tap detection) where latency matters more than throughput.
    pub fn low_latency() -> Self {
        Self { poll_interval: Duration::from_millis(1), batch_hint: 16 }
    }

    /// Longer poll interval, larger batches — for high-rate sensors (e.g.
    /// accelerometer) where coalescing is preferable to waking up often.
    pub fn high_throughput() -> Self {
        Self { poll_interval: Duration::from_millis(50), batch_hint: 256 }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_batch_hint(mut self, hint: usize) -> Self {
        self.batch_hint = hint;
        self
    }
}
