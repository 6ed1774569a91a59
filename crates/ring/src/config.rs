/// Configuration for a [`crate::RingBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct RingConfig {
    /// Ring buffer size as a power of two (default: 8 = 256 slots).
    ///
    /// Sensor sampling runs at kHz-order rates, not the billions-of-
    /// messages/sec regime this crate's lineage was built for, so the
    /// default capacity is small relative to that heritage.
    pub capacity_bits: u8,
    /// Maximum number of readers that may be attached concurrently.
    pub max_readers: usize,
}

impl RingConfig {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_bits` is 0 or greater than 20 (1M slots max), or
    /// if `max_readers` is 0 or greater than 64.
    pub const fn new(capacity_bits: u8, max_readers: usize) -> Self {
        assert!(
            capacity_bits > 0 && capacity_bits <= 20,
            "capacity_bits must be between 1 and 20 (max 1M slots)"
        );
        assert!(
            max_readers > 0 && max_readers <= 64,
            "max_readers must be between 1 and 64"
        );
        Self { capacity_bits, max_readers }
    }

    /// Returns the capacity of the ring buffer.
    #[inline]
    pub const fn capacity(&self) -> usize {
        1 << self.capacity_bits
    }

    /// Returns the mask used for index wrapping.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { capacity_bits: 8, max_readers: 16 }
    }
}

/// A small ring tuned for low-latency delivery (64 slots, few readers).
pub const LOW_LATENCY_CONFIG: RingConfig = RingConfig::new(6, 8);

/// A larger ring tuned for bursty producers or many attached readers.
pub const HIGH_THROUGHPUT_CONFIG: RingConfig = RingConfig::new(12, 32);
