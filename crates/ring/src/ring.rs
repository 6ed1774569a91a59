use crate::config::RingConfig;
use crate::error::RingError;
use crate::invariants::{
    debug_assert_bounded_lag, debug_assert_monotonic, debug_assert_reader_not_past_writer,
};
use crate::metrics::RingMetrics;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// One producer, many independent consumers. Each attached reader owns its
// own sequence counter instead of there being one shared `head`; the
// producer never waits on a reader and a slow reader only ever hurts
// itself (see lapping, below).
//
// ## Sequence numbers
//
// `write_pos` and every reader's `pos` are unbounded u64 counters, not
// wrapped indices — the slot is computed as `pos & mask` only at the point
// of access, exactly as the teacher's SPSC ring does.
//
// **Producer (write path):**
// 1. Load `write_pos` with Relaxed (only the producer writes it).
// 2. Write the value into `buffer[write_pos & mask]` (no ordering needed —
//    no reader can observe the slot until `write_pos` is published).
// 3. Store the incremented `write_pos` with Release.
//
// **Consumer (read path):**
// 1. Load `write_pos` with Acquire (synchronizes with the producer's store).
// 2. Load its own `pos` with Relaxed (only this reader writes its own `pos`).
// 3. If lapped (writer has advanced more than `capacity` ahead), clamp `pos`
//    forward to `write_pos - capacity` and record the skipped count as drops.
// 4. Read `buffer[pos & mask]`.
// 5. Store the incremented `pos` with Relaxed — no other thread depends on
//    reader progress, so no Release is needed here.
//
// =============================================================================

#[repr(align(64))]
struct CacheAligned<T>(T);

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

struct ReaderState {
    pos: AtomicU64,
    drops: AtomicU64,
    /// Cleared by `detach`; checked by `read` so a reader that keeps a
    /// handle alive past detaching observes `InvalidCursor` instead of
    /// silently continuing to read.
    attached: AtomicBool,
}

/// A handle returned by [`RingBuffer::attach`].
///
/// Dropping the handle does not detach it; call [`RingBuffer::detach`]
/// explicitly (the bin/session layer above owns the lifecycle decision).
pub struct ReaderHandle {
    id: u32,
    state: Arc<CacheAligned<ReaderState>>,
}

impl ReaderHandle {
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Lock-free single-producer / multi-consumer ring buffer.
///
/// Exactly one thread is expected to call [`RingBuffer::write`]; any number
/// of threads may each hold a [`ReaderHandle`] and call
/// [`RingBuffer::read`]/[`RingBuffer::read_batch`] concurrently, each
/// tracking its own position independently. A reader that falls more than
/// `capacity` samples behind the writer is lapped: its cursor is advanced to
/// the oldest still-available sample and the skipped count is added to its
/// drop counter (see spec property 1 / scenario S1).
pub struct RingBuffer<T> {
    config: RingConfig,
    write_pos: CacheAligned<AtomicU64>,
    buffer: UnsafeCell<Box<[T]>>,
    readers: Mutex<Vec<Option<Arc<CacheAligned<ReaderState>>>>>,
    metrics: RingMetrics,
}

unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T: Copy + Default> RingBuffer<T> {
    pub fn new(config: RingConfig) -> Self {
        let capacity = config.capacity();
        let buffer = vec![T::default(); capacity].into_boxed_slice();
        Self {
            config,
            write_pos: CacheAligned(AtomicU64::new(0)),
            buffer: UnsafeCell::new(buffer),
            readers: Mutex::new(Vec::new()),
            metrics: RingMetrics::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    #[inline]
    fn mask(&self) -> usize {
        self.config.mask()
    }

    pub fn metrics(&self) -> &RingMetrics {
        &self.metrics
    }

    /// Attaches a new reader, starting from the current write position — a
    /// newly attached reader only observes samples written after this call,
    /// matching a fresh session subscribing to a live channel.
    pub fn attach(&self) -> Result<ReaderHandle, RingError> {
        let mut readers = self.readers.lock().unwrap_or_else(|e| e.into_inner());
        let start = self.write_pos.load(Ordering::Acquire);
        let state = Arc::new(CacheAligned(ReaderState {
            pos: AtomicU64::new(start),
            drops: AtomicU64::new(0),
            attached: AtomicBool::new(true),
        }));

        if let Some(id) = readers.iter().position(|slot| slot.is_none()) {
            readers[id] = Some(state.clone());
            return Ok(ReaderHandle { id: id as u32, state });
        }

        if readers.len() >= self.config.max_readers {
            return Err(RingError::TooManyReaders { max: self.config.max_readers });
        }
        let id = readers.len() as u32;
        readers.push(Some(state.clone()));
        Ok(ReaderHandle { id, state })
    }

    /// Detaches a reader; subsequent writes no longer track its lag.
    pub fn detach(&self, handle: &ReaderHandle) -> Result<(), RingError> {
        let mut readers = self.readers.lock().unwrap_or_else(|e| e.into_inner());
        let slot = readers
            .get_mut(handle.id as usize)
            .ok_or(RingError::UnknownReader(handle.id))?;
        if slot.is_none() {
            return Err(RingError::UnknownReader(handle.id));
        }
        handle.state.attached.store(false, Ordering::Release);
        *slot = None;
        Ok(())
    }

    /// Writes one value, overwriting the oldest slot if the ring is full.
    ///
    /// Single-producer only: calling this from more than one thread
    /// concurrently is a logic error (undetected in release builds, matching
    /// the teacher's SPSC contract).
    pub fn write(&self, value: T) {
        let pos = self.write_pos.load(Ordering::Relaxed);
        let idx = pos as usize & self.mask();
        // Safety: no reader can observe slot `idx` at position `pos` until
        // `write_pos` is published below, and this is the only writer.
        unsafe {
            (*self.buffer.get())[idx] = value;
        }
        let new_pos = pos + 1;
        debug_assert_monotonic!("write_pos", pos, new_pos);
        self.write_pos.store(new_pos, Ordering::Release);
        self.metrics.record_write();
    }

    /// Reads the next sample for `handle`, if one is available.
    ///
    /// Returns `Ok(None)` if the reader is caught up with the writer, or
    /// `Err(RingError::InvalidCursor)` if `handle` was detached (spec §4.1).
    /// Advances (and, if lapped, first fast-forwards) the reader's cursor.
    pub fn read(&self, handle: &ReaderHandle) -> Result<Option<T>, RingError> {
        if !handle.state.attached.load(Ordering::Acquire) {
            return Err(RingError::InvalidCursor(handle.id));
        }

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let mut pos = handle.state.pos.load(Ordering::Relaxed);

        if pos == write_pos {
            return Ok(None);
        }

        let capacity = self.capacity() as u64;
        let lag = write_pos.wrapping_sub(pos);
        if lag > capacity {
            let skipped = lag - capacity;
            handle.state.drops.fetch_add(skipped, Ordering::Relaxed);
            self.metrics.record_drops(skipped);
            pos = write_pos - capacity;
            debug_assert_bounded_lag!(write_pos.wrapping_sub(pos), capacity);
        }

        let idx = pos as usize & self.mask();
        // Safety: `pos` is within `[write_pos - capacity, write_pos)`, which
        // is exactly the range the producer guarantees is initialized and
        // will not be overwritten until the writer advances `capacity` more
        // slots past it.
        let value = unsafe { (*self.buffer.get())[idx] };

        let new_pos = pos + 1;
        debug_assert_reader_not_past_writer!(new_pos, write_pos);
        debug_assert_monotonic!("reader_pos", pos, new_pos);
        handle.state.pos.store(new_pos, Ordering::Relaxed);
        self.metrics.record_read();
        Ok(Some(value))
    }

    /// Drains every currently available sample for `handle` into `out`,
    /// returning the number of samples appended, or `InvalidCursor` if
    /// `handle` was detached.
    pub fn read_batch(&self, handle: &ReaderHandle, out: &mut Vec<T>) -> Result<usize, RingError> {
        self.read_up_to(handle, usize::MAX, out)
    }

    /// Like [`RingBuffer::read_batch`], but stops after appending `max`
    /// samples even if more are available — lets a caller bound how much
    /// work one drain does before yielding.
    pub fn read_up_to(&self, handle: &ReaderHandle, max: usize, out: &mut Vec<T>) -> Result<usize, RingError> {
        let mut count = 0;
        while count < max {
            match self.read(handle)? {
                Some(value) => {
                    out.push(value);
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    /// Number of samples dropped (lapped) for a given reader so far.
    pub fn dropped_count(&self, handle: &ReaderHandle) -> u64 {
        handle.state.drops.load(Ordering::Relaxed)
    }

    /// Number of currently unread samples available to `handle`.
    pub fn available(&self, handle: &ReaderHandle) -> u64 {
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let pos = handle.state.pos.load(Ordering::Relaxed);
        write_pos.wrapping_sub(pos).min(self.capacity() as u64)
    }
}
