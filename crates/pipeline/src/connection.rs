//! `Source`/`Sink` connection points and the `BufferReader` pull handle.
//!
//! Mirrors the original engine's shape rather than the teacher's MPSC
//! channel: a `Sink<T>` owns the ring buffer a producer writes into, and a
//! `Source<T>` is purely a fan-out registry of connected sinks — connecting
//! N sinks to one source gives each downstream consumer its own ring and
//! its own backpressure, so one slow consumer never blocks another (see
//! `sensord-ring`'s per-reader lapping instead of a single shared cursor).

#[cfg(debug_assertions)]
use crate::invariants::debug_assert_data_notified;
use crate::error::PipelineError;
use futures_core::Stream;
use sensord_ring::{ReaderHandle, RingBuffer, RingConfig, Sample};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::Notify;

/// A synchronous readiness callback, for contexts that cannot `.await` a
/// `tokio::sync::Notify` — e.g. a plain `std::thread` adaptor loop that
/// wants to wake a bin without pulling in an async runtime itself.
pub trait DataEmitter: Send + Sync {
    fn data_available(&self);
}

/// The input side of a connection: owns the ring buffer a producer writes
/// samples into, and admits readers that pull from it.
pub struct Sink<T> {
    ring: Arc<RingBuffer<Sample<T>>>,
    notify: Arc<Notify>,
    emitters: Mutex<Vec<Arc<dyn DataEmitter>>>,
}

impl<T: Copy + Default> Sink<T> {
    pub fn new(config: RingConfig) -> Arc<Self> {
        Arc::new(Self {
            ring: Arc::new(RingBuffer::new(config)),
            notify: Arc::new(Notify::new()),
            emitters: Mutex::new(Vec::new()),
        })
    }

    /// Attaches a new pull-based reader to this sink's ring buffer.
    pub fn reader(&self) -> Result<BufferReader<T>, PipelineError> {
        let handle = self.ring.attach()?;
        Ok(BufferReader { ring: self.ring.clone(), handle, notify: self.notify.clone() })
    }

    /// Registers a synchronous readiness callback, invoked after every push.
    pub fn register_emitter(&self, emitter: Arc<dyn DataEmitter>) {
        self.emitters.lock().unwrap_or_else(|e| e.into_inner()).push(emitter);
    }

    /// Writes one sample and wakes every waiting reader.
    pub fn push(&self, sample: Sample<T>) {
        self.ring.write(sample);
        self.notify.notify_waiters();
        #[cfg(debug_assertions)]
        debug_assert_data_notified!(true, true);
        for emitter in self.emitters.lock().unwrap_or_else(|e| e.into_inner()).iter() {
            emitter.data_available();
        }
    }

    pub fn dropped_count(&self, reader: &BufferReader<T>) -> u64 {
        self.ring.dropped_count(&reader.handle)
    }
}

/// The output side of a connection: a fan-out registry of connected sinks.
pub struct Source<T> {
    sinks: Mutex<Vec<Arc<Sink<T>>>>,
}

impl<T: Copy + Default> Source<T> {
    pub fn new() -> Self {
        Self { sinks: Mutex::new(Vec::new()) }
    }

    pub fn connect(&self, sink: Arc<Sink<T>>) {
        self.sinks.lock().unwrap_or_else(|e| e.into_inner()).push(sink);
    }

    pub fn disconnect(&self, sink: &Arc<Sink<T>>) {
        self.sinks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|s| !Arc::ptr_eq(s, sink));
    }

    /// Pushes one value to every connected sink.
    pub fn propagate(&self, value: T, timestamp_us: u64) {
        let sample = Sample::new(value, timestamp_us);
        for sink in self.sinks.lock().unwrap_or_else(|e| e.into_inner()).iter() {
            sink.push(sample);
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<T: Copy + Default> Default for Source<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A pull handle over one sink's ring buffer.
pub struct BufferReader<T> {
    ring: Arc<RingBuffer<Sample<T>>>,
    handle: ReaderHandle,
    notify: Arc<Notify>,
}

impl<T: Copy + Default> BufferReader<T> {
    /// Drains every currently available sample.
    ///
    /// Fails with `PipelineError::Ring(RingError::InvalidCursor)` if this
    /// reader's cursor has been detached out from under it (spec §4.1
    /// failure model).
    pub fn read_batch(&self) -> Result<Vec<Sample<T>>, PipelineError> {
        let mut out = Vec::new();
        self.ring.read_batch(&self.handle, &mut out)?;
        Ok(out)
    }

    /// Like [`BufferReader::read_batch`], bounded to at most `max` samples
    /// per call (see [`crate::BinConfig::batch_hint`]).
    pub fn read_up_to(&self, max: usize) -> Result<Vec<Sample<T>>, PipelineError> {
        let mut out = Vec::new();
        self.ring.read_up_to(&self.handle, max, &mut out)?;
        Ok(out)
    }

    /// Resolves once new data has arrived since the last call, or has
    /// already arrived and not yet been observed via this call.
    pub async fn notified(&self) {
        self.notify.notified().await;
    }

    pub fn dropped_count(&self) -> u64 {
        self.ring.dropped_count(&self.handle)
    }

    pub fn available(&self) -> u64 {
        self.ring.available(&self.handle)
    }
}

/// `BufferReader` never ends (a live sensor feed has no natural EOF);
/// polling it after the sink is dropped would simply never wake again.
/// Mirrors the teacher's `RingReceiver::poll_next` hybrid of "try a direct
/// read first, then await the data notify" without its batching or
/// shutdown-drain machinery, which `Bin`'s pull-based `read_batch` already
/// covers for in-process consumers.
impl<T: Copy + Default> Stream for BufferReader<T> {
    type Item = Sample<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.ring.read(&this.handle) {
            Ok(Some(value)) => return Poll::Ready(Some(value)),
            Ok(None) => {}
            // A detached cursor never un-detaches; the stream is over.
            Err(_) => return Poll::Ready(None),
        }

        let notified = this.notify.notified();
        tokio::pin!(notified);
        match notified.as_mut().poll(cx) {
            Poll::Ready(()) => match this.ring.read(&this.handle) {
                Ok(Some(value)) => Poll::Ready(Some(value)),
                Ok(None) => {
                    cx.waker().wake_by_ref();
                    Poll::Pending
                }
                Err(_) => Poll::Ready(None),
            },
            Poll::Pending => Poll::Pending,
        }
    }
}
