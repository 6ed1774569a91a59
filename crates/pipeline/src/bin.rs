//! `Bin`: a named propagation-cycle scheduler.
//!
//! Generalizes the teacher's `RingReceiver` hybrid notify+poll-timer
//! consumer loop from "yield one `Stream` item" to "drain one input to a
//! fixed point, through a `Filter`, into a `Source` fan-out" — run on a
//! dedicated thread carrying a small current-thread Tokio runtime, exactly
//! the way the teacher's async primitives (`Notify`, `interval`) are used,
//! just driven synchronously instead of through `poll_next`.

#[cfg(debug_assertions)]
use crate::invariants::debug_assert_cycle_reached_fixed_point;
use crate::config::BinConfig;
use crate::connection::{BufferReader, Source};
use crate::filter::Filter;
use crate::lifecycle::BinLifecycle;
use std::sync::Mutex;
use std::thread::JoinHandle;
use tokio::time::interval;
use tracing::warn;

/// Type-erased start/stop/is_running handle over a `Bin<In, Out>`, so code
/// composing several differently-typed bins (e.g. `AbstractSensorChannel`)
/// can hold them in one `Vec<Arc<dyn BinHandle>>` without naming each bin's
/// sample types.
pub trait BinHandle: Send + Sync {
    fn start_ref(&self);
    fn stop_ref(&self);
    fn is_running(&self) -> bool;
}

impl<In, Out> BinHandle for std::sync::Arc<Bin<In, Out>>
where
    In: Copy + Default + Send + 'static,
    Out: Copy + Default + Send + 'static,
{
    fn start_ref(&self) {
        Bin::start(self);
    }
    fn stop_ref(&self) {
        Bin::stop(self);
    }
    fn is_running(&self) -> bool {
        Bin::is_running(self)
    }
}

/// A named stage: pulls samples from one `BufferReader`, runs them through a
/// `Filter`, and fans the results out through a `Source`.
pub struct Bin<In, Out> {
    name: String,
    input: BufferReader<In>,
    filter: Mutex<Box<dyn Filter<In, Out>>>,
    output: Source<Out>,
    lifecycle: BinLifecycle,
    config: BinConfig,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl<In, Out> Bin<In, Out>
where
    In: Copy + Default + Send + 'static,
    Out: Copy + Default + Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        input: BufferReader<In>,
        filter: Box<dyn Filter<In, Out>>,
        config: BinConfig,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            filter: Mutex::new(filter),
            output: Source::new(),
            lifecycle: BinLifecycle::new(),
            config,
            thread: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &Source<Out> {
        &self.output
    }

    pub fn lifecycle(&self) -> BinLifecycle {
        self.lifecycle.clone()
    }

    /// Drains `input` to a fixed point: runs every currently buffered sample
    /// through `filter`, propagating each non-dropped result, and repeats
    /// until a read comes back empty. Each individual read is capped at
    /// `config.batch_hint` samples, so one backlogged burst can't monopolize
    /// the dispatch thread for an unbounded stretch before the lifecycle
    /// wake/stop signal gets a chance to be observed between chunks.
    fn run_cycle(&self) {
        loop {
            let batch = match self.input.read_up_to(self.config.batch_hint) {
                Ok(batch) => batch,
                Err(err) => {
                    warn!(bin = %self.name, error = %err, "input reader cursor is invalid; ending cycle");
                    return;
                }
            };
            let last_len = batch.len();
            if batch.is_empty() {
                #[cfg(debug_assertions)]
                debug_assert_cycle_reached_fixed_point!(last_len);
                break;
            }
            let mut filter = self.filter.lock().unwrap_or_else(|e| e.into_inner());
            for sample in batch {
                if let Some(out) = filter.filter(sample) {
                    self.output.propagate(out.value, out.timestamp_us);
                }
            }
        }
    }
}

impl<In, Out> Bin<In, Out>
where
    In: Copy + Default + Send + 'static,
    Out: Copy + Default + Send + 'static,
{
    /// Starts this bin's dispatch thread if this is the first `start()` call
    /// since the last full stop (reference-counted: see `BinLifecycle`).
    pub fn start(self: &std::sync::Arc<Self>) {
        if !self.lifecycle.state.start() {
            return;
        }
        let this = self.clone();
        let handle = std::thread::Builder::new()
            .name(format!("bin-{}", this.name))
            .spawn(move || this.dispatch_loop())
            .expect("failed to spawn bin dispatch thread");
        *self.thread.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Releases one start reference; once the last reference is released the
    /// dispatch thread is woken, finishes its current cycle, and is joined.
    pub fn stop(&self) {
        if !self.lifecycle.state.stop() {
            return;
        }
        self.lifecycle.wake.notify_waiters();
        if let Some(handle) = self.thread.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    fn dispatch_loop(self: std::sync::Arc<Self>) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("failed to build bin runtime");
        runtime.block_on(async {
            let mut timer = interval(self.config.poll_interval);
            loop {
                self.run_cycle();
                if !self.lifecycle.is_running() {
                    break;
                }
                tokio::select! {
                    _ = self.input.notified() => {}
                    _ = timer.tick() => {}
                    _ = self.lifecycle.wake.notified() => {}
                }
                if !self.lifecycle.is_running() {
                    self.run_cycle();
                    break;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Sink;
    use crate::filter::MapFilter;
    use sensord_ring::RingConfig;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn propagation_cycle_doubles_values_end_to_end() {
        let sink_in = Sink::<u32>::new(RingConfig::new(4, 2));
        let source_in = crate::connection::Source::<u32>::new();
        source_in.connect(sink_in.clone());
        let reader = sink_in.reader().unwrap();

        let bin = Arc::new(Bin::new(
            "doubler",
            reader,
            Box::new(MapFilter::new(|v: u32| v * 2)),
            BinConfig::low_latency(),
        ));
        let out_sink = Sink::<u32>::new(RingConfig::default());
        bin.output().connect(out_sink.clone());
        let out_reader = out_sink.reader().unwrap();

        bin.start();
        for i in 1..=5u32 {
            source_in.propagate(i, i as u64);
        }
        std::thread::sleep(Duration::from_millis(50));
        bin.stop();

        let values: Vec<_> = out_reader.read_batch().unwrap().into_iter().map(|s| s.value).collect();
        assert_eq!(values, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn ref_counted_start_stop_keeps_thread_alive_until_last_release() {
        let sink_in = Sink::<u32>::new(RingConfig::default());
        let reader = sink_in.reader().unwrap();
        let bin = Arc::new(Bin::new(
            "passthrough",
            reader,
            Box::new(MapFilter::new(|v: u32| v)),
            BinConfig::default(),
        ));

        bin.start();
        bin.start();
        assert!(bin.is_running());
        bin.stop();
        assert!(bin.is_running());
        bin.stop();
        assert!(!bin.is_running());
    }
}
