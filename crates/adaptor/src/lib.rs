//! `SysfsAdaptor`: the producer thread that bridges kernel sysfs devices
//! into the dataflow engine.
//!
//! A `SysfsAdaptor` watches a set of `(path, path_id)` pairs in either
//! `SelectMode` (wait for fd readiness) or `IntervalMode` (fixed-cadence
//! poll), invoking a caller-supplied [`SampleProcessor`] on its own reader
//! thread. Cancellation is a self-pipe: writing one byte wakes the reader
//! out of its blocking `poll()` within one iteration.

mod config;
mod error;
mod invariants;
mod pipe;
mod reader;
mod state;
mod sysfs_adaptor;

pub use config::{PathSpec, PollMode, SysfsAdaptorConfig};
pub use error::AdaptorError;
pub use sysfs_adaptor::{SampleProcessor, SysfsAdaptor};
