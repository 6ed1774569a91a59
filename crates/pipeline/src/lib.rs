//! Dataflow connections, filters, and propagation scheduling for sensord.
//!
//! - [`Source`]/[`Sink`] are the two halves of a connection: a `Source` fans
//!   out to any number of connected `Sink`s, each of which owns its own
//!   ring buffer and therefore its own independent backpressure.
//! - [`Filter`] is a pure (non-blocking) transform between two sample types.
//! - [`Bin`] ties a `BufferReader` input, a `Filter`, and a `Source` output
//!   together into a reference-counted, independently start/stop-able
//!   dispatch unit that drains its input to a fixed point on every wakeup.

mod bin;
mod config;
mod connection;
mod error;
mod filter;
mod invariants;
mod lifecycle;

pub use bin::{Bin, BinHandle};
pub use config::BinConfig;
pub use connection::{BufferReader, DataEmitter, Sink, Source};
pub use error::PipelineError;
pub use filter::{Filter, MapFilter};
pub use lifecycle::BinLifecycle;
