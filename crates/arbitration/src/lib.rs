//! Node metadata, interval/range/standby-override arbitration, session
//! identity, and sensor-channel composition for sensord.
//!
//! [`NodeBase`] is the non-leaf participant in a sensor's filter chain: it
//! owns (or delegates upstream) a data-range list, an interval request
//! queue, and a standby-override request set, arbitrating between
//! concurrent per-session requests and calling into a concrete
//! [`ArbitrationHooks`] implementation when the effective value changes.
//! [`AbstractSensorChannel`] composes one or more `NodeBase`-backed bins
//! behind a single per-session reference-counted start/stop, and
//! [`SessionRegistry`] guarantees that tearing a session down removes every
//! request entry it ever posted, anywhere.

mod chain;
mod config;
mod error;
mod interval;
mod node;
mod range;
mod session;

pub use chain::AbstractSensorChannel;
pub use config::NodeConfig;
pub use error::NodeError;
pub use interval::IntervalRequest;
pub use node::{ArbitrationHooks, NoopHooks, NodeBase, RangeSource, StandbySource};
pub use range::{DataRange, DataRangeRequest};
pub use session::{SessionId, SessionRegistry, SessionTeardown, NO_SESSION};
