//! Top-level `sensord` crate: the closed sample payload union, the
//! construction-time property-map parser, the rotatable log-level gate, and
//! the glue that wires a `SysfsAdaptor` through a `Bin` into an
//! `AbstractSensorChannel` for the `demos/demo` binary.
//!
//! The dataflow and arbitration primitives themselves live one layer down,
//! in `sensord-ring`, `sensord-pipeline`, `sensord-arbitration`, and
//! `sensord-adaptor`; this crate is where they get assembled into something
//! resembling one real sensor channel, the way `span_collector`'s `lib.rs`
//! re-exports its module types and its `bin/demo.rs` assembles a complete
//! export pipeline out of them.

pub mod channel;
pub mod log;
pub mod payload;
pub mod property;

pub use channel::{build_accelerometer_channel, AccelChannel, ChangeGateFilter, DeviceBin};
pub use log::LogLevel;
pub use payload::{Orientation, Payload, PayloadKind, TapDirection, TapType};
pub use property::{
    apply_property_map, get_property_map, PropertySettable, PROP_NAME_VALUE_SEPARATOR, PROP_STRING_SEPARATOR,
    TYPE_SEPARATOR,
};
