//! The closed payload union samples carry (spec §3, §9).
//!
//! `Payload` is generic over none of the sensor types named in §1: every
//! concrete sensor channel picks exactly one variant and moves `Sample<Payload>`
//! end to end, rather than the engine being generic over `T` at the type level
//! the way `crates/ring`/`crates/pipeline` are. This mirrors how the original
//! `sensorfw` datatypes (`datatypes/*`, implied by §1's sensor list but not
//! filtered into the retrieval) are a closed set of small value types, not an
//! open generic payload.

/// Discrete device orientation, as reported by an orientation-interpreter
/// filter. The interpretation algorithm itself is out of scope (spec §1); only
/// the enum it produces is part of the engine's data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Undefined,
    TopUp,
    TopDown,
    LeftUp,
    RightUp,
    FaceUp,
    FaceDown,
}

/// Which axis/edge a tap was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapDirection {
    #[default]
    X,
    Y,
    Z,
}

/// Single vs double tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapType {
    #[default]
    Single,
    Double,
}

/// The closed tagged union of values a `Sample<Payload>` may carry.
///
/// `Copy` throughout: every variant is a handful of scalars, so samples move
/// through `RingBuffer`/`Sink`/`Source` by value with no heap allocation,
/// matching those crates' `T: Copy + Default` bound. The timestamp lives on
/// the enclosing `Sample`, not duplicated inside each variant, collapsing the
/// original's per-type timestamp fields into one place (see SPEC_FULL.md §1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    Scalar(u32),
    Signed(i32),
    Xyz { x: f64, y: f64, z: f64 },
    Pose(Orientation),
    Tap { direction: TapDirection, type_: TapType },
}

/// `RingBuffer`'s backing array is default-initialized before the producer
/// writes its first sample (spec §4.1); this default is never observed by a
/// reader (a reader's cursor never advances past the write index) and carries
/// no sensor meaning beyond "no value written here yet".
impl Default for Payload {
    fn default() -> Self {
        Payload::Scalar(0)
    }
}

/// Name and unit string for a `Payload` variant, for property/introspection
/// purposes (the original exposes this as a `type` string over D-Bus;
/// dropped by the distillation, supplemented here per SPEC_FULL.md §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadKind {
    pub name: &'static str,
    pub unit: &'static str,
}

impl Payload {
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Payload::Scalar(_) => PayloadKind { name: "scalar", unit: "count" },
            Payload::Signed(_) => PayloadKind { name: "signed", unit: "count" },
            Payload::Xyz { .. } => PayloadKind { name: "xyz", unit: "m/s^2" },
            Payload::Pose(_) => PayloadKind { name: "pose", unit: "enum" },
            Payload::Tap { .. } => PayloadKind { name: "tap", unit: "event" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_payload_is_the_zero_scalar_sentinel() {
        assert_eq!(Payload::default(), Payload::Scalar(0));
    }

    #[test]
    fn kind_names_and_units_are_stable_per_variant() {
        assert_eq!(Payload::Scalar(3).kind(), PayloadKind { name: "scalar", unit: "count" });
        assert_eq!(
            Payload::Xyz { x: 1.0, y: 2.0, z: 3.0 }.kind(),
            PayloadKind { name: "xyz", unit: "m/s^2" }
        );
        assert_eq!(Payload::Pose(Orientation::FaceUp).kind().name, "pose");
        assert_eq!(
            Payload::Tap { direction: TapDirection::Z, type_: TapType::Double }.kind().name,
            "tap"
        );
    }
}
