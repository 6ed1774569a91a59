//! Configuration for node arbitration.
//!
//! Empty for now: arbitration has no tunable knobs yet (no timeouts, no
//! retry counts). Kept as a struct rather than omitted so a future tuning
//! parameter has somewhere to land without changing `NodeBase`'s
//! constructor signature.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {}
