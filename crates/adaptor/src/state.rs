//! The adaptor's four-state lifecycle (spec §4.5):
//!
//! ```text
//! CLOSED ──open()──▶ OPENED ──startReader()──▶ RUNNING
//! RUNNING ──standby()──▶ STANDBY ──resume()──▶ RUNNING
//! RUNNING ──stopReader()──▶ OPENED ──close()──▶ CLOSED
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdaptorState {
    Closed,
    Opened,
    Running,
    Standby,
}
