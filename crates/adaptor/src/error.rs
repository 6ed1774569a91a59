//! Error types for the sysfs adaptor runtime.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdaptorError {
    /// Opening one of the configured paths failed; `openFds` aborts and
    /// closes any descriptors it had already opened (spec §4.5 failure
    /// model).
    #[error("failed to open {path}: {source}")]
    DeviceOpen { path: String, #[source] source: std::io::Error },

    /// A transient read failure on a monitored fd. Logged and ignored by
    /// the reader loop; surfaced here only for adaptors that want to
    /// inspect it (e.g. via `SysfsAdaptor::read_from_file`).
    #[error("read failed: {0}")]
    DeviceRead(#[source] std::io::Error),

    /// The wakeup self-pipe could not be created.
    #[error("failed to create wakeup pipe: {0}")]
    WakeupPipe(#[source] std::io::Error),

    /// `poll(2)` itself failed (not a per-fd readiness condition).
    #[error("poll failed: {0}")]
    Poll(#[source] std::io::Error),
}
