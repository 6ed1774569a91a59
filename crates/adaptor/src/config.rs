//! Configuration for a [`crate::SysfsAdaptor`].

use std::time::Duration;

/// One monitored sysfs path and the identifier passed back to
/// `process_sample` for it. "Currently files are indexed only by their
/// adding order" in the original; here the id is explicit up front instead.
#[derive(Debug, Clone)]
pub struct PathSpec {
    pub path: String,
    pub path_id: i32,
}

impl PathSpec {
    pub fn new(path: impl Into<String>, path_id: i32) -> Self {
        Self { path: path.into(), path_id }
    }
}

/// Monitoring strategy (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Wait for readiness notification from the driver before reading.
    SelectMode,
    /// Read at a fixed interval regardless of readiness.
    IntervalMode,
}

#[derive(Debug, Clone)]
pub struct SysfsAdaptorConfig {
    pub paths: Vec<PathSpec>,
    pub mode: PollMode,
    /// Whether to `lseek` back to the start of each fd after every read.
    /// Most sysfs attribute files report EOF after one read and must be
    /// rewound to see the next value.
    pub seek: bool,
    /// Interval between reads in `IntervalMode`, and the `poll()` timeout
    /// in `SelectMode` (0 = wait indefinitely).
    pub interval: Duration,
}

impl SysfsAdaptorConfig {
    pub fn new(paths: Vec<PathSpec>, mode: PollMode) -> Self {
        Self { paths, mode, seek: true, interval: Duration::ZERO }
    }

    pub fn with_seek(mut self, seek: bool) -> Self {
        self.seek = seek;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
