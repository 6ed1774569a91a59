//! Four-level, globally-rotatable log gate layered on top of `tracing`.
//!
//! Grounded on `original_source/sensord/logging.cpp`: a single process-wide
//! `outputLevel` (starts at `Warning`), a line is only emitted if its level
//! is `>= outputLevel` (`printLog = level >= outputLevel`), and a signal
//! handler rotates `outputLevel` cyclically through the four levels. The
//! teacher's workspace carries no logging crate of its own (spec §9 "Global
//! singletons" calls for a process-wide atomic rather than hidden module
//! state regardless), so `tracing` is the sink and this module is the gate.

use std::sync::atomic::{AtomicU8, Ordering};

/// Monotone log levels (spec §6): `Test < Debug < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Test = 0,
    Debug = 1,
    Warning = 2,
    Critical = 3,
}

const LEVEL_COUNT: u8 = 4;

impl LogLevel {
    const fn from_u8(v: u8) -> Self {
        match v % LEVEL_COUNT {
            0 => LogLevel::Test,
            1 => LogLevel::Debug,
            2 => LogLevel::Warning,
            _ => LogLevel::Critical,
        }
    }
}

/// The original's `outputLevel` starts at `SensordLogWarning`.
static OUTPUT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warning as u8);

/// Reads the current process-wide minimum level.
pub fn output_level() -> LogLevel {
    LogLevel::from_u8(OUTPUT_LEVEL.load(Ordering::Acquire))
}

/// Sets the process-wide minimum level directly.
pub fn set_output_level(level: LogLevel) {
    OUTPUT_LEVEL.store(level as u8, Ordering::Release);
}

/// Rotates the minimum level cyclically: `Test -> Debug -> Warning ->
/// Critical -> Test`, mirroring the original's `SIGUSR1` handler. Returns
/// the new level.
pub fn rotate_output_level() -> LogLevel {
    let next = LogLevel::from_u8(OUTPUT_LEVEL.load(Ordering::Acquire).wrapping_add(1) % LEVEL_COUNT);
    OUTPUT_LEVEL.store(next as u8, Ordering::Release);
    next
}

/// `printLog = level >= outputLevel`: whether a line at `level` would
/// actually be emitted right now.
pub fn enabled(level: LogLevel) -> bool {
    level >= output_level()
}

/// Gates on the process-wide level, then emits through the matching
/// `tracing` macro. A no-op below the current `output_level()`, exactly as
/// the original's destructor checks `printLog` before writing anything.
#[macro_export]
macro_rules! sensord_log {
    ($level:expr, $($arg:tt)*) => {{
        if $crate::log::enabled($level) {
            match $level {
                $crate::log::LogLevel::Test => ::tracing::trace!($($arg)*),
                $crate::log::LogLevel::Debug => ::tracing::debug!($($arg)*),
                $crate::log::LogLevel::Warning => ::tracing::warn!($($arg)*),
                $crate::log::LogLevel::Critical => ::tracing::error!($($arg)*),
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // `OUTPUT_LEVEL` is process-global; serialize these tests so they don't
    // observe each other's rotations.
    static GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn starts_at_warning() {
        let _g = GUARD.lock().unwrap();
        set_output_level(LogLevel::Warning);
        assert_eq!(output_level(), LogLevel::Warning);
    }

    #[test]
    fn enabled_gates_on_ordering() {
        let _g = GUARD.lock().unwrap();
        set_output_level(LogLevel::Warning);
        assert!(!enabled(LogLevel::Debug));
        assert!(enabled(LogLevel::Warning));
        assert!(enabled(LogLevel::Critical));
    }

    #[test]
    fn rotation_wraps_cyclically() {
        let _g = GUARD.lock().unwrap();
        set_output_level(LogLevel::Test);
        assert_eq!(rotate_output_level(), LogLevel::Debug);
        assert_eq!(rotate_output_level(), LogLevel::Warning);
        assert_eq!(rotate_output_level(), LogLevel::Critical);
        assert_eq!(rotate_output_level(), LogLevel::Test);
    }
}
