use thiserror::Error;

/// Errors produced by [`crate::RingBuffer`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RingError {
    /// `attach` was called but the ring already has `max_readers` cursors
    /// attached.
    #[error("ring already has the maximum of {max} readers attached")]
    TooManyReaders { max: usize },

    /// An operation referenced a reader cursor that was never attached, or
    /// was already detached.
    #[error("reader cursor {0} is not attached to this ring")]
    UnknownReader(u32),

    /// `read`/`read_batch` was called against a handle whose cursor has
    /// been detached (spec §4.1 failure model: "attempting to read past a
    /// detached reader fails with InvalidCursor").
    #[error("reader cursor {0} is detached")]
    InvalidCursor(u32),
}
