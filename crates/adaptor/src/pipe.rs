//! The wakeup self-pipe: writing one byte from any thread causes the reader
//! thread's blocking `poll`/sleep to return within one iteration.

use crate::error::AdaptorError;
use std::os::unix::io::RawFd;

pub(crate) struct WakeupPipe {
    read_fd: RawFd,
    write_fd: RawFd,
}

impl WakeupPipe {
    pub(crate) fn new() -> Result<Self, AdaptorError> {
        let mut fds = [0; 2];
        // Safety: `fds` is a valid, correctly-sized out-parameter.
        let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
        if rc != 0 {
            return Err(AdaptorError::WakeupPipe(std::io::Error::last_os_error()));
        }
        let pipe = Self { read_fd: fds[0], write_fd: fds[1] };
        // Both ends must be non-blocking: the read end's drain loop keeps
        // reading until it sees EAGAIN, and on a blocking fd it would wait
        // forever once the last queued byte is consumed instead (there is
        // no EOF on a self-pipe whose write end stays open).
        set_nonblocking(pipe.read_fd)?;
        set_nonblocking(pipe.write_fd)?;
        Ok(pipe)
    }

    pub(crate) fn read_fd(&self) -> RawFd {
        self.read_fd
    }

    /// Wakes the reader thread. Safe to call from any thread, any number of
    /// times; the reader drains whatever bytes accumulate.
    pub(crate) fn wake(&self) {
        let byte = [0u8; 1];
        // Safety: `write_fd` is valid for the pipe's lifetime; a short
        // write/EINTR/EAGAIN here just means "try again never" is
        // acceptable — the reader only needs at least one wakeup byte
        // queued, not exactly one.
        unsafe {
            libc::write(self.write_fd, byte.as_ptr().cast(), 1);
        }
    }
}

/// Sets `O_NONBLOCK` on `fd` via `fcntl`, without disturbing any other flag.
fn set_nonblocking(fd: RawFd) -> Result<(), AdaptorError> {
    // Safety: `fd` is a valid descriptor owned by this pipe.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(AdaptorError::WakeupPipe(std::io::Error::last_os_error()));
    }
    // Safety: `fd` is a valid descriptor owned by this pipe.
    let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(AdaptorError::WakeupPipe(std::io::Error::last_os_error()));
    }
    Ok(())
}

impl Drop for WakeupPipe {
    fn drop(&mut self) {
        // Safety: both fds were opened by `pipe(2)` in `new` and are not
        // shared with any other owner.
        unsafe {
            libc::close(self.read_fd);
            libc::close(self.write_fd);
        }
    }
}
