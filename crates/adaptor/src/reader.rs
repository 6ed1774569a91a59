//! The producer thread's main loop: either wait for fd readiness
//! (`SelectMode`) or sleep on a fixed cadence (`IntervalMode`), in both
//! cases interruptible within one iteration by the wakeup pipe.

use crate::config::PollMode;
use crate::SampleProcessor;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) struct ReaderContext {
    pub(crate) mode: PollMode,
    pub(crate) interval: Duration,
    pub(crate) seek: bool,
    /// `(path_id, fd)` pairs, in configured order.
    pub(crate) fds: Vec<(i32, RawFd)>,
    pub(crate) wakeup_read_fd: RawFd,
    pub(crate) processor: Arc<dyn SampleProcessor>,
    pub(crate) running: Arc<AtomicBool>,
}

pub(crate) fn run(ctx: ReaderContext) {
    match ctx.mode {
        PollMode::SelectMode => run_select(ctx),
        PollMode::IntervalMode => run_interval(ctx),
    }
}

/// Builds the `pollfd` array: index 0 is always the wakeup pipe, the rest
/// mirror `ctx.fds` in order.
fn poll_fds(ctx: &ReaderContext) -> Vec<libc::pollfd> {
    let mut fds = Vec::with_capacity(ctx.fds.len() + 1);
    fds.push(libc::pollfd { fd: ctx.wakeup_read_fd, events: libc::POLLIN, revents: 0 });
    for (_, fd) in &ctx.fds {
        fds.push(libc::pollfd { fd: *fd, events: libc::POLLIN, revents: 0 });
    }
    fds
}

fn rewind(fd: RawFd) {
    // Safety: `fd` is a valid open descriptor owned by this adaptor for the
    // duration of the reader loop.
    unsafe {
        libc::lseek(fd, 0, libc::SEEK_SET);
    }
}

fn timeout_millis(interval: Duration) -> libc::c_int {
    if interval.is_zero() {
        -1 // block indefinitely, matching "infinite if 0" (spec §4.5).
    } else {
        interval.as_millis().min(i64::from(i32::MAX) as u128) as libc::c_int
    }
}

fn poll_once(fds: &mut [libc::pollfd], timeout_ms: libc::c_int) -> i32 {
    // Safety: `fds` is a valid, correctly-sized array of `pollfd`.
    unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) }
}

fn run_select(ctx: ReaderContext) {
    let mut fds = poll_fds(&ctx);
    loop {
        if !ctx.running.load(Ordering::Acquire) {
            return;
        }
        for pfd in &mut fds {
            pfd.revents = 0;
        }
        let timeout = timeout_millis(ctx.interval);
        let rc = poll_once(&mut fds, timeout);
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            warn!(error = %err, "poll failed in SelectMode reader loop");
            continue;
        }

        if fds[0].revents & libc::POLLIN != 0 {
            drain_wakeup(ctx.wakeup_read_fd);
            if !ctx.running.load(Ordering::Acquire) {
                return;
            }
        }

        for (slot, (path_id, fd)) in fds[1..].iter().zip(ctx.fds.iter()) {
            if slot.revents & libc::POLLIN != 0 {
                ctx.processor.process_sample(*path_id, *fd);
                if ctx.seek {
                    rewind(*fd);
                }
            }
        }
    }
}

fn run_interval(ctx: ReaderContext) {
    // One `pollfd` entry: the wakeup pipe only. The timeout itself is the
    // interruptible sleep; no per-device readiness is awaited.
    let mut fds = [libc::pollfd { fd: ctx.wakeup_read_fd, events: libc::POLLIN, revents: 0 }];
    loop {
        if !ctx.running.load(Ordering::Acquire) {
            return;
        }
        fds[0].revents = 0;
        let timeout = timeout_millis(ctx.interval);
        let rc = poll_once(&mut fds, timeout);
        if rc < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            warn!(error = %err, "poll failed in IntervalMode reader loop");
            continue;
        }

        if rc > 0 && fds[0].revents & libc::POLLIN != 0 {
            drain_wakeup(ctx.wakeup_read_fd);
            if !ctx.running.load(Ordering::Acquire) {
                return;
            }
            continue;
        }

        // Timed out: the interval elapsed, so every path is sampled.
        for (path_id, fd) in &ctx.fds {
            ctx.processor.process_sample(*path_id, *fd);
            if ctx.seek {
                rewind(*fd);
            }
        }
    }
}

/// `fd` is the wakeup pipe's read end, which `WakeupPipe::new` puts in
/// `O_NONBLOCK` mode — without that, this loop would block forever on the
/// read after draining the last queued byte (a self-pipe with its write end
/// still open never reports EOF).
fn drain_wakeup(fd: RawFd) {
    let mut buf = [0u8; 64];
    loop {
        // Safety: `buf` is a valid, correctly-sized destination buffer.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n <= 0 {
            break;
        }
    }
    debug!("drained wakeup pipe");
}
