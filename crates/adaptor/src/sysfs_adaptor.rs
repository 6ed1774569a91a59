use crate::config::{PathSpec, SysfsAdaptorConfig};
use crate::error::AdaptorError;
use crate::invariants::debug_assert_ref_count_nonnegative;
use crate::pipe::WakeupPipe;
use crate::reader::{self, ReaderContext};
use crate::state::AdaptorState;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tracing::warn;

/// Supplied by the concrete adaptor (out of scope for this engine): reads
/// bytes from `fd`, parses them, timestamps with the monotonic clock, and
/// writes one or more samples into its own ring buffer. This is the only
/// producer-thread work permitted inside the engine (spec §4.5).
pub trait SampleProcessor: Send + Sync {
    fn process_sample(&self, path_id: i32, fd: RawFd);
}

/// A device producer: watches one or more sysfs file descriptors in either
/// `SelectMode` (interrupt-driven) or `IntervalMode` (polled) and invokes
/// [`SampleProcessor::process_sample`] on a dedicated reader thread.
///
/// Reference-counted start/stop: only the 0→1 `start_adaptor` transition
/// opens file descriptors and launches the thread; only the matching 1→0
/// `stop_adaptor` transition tears it down. This lets many sensor channels
/// share one physical device.
pub struct SysfsAdaptor {
    name: String,
    config: SysfsAdaptorConfig,
    processor: Arc<dyn SampleProcessor>,
    state: Mutex<AdaptorState>,
    start_count: AtomicUsize,
    open_fds: Mutex<Vec<RawFd>>,
    wakeup: Mutex<Option<WakeupPipe>>,
    running: Arc<AtomicBool>,
    reader_thread: Mutex<Option<JoinHandle<()>>>,
}

impl SysfsAdaptor {
    pub fn new(
        name: impl Into<String>,
        config: SysfsAdaptorConfig,
        processor: Arc<dyn SampleProcessor>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            config,
            processor,
            state: Mutex::new(AdaptorState::Closed),
            start_count: AtomicUsize::new(0),
            open_fds: Mutex::new(Vec::new()),
            wakeup: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
            reader_thread: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock().unwrap_or_else(|e| e.into_inner()), AdaptorState::Running)
    }

    pub fn is_standby(&self) -> bool {
        matches!(*self.state.lock().unwrap_or_else(|e| e.into_inner()), AdaptorState::Standby)
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.lock().unwrap_or_else(|e| e.into_inner()), AdaptorState::Closed)
    }

    /// Increments the start reference count; only the 0→1 transition opens
    /// file descriptors and launches the reader thread. Returns `false` if
    /// that transition's `openFds` failed (all partially opened
    /// descriptors are closed first).
    pub fn start_adaptor(self: &Arc<Self>) -> bool {
        if self.start_count.fetch_add(1, Ordering::AcqRel) > 0 {
            return true;
        }
        if let Err(err) = self.open_fds() {
            warn!(adaptor = self.name, error = %err, "failed to open adaptor file descriptors");
            self.start_count.store(0, Ordering::Release);
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = AdaptorState::Closed;
            return false;
        }
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = AdaptorState::Opened;
        self.start_reader_thread();
        true
    }

    /// Decrements the start reference count; only the 1→0 transition stops
    /// the reader thread and closes file descriptors.
    pub fn stop_adaptor(&self) {
        let prev = self.start_count.fetch_sub(1, Ordering::AcqRel);
        debug_assert_ref_count_nonnegative!(prev);
        if prev != 1 {
            return;
        }
        self.stop_reader_thread();
        self.close_all_fds();
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = AdaptorState::Closed;
    }

    /// Requests the device enter a low-power suspended state. The caller
    /// (typically `NodeBase`'s standby cascade) is responsible for not
    /// calling this while a standby-override request is active.
    pub fn standby(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != AdaptorState::Running {
            return false;
        }
        *state = AdaptorState::Standby;
        true
    }

    pub fn resume(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state != AdaptorState::Standby {
            return false;
        }
        *state = AdaptorState::Running;
        true
    }

    fn open_fds(&self) -> Result<(), AdaptorError> {
        let mut fds = Vec::with_capacity(self.config.paths.len());
        for PathSpec { path, .. } in &self.config.paths {
            match open_path(path) {
                Ok(fd) => fds.push(fd),
                Err(source) => {
                    for fd in fds {
                        // Safety: each `fd` was just opened by us above and
                        // is not shared with any other owner yet.
                        unsafe {
                            libc::close(fd);
                        }
                    }
                    return Err(AdaptorError::DeviceOpen { path: path.clone(), source });
                }
            }
        }
        *self.open_fds.lock().unwrap_or_else(|e| e.into_inner()) = fds;
        Ok(())
    }

    fn close_all_fds(&self) {
        let mut fds = self.open_fds.lock().unwrap_or_else(|e| e.into_inner());
        for fd in fds.drain(..) {
            // Safety: each `fd` was opened by `open_fds` and is owned
            // exclusively by this adaptor.
            unsafe {
                libc::close(fd);
            }
        }
    }

    fn start_reader_thread(self: &Arc<Self>) {
        let wakeup = match WakeupPipe::new() {
            Ok(w) => w,
            Err(err) => {
                warn!(adaptor = self.name, error = %err, "failed to create wakeup pipe");
                return;
            }
        };
        let wakeup_read_fd = wakeup.read_fd();
        *self.wakeup.lock().unwrap_or_else(|e| e.into_inner()) = Some(wakeup);

        let fds: Vec<(i32, RawFd)> = self
            .config
            .paths
            .iter()
            .zip(self.open_fds.lock().unwrap_or_else(|e| e.into_inner()).iter())
            .map(|(spec, fd)| (spec.path_id, *fd))
            .collect();

        self.running.store(true, Ordering::Release);
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = AdaptorState::Running;

        let ctx = ReaderContext {
            mode: self.config.mode,
            interval: self.config.interval,
            seek: self.config.seek,
            fds,
            wakeup_read_fd,
            processor: self.processor.clone(),
            running: self.running.clone(),
        };
        let name = self.name.clone();
        let handle = std::thread::Builder::new()
            .name(format!("adaptor-{name}"))
            .spawn(move || reader::run(ctx))
            .expect("failed to spawn adaptor reader thread");
        *self.reader_thread.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    fn stop_reader_thread(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(wakeup) = self.wakeup.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            wakeup.wake();
        }
        if let Some(handle) = self.reader_thread.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = handle.join();
        }
        *self.wakeup.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Writes `content` to `path`. Utility for concrete adaptors that need
    /// to poke a sysfs control file (e.g. enabling a device before polling
    /// it) — carried forward as an adaptor-level utility, not engine-internal
    /// plumbing (spec §4.5).
    pub fn write_to_file(path: &str, content: &[u8]) -> bool {
        match std::fs::write(path, content) {
            Ok(()) => true,
            Err(err) => {
                warn!(path, error = %err, "writeToFile failed");
                false
            }
        }
    }

    /// Reads the full contents of `path`.
    pub fn read_from_file(path: &str) -> Result<Vec<u8>, AdaptorError> {
        std::fs::read(path).map_err(AdaptorError::DeviceRead)
    }
}

fn open_path(path: &str) -> Result<RawFd, std::io::Error> {
    let c_path = std::ffi::CString::new(path)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "path contains NUL"))?;
    // Safety: `c_path` is a valid NUL-terminated string for the duration of
    // this call.
    let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY) };
    if fd < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(fd)
}
