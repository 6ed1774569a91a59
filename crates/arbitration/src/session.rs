//! Session identity and the registry that guarantees teardown removes every
//! request entry a session ever posted.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

/// A client subscription identity; the unit of request ownership in
/// arbitration queues. `-1` (`NO_SESSION`) is the sentinel used by
/// `DataRangeRequest::default_for`/`IntervalRequest::default_for` for "no
/// session owns this value".
pub type SessionId = i32;

pub const NO_SESSION: SessionId = -1;

/// Implemented by any component that owns per-session request state
/// (chiefly [`crate::AbstractSensorChannel`]) so the registry can cascade a
/// session's teardown into it without knowing its concrete type.
pub trait SessionTeardown: Send + Sync {
    /// Removes every request entry keyed by `session` from this component.
    fn teardown_session(&self, session: SessionId);
}

/// Maps session ids to the set of channels they have touched, and cascades
/// `teardown` into every one of them.
///
/// Grounded on the teacher's `SpanCollector` registration pattern
/// (`register()`/producer-handle bookkeeping, generalized from "one
/// producer per collector" to "one session touching many channels").
pub struct SessionRegistry {
    next_id: AtomicI32,
    touched: Mutex<HashMap<SessionId, HashSet<String>>>,
    channels: Mutex<HashMap<String, Arc<dyn SessionTeardown>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(0),
            touched: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a channel under `name` so sessions touching it can be
    /// torn down by name. Re-registering the same name replaces the handle.
    pub fn register_channel(&self, name: impl Into<String>, channel: Arc<dyn SessionTeardown>) {
        self.channels.lock().unwrap_or_else(|e| e.into_inner()).insert(name.into(), channel);
    }

    /// Allocates a fresh session id, starting from 0 and counting up.
    pub fn open_session(&self) -> SessionId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Records that `session` has posted a request against `channel`, so
    /// that `teardown` knows to cascade into it later.
    pub fn touch(&self, session: SessionId, channel: impl Into<String>) {
        self.touched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(session)
            .or_default()
            .insert(channel.into());
    }

    /// Tears a session down: calls `teardown_session` on every channel it
    /// touched, then forgets the session entirely. Idempotent — tearing
    /// down a session with no recorded touches is a no-op.
    pub fn teardown(&self, session: SessionId) {
        let names = self.touched.lock().unwrap_or_else(|e| e.into_inner()).remove(&session);
        let Some(names) = names else { return };
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        for name in names {
            if let Some(channel) = channels.get(&name) {
                channel.teardown_session(session);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct RecordingChannel(AtomicBool);

    impl SessionTeardown for RecordingChannel {
        fn teardown_session(&self, _session: SessionId) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn teardown_cascades_only_to_touched_channels() {
        let registry = SessionRegistry::new();
        let touched_chan = Arc::new(RecordingChannel(AtomicBool::new(false)));
        let untouched_chan = Arc::new(RecordingChannel(AtomicBool::new(false)));
        registry.register_channel("accel", touched_chan.clone());
        registry.register_channel("gyro", untouched_chan.clone());

        let session = registry.open_session();
        registry.touch(session, "accel");
        registry.teardown(session);

        assert!(touched_chan.0.load(Ordering::SeqCst));
        assert!(!untouched_chan.0.load(Ordering::SeqCst));
    }

    #[test]
    fn teardown_of_unknown_session_is_a_no_op() {
        let registry = SessionRegistry::new();
        registry.teardown(42);
    }

    #[test]
    fn session_ids_are_distinct_and_increasing() {
        let registry = SessionRegistry::new();
        let a = registry.open_session();
        let b = registry.open_session();
        assert!(b > a);
    }
}
