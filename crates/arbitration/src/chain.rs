//! `AbstractSensorChannel`: per-session reference-counted start/stop over a
//! composed set of bins, routing control calls into a `NodeBase`.

use crate::node::NodeBase;
use crate::session::{SessionId, SessionTeardown};
use sensord_pipeline::BinHandle;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Composes one or more bins behind a single `NodeBase` and exposes
/// per-session `start`/`stop`/`set_interval`/`set_data_range`/
/// `set_standby_override` — only the 0→1 session transition actually starts
/// the underlying producer chain (spec §4.7).
pub struct AbstractSensorChannel {
    name: String,
    node: Arc<NodeBase>,
    bins: Vec<Arc<dyn BinHandle>>,
    started: Mutex<HashSet<SessionId>>,
}

impl AbstractSensorChannel {
    pub fn new(name: impl Into<String>, node: Arc<NodeBase>, bins: Vec<Arc<dyn BinHandle>>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), node, bins, started: Mutex::new(HashSet::new()) })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> &Arc<NodeBase> {
        &self.node
    }

    /// Subscribes `session`. Only the transition from zero to one active
    /// session actually starts the composed bins — later callers just join
    /// the already-running chain.
    pub fn start(&self, session: SessionId) {
        let mut started = self.started.lock().unwrap_or_else(|e| e.into_inner());
        let was_empty = started.is_empty();
        started.insert(session);
        if was_empty {
            for bin in &self.bins {
                bin.start_ref();
            }
        }
    }

    /// Unsubscribes `session`. Only the transition to zero active sessions
    /// stops the composed bins.
    pub fn stop(&self, session: SessionId) {
        let mut started = self.started.lock().unwrap_or_else(|e| e.into_inner());
        if !started.remove(&session) {
            return;
        }
        if started.is_empty() {
            for bin in &self.bins {
                bin.stop_ref();
            }
        }
    }

    pub fn active_session_count(&self) -> usize {
        self.started.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn set_interval(&self, session: SessionId, interval_ms: u32) {
        self.node.request_interval(session, interval_ms);
    }

    pub fn set_data_range(&self, session: SessionId, range: crate::range::DataRange) {
        self.node.request_data_range(session, range);
    }

    pub fn set_standby_override(&self, session: SessionId, active: bool) -> bool {
        self.node.set_standby_override_request(session, active)
    }
}

impl SessionTeardown for AbstractSensorChannel {
    fn teardown_session(&self, session: SessionId) {
        self.node.remove_data_range_request(session);
        self.node.remove_interval_request(session);
        self.node.set_standby_override_request(session, false);
        self.stop(session);
    }
}
