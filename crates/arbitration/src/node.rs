//! `NodeBase`: per-node interval/range request queues, standby-override
//! cascade, and upstream delegation.
//!
//! Grounded on `examples/original_source/sensord/nodebase.cpp` for the
//! exact control flow (replace-in-place, head re-evaluation, revert-on-
//! partial-failure standby cascade) and on the teacher's
//! `resilient_exporter.rs` for the idiom of "try every upstream, revert on
//! partial failure" (there: circuit breaker state; here: standby override).

use crate::interval::{self, IntervalRequest};
use crate::range::{DataRange, DataRangeRequest};
use crate::session::SessionId;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Hooks a concrete node (an `AbstractChain`/`AbstractSensorChannel`, or a
/// leaf adaptor wrapper) implements to actually apply an arbitrated value.
/// Default implementations are no-ops that report success, so a node that
/// only cares about e.g. interval doesn't have to stub out the others.
pub trait ArbitrationHooks: Send + Sync {
    /// Applies a newly-effective data range. Returning `false` is logged as
    /// a warning; the previous range remains nominally in effect but the
    /// `propertyChanged` signal still fires (§7 propagation policy).
    fn set_data_range(&self, _range: DataRange, _session: SessionId) -> bool {
        true
    }

    /// Applies a newly-effective interval in milliseconds.
    fn set_interval(&self, _interval_ms: u32, _session: SessionId) -> bool {
        true
    }

    /// Applies a newly-effective standby-override state (only called for
    /// nodes with no upstream standby sources — see `set_standby_override_request`).
    fn set_standby_override(&self, _active: bool) -> bool {
        true
    }
}

/// A concrete `ArbitrationHooks` that accepts everything; useful for nodes
/// that exist purely to aggregate upstream sources.
pub struct NoopHooks;
impl ArbitrationHooks for NoopHooks {}

/// Read access to another node's range metadata, used when a node has no
/// local range and delegates entirely upstream.
pub trait RangeSource: Send + Sync {
    fn available_data_ranges(&self) -> Vec<DataRange>;
    fn current_data_range(&self) -> DataRangeRequest;
    fn request_data_range(&self, session: SessionId, range: DataRange);
    fn remove_data_range_request(&self, session: SessionId);
}

/// Read/write access to another node's standby-override state, used when a
/// node cascades standby requests to one or more upstream sources.
pub trait StandbySource: Send + Sync {
    fn standby_override(&self) -> bool;
    fn set_standby_override_request(&self, session: SessionId, over: bool) -> bool;
}

enum RangeState {
    /// A node has either local range ownership or delegates entirely to one
    /// upstream source — never partial (spec §3 NodeBase invariants).
    Local { available: Vec<DataRange>, queue: Vec<DataRangeRequest> },
    Upstream(Arc<dyn RangeSource>),
}

struct IntervalState {
    queue: Vec<IntervalRequest>,
    default_ms: u32,
}

struct StandbyState {
    local: Vec<SessionId>,
    upstream: Vec<Arc<dyn StandbySource>>,
}

struct Inner {
    description: String,
    range: RangeState,
    interval: IntervalState,
    standby: StandbyState,
}

/// Non-leaf participant exposing data-range, interval, and standby-override
/// metadata to sessions, arbitrating between concurrent requests, and
/// cascading the winning value into a concrete setter.
///
/// All request-queue manipulation and the synchronous call into the
/// concrete hook are serialized under a single per-node mutex (spec §5
/// "Shared resources").
pub struct NodeBase {
    inner: Mutex<Inner>,
    hooks: Arc<dyn ArbitrationHooks>,
}

impl NodeBase {
    /// Builds a node that owns its own data range list locally.
    pub fn with_local_range(
        description: impl Into<String>,
        available: Vec<DataRange>,
        default_interval_ms: u32,
        hooks: Arc<dyn ArbitrationHooks>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                description: description.into(),
                range: RangeState::Local { available, queue: Vec::new() },
                interval: IntervalState { queue: Vec::new(), default_ms: default_interval_ms },
                standby: StandbyState { local: Vec::new(), upstream: Vec::new() },
            }),
            hooks,
        })
    }

    /// Builds a node that delegates all range queries/requests to an
    /// upstream source instead of owning a local list.
    pub fn with_upstream_range(
        description: impl Into<String>,
        upstream: Arc<dyn RangeSource>,
        default_interval_ms: u32,
        hooks: Arc<dyn ArbitrationHooks>,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                description: description.into(),
                range: RangeState::Upstream(upstream),
                interval: IntervalState { queue: Vec::new(), default_ms: default_interval_ms },
                standby: StandbyState { local: Vec::new(), upstream: Vec::new() },
            }),
            hooks,
        })
    }

    /// Registers an upstream standby source; `standby_override()` and
    /// `set_standby_override_request` will cascade to every registered
    /// source once at least one is present.
    pub fn add_standby_source(&self, source: Arc<dyn StandbySource>) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).standby.upstream.push(source);
    }

    pub fn description(&self) -> String {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).description.clone()
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).description = description.into();
    }

    // ---- data range -----------------------------------------------------

    pub fn available_data_ranges(&self) -> Vec<DataRange> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match &inner.range {
            RangeState::Local { available, .. } => available.clone(),
            RangeState::Upstream(upstream) => upstream.available_data_ranges(),
        }
    }

    pub fn current_data_range(&self) -> DataRangeRequest {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match &inner.range {
            RangeState::Local { available, queue } => queue
                .first()
                .copied()
                .unwrap_or_else(|| DataRangeRequest::default_for(available[0])),
            RangeState::Upstream(upstream) => upstream.current_data_range(),
        }
    }

    /// Submits (or replaces-in-place) `session`'s range preference. Silently
    /// ignored if `range` is not in the available set (see `DESIGN.md` Open
    /// Question 1) — `NodeError::UnavailableRange` is available for callers
    /// that prefer to pre-validate via `available_data_ranges()`.
    pub fn request_data_range(&self, session: SessionId, range: DataRange) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let upstream = match &inner.range {
            RangeState::Local { .. } => None,
            RangeState::Upstream(upstream) => Some(upstream.clone()),
        };
        if let Some(upstream) = upstream {
            upstream.request_data_range(session, range);
            return;
        }
        let RangeState::Local { available, queue } = &mut inner.range else { unreachable!() };
        if !available.contains(&range) {
            return;
        }

        let previous_head =
            queue.first().copied().unwrap_or_else(|| DataRangeRequest::default_for(available[0]));

        if let Some(existing) = queue.iter_mut().find(|r| r.session == session) {
            existing.range = range;
        } else {
            queue.push(DataRangeRequest { session, range });
        }

        let new_head = queue[0];
        if new_head.range != previous_head.range {
            self.apply_data_range(new_head);
        }
    }

    pub fn remove_data_range_request(&self, session: SessionId) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let upstream = match &inner.range {
            RangeState::Local { .. } => None,
            RangeState::Upstream(upstream) => Some(upstream.clone()),
        };
        if let Some(upstream) = upstream {
            upstream.remove_data_range_request(session);
            return;
        }
        let RangeState::Local { available, queue } = &mut inner.range else { unreachable!() };
        let Some(index) = queue.iter().position(|r| r.session == session) else { return };
        let removed = queue.remove(index);

        if index != 0 {
            return;
        }
        let new_default = available[0];
        let new_head = queue.first().copied().unwrap_or_else(|| DataRangeRequest::default_for(new_default));
        if new_head.range != removed.range {
            self.apply_data_range(new_head);
        }
    }

    fn apply_data_range(&self, head: DataRangeRequest) {
        if !self.hooks.set_data_range(head.range, head.session) {
            warn!(session = head.session, "failed to set data range");
        }
        // propertyChanged fires regardless of the setter's success (§7).
    }

    // ---- interval ---------------------------------------------------------

    pub fn current_interval(&self) -> IntervalRequest {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        interval::effective(&inner.interval.queue)
            .unwrap_or_else(|| IntervalRequest::default_for(inner.interval.default_ms))
    }

    /// Submits (or replaces-in-place) `session`'s interval preference. Head
    /// selection is minimum-wins (fastest interval), ties broken by
    /// insertion order.
    pub fn request_interval(&self, session: SessionId, interval_ms: u32) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let previous_head = interval::effective(&inner.interval.queue)
            .unwrap_or_else(|| IntervalRequest::default_for(inner.interval.default_ms));

        if let Some(existing) = inner.interval.queue.iter_mut().find(|r| r.session == session) {
            existing.interval_ms = interval_ms;
        } else {
            inner.interval.queue.push(IntervalRequest { session, interval_ms });
        }

        let new_head = interval::effective(&inner.interval.queue)
            .unwrap_or_else(|| IntervalRequest::default_for(inner.interval.default_ms));
        if new_head.interval_ms != previous_head.interval_ms {
            if !self.hooks.set_interval(new_head.interval_ms, new_head.session) {
                warn!(session = new_head.session, "failed to set interval");
            }
        }
    }

    pub fn remove_interval_request(&self, session: SessionId) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let Some(index) = inner.interval.queue.iter().position(|r| r.session == session) else {
            return;
        };
        let previous_head = interval::effective(&inner.interval.queue)
            .unwrap_or_else(|| IntervalRequest::default_for(inner.interval.default_ms));
        inner.interval.queue.remove(index);

        let new_head = interval::effective(&inner.interval.queue)
            .unwrap_or_else(|| IntervalRequest::default_for(inner.interval.default_ms));
        if new_head.interval_ms != previous_head.interval_ms {
            if !self.hooks.set_interval(new_head.interval_ms, new_head.session) {
                warn!(session = new_head.session, "failed to set interval");
            }
        }
    }

    // ---- standby override ---------------------------------------------

    pub fn standby_override(&self) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.standby.upstream.is_empty() {
            return !inner.standby.local.is_empty();
        }
        inner.standby.upstream.iter().all(|source| source.standby_override())
    }

    /// Adds or removes `session` from the local standby-override request
    /// set, then re-evaluates: with no upstream sources the concrete
    /// `set_standby_override` hook is called directly; with upstream
    /// sources the request cascades to all of them, reverting any partial
    /// success if a `true` request was only partially honored (spec §4.6,
    /// S6).
    pub fn set_standby_override_request(&self, session: SessionId, over: bool) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if over {
            if !inner.standby.local.contains(&session) {
                inner.standby.local.push(session);
            }
        } else {
            inner.standby.local.retain(|s| *s != session);
        }

        if inner.standby.upstream.is_empty() {
            let active = !inner.standby.local.is_empty();
            return self.hooks.set_standby_override(active);
        }

        let upstream = inner.standby.upstream.clone();
        drop(inner);

        let mut all_ok = true;
        for source in &upstream {
            if !source.set_standby_override_request(session, over) {
                all_ok = false;
            }
        }

        if over && !all_ok {
            for source in &upstream {
                source.set_standby_override_request(session, false);
            }
            return false;
        }
        all_ok
    }
}

impl RangeSource for NodeBase {
    fn available_data_ranges(&self) -> Vec<DataRange> {
        self.available_data_ranges()
    }
    fn current_data_range(&self) -> DataRangeRequest {
        self.current_data_range()
    }
    fn request_data_range(&self, session: SessionId, range: DataRange) {
        self.request_data_range(session, range);
    }
    fn remove_data_range_request(&self, session: SessionId) {
        self.remove_data_range_request(session);
    }
}

impl StandbySource for NodeBase {
    fn standby_override(&self) -> bool {
        self.standby_override()
    }
    fn set_standby_override_request(&self, session: SessionId, over: bool) -> bool {
        self.set_standby_override_request(session, over)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct RecordingHooks {
        last_range: Mutex<Option<DataRange>>,
        last_interval: AtomicU32,
        standby_calls: Mutex<Vec<bool>>,
        reject: AtomicBool,
    }

    impl RecordingHooks {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                last_range: Mutex::new(None),
                last_interval: AtomicU32::new(0),
                standby_calls: Mutex::new(Vec::new()),
                reject: AtomicBool::new(false),
            })
        }
    }

    impl ArbitrationHooks for RecordingHooks {
        fn set_data_range(&self, range: DataRange, _session: SessionId) -> bool {
            *self.last_range.lock().unwrap() = Some(range);
            !self.reject.load(Ordering::SeqCst)
        }
        fn set_interval(&self, interval_ms: u32, _session: SessionId) -> bool {
            self.last_interval.store(interval_ms, Ordering::SeqCst);
            true
        }
        fn set_standby_override(&self, active: bool) -> bool {
            self.standby_calls.lock().unwrap().push(active);
            true
        }
    }

    fn ranges() -> Vec<DataRange> {
        vec![DataRange::new(0.0, 2.0, 0.01), DataRange::new(0.0, 8.0, 0.01)]
    }

    #[test]
    fn default_range_is_first_available_when_queue_empty() {
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 100, hooks);
        let current = node.current_data_range();
        assert_eq!(current.session, crate::session::NO_SESSION);
        assert_eq!(current.range, ranges()[0]);
    }

    #[test]
    fn request_then_reverse_order_remove_returns_to_default() {
        // Spec §8 property 2.
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 100, hooks);
        node.request_data_range(1, ranges()[1]);
        node.request_data_range(2, ranges()[0]);
        node.remove_data_range_request(2);
        node.remove_data_range_request(1);
        assert_eq!(node.current_data_range().range, ranges()[0]);
    }

    #[test]
    fn insertion_order_wins_ties_s5() {
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 100, hooks.clone());
        node.request_data_range(1, DataRange::new(0.0, 2.0, 0.01));
        node.request_data_range(2, DataRange::new(0.0, 8.0, 0.01));
        assert_eq!(node.current_data_range().session, 1);

        node.remove_data_range_request(1);
        assert_eq!(node.current_data_range().session, 2);
        assert_eq!(*hooks.last_range.lock().unwrap(), Some(DataRange::new(0.0, 8.0, 0.01)));
    }

    #[test]
    fn unavailable_range_is_silently_ignored() {
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 100, hooks);
        node.request_data_range(1, DataRange::new(99.0, 100.0, 1.0));
        assert_eq!(node.current_data_range().range, ranges()[0]);
    }

    #[test]
    fn interval_head_is_minimum_s2() {
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 1000, hooks.clone());
        node.request_interval(1, 50);
        node.request_interval(2, 100);
        assert_eq!(node.current_interval().interval_ms, 50);
        assert_eq!(hooks.last_interval.load(Ordering::SeqCst), 50);

        node.remove_interval_request(1);
        assert_eq!(node.current_interval().interval_ms, 100);
        assert_eq!(hooks.last_interval.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn standby_true_then_false_clears_set() {
        // Spec §8 property 3.
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("accel.range", ranges(), 100, hooks.clone());
        assert!(node.set_standby_override_request(7, true));
        assert!(node.standby_override());
        assert!(node.set_standby_override_request(7, false));
        assert!(!node.standby_override());
        assert_eq!(*hooks.standby_calls.lock().unwrap(), vec![true, false]);
    }

    struct FakeUpstream {
        accept: bool,
        calls: Mutex<Vec<bool>>,
    }

    impl StandbySource for FakeUpstream {
        fn standby_override(&self) -> bool {
            *self.calls.lock().unwrap().last().unwrap_or(&false)
        }
        fn set_standby_override_request(&self, _session: SessionId, over: bool) -> bool {
            self.calls.lock().unwrap().push(over);
            if over {
                self.accept
            } else {
                true
            }
        }
    }

    #[test]
    fn standby_cascade_reverts_on_partial_upstream_failure_s6() {
        let hooks = RecordingHooks::new();
        let node = NodeBase::with_local_range("node", ranges(), 100, hooks);
        let u1 = Arc::new(FakeUpstream { accept: true, calls: Mutex::new(Vec::new()) });
        let u2 = Arc::new(FakeUpstream { accept: false, calls: Mutex::new(Vec::new()) });
        node.add_standby_source(u1.clone());
        node.add_standby_source(u2.clone());

        let result = node.set_standby_override_request(1, true);
        assert!(!result);
        // Spec §4.6: a partially-honored `true` reverts by re-sending
        // `false` to every upstream source, not just the ones that
        // accepted — so both u1 (which accepted the `true`) and u2 (which
        // rejected it) observe the revert.
        assert_eq!(*u1.calls.lock().unwrap(), vec![true, false]);
        assert_eq!(*u2.calls.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn upstream_range_delegation_has_no_local_queue() {
        let hooks = RecordingHooks::new();
        let upstream = NodeBase::with_local_range("raw", ranges(), 100, hooks.clone());
        let delegating = NodeBase::with_upstream_range("filtered", upstream.clone(), 100, hooks);
        delegating.request_data_range(3, ranges()[1]);
        assert_eq!(delegating.current_data_range().range, ranges()[1]);
        assert_eq!(upstream.current_data_range().range, ranges()[1]);
    }
}
