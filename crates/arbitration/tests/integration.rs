//! Cross-module arbitration scenarios from spec.md §8.

use sensord_arbitration::{ArbitrationHooks, DataRange, NodeBase, NoopHooks, SessionId};
use std::sync::{Arc, Mutex};

struct CapturingHooks {
    ranges: Mutex<Vec<(SessionId, DataRange)>>,
}

impl CapturingHooks {
    fn new() -> Arc<Self> {
        Arc::new(Self { ranges: Mutex::new(Vec::new()) })
    }
}

impl ArbitrationHooks for CapturingHooks {
    fn set_data_range(&self, range: DataRange, session: SessionId) -> bool {
        self.ranges.lock().unwrap().push((session, range));
        true
    }
}

fn accel_ranges() -> Vec<DataRange> {
    vec![DataRange::new(0.0, 2.0, 0.01), DataRange::new(0.0, 8.0, 0.01)]
}

/// S5: session A requests (0,2,0.01), session B requests (0,8,0.01); head is
/// A's (insertion order). A disconnects; head becomes B's; `setDataRange` is
/// invoked exactly once for the transition to B's range.
#[test]
fn s5_range_head_follows_insertion_order_then_disconnect() {
    let hooks = CapturingHooks::new();
    let node = NodeBase::with_local_range("accel.range", accel_ranges(), 100, hooks.clone());

    node.request_data_range(1, accel_ranges()[0]);
    node.request_data_range(2, accel_ranges()[1]);
    assert_eq!(node.current_data_range().session, 1);
    assert_eq!(node.current_data_range().range, accel_ranges()[0]);

    node.remove_data_range_request(1);
    assert_eq!(node.current_data_range().session, 2);
    assert_eq!(node.current_data_range().range, accel_ranges()[1]);

    let calls = hooks.ranges.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (2, accel_ranges()[1]));
}

/// Spec §8 property 4: after a session's full lifecycle ends in teardown, no
/// request keyed by its id remains in any node it touched.
#[test]
fn session_teardown_clears_every_node_it_touched() {
    use sensord_arbitration::SessionRegistry;

    struct Touchable {
        node: Arc<NodeBase>,
    }
    impl sensord_arbitration::SessionTeardown for Touchable {
        fn teardown_session(&self, session: SessionId) {
            self.node.remove_data_range_request(session);
            self.node.remove_interval_request(session);
            self.node.set_standby_override_request(session, false);
        }
    }

    let node_a = NodeBase::with_local_range("a", accel_ranges(), 100, Arc::new(NoopHooks));
    let node_b = NodeBase::with_local_range("b", accel_ranges(), 100, Arc::new(NoopHooks));
    let registry = SessionRegistry::new();
    registry.register_channel("a", Arc::new(Touchable { node: node_a.clone() }));
    registry.register_channel("b", Arc::new(Touchable { node: node_b.clone() }));

    let session = registry.open_session();
    node_a.request_data_range(session, accel_ranges()[1]);
    node_a.request_interval(session, 20);
    node_a.set_standby_override_request(session, true);
    registry.touch(session, "a");
    // Session never touched "b".

    registry.teardown(session);

    assert_eq!(node_a.current_data_range().range, accel_ranges()[0]);
    assert_eq!(node_a.current_interval().session, sensord_arbitration::NO_SESSION);
    assert!(!node_a.standby_override());
    // Untouched node is unaffected either way since it never had this session's state.
    assert_eq!(node_b.current_data_range().range, accel_ranges()[0]);
}
