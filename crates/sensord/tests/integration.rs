//! End-to-end scenarios through `build_accelerometer_channel`'s public API:
//! a real `SysfsAdaptor` reader thread, a real `Bin` dispatch thread, real
//! `NodeBase` arbitration — only the sysfs path is a tempfile standing in
//! for a kernel device.

use sensord::{build_accelerometer_channel, Payload};
use sensord_adaptor::{PathSpec, PollMode, SysfsAdaptorConfig};
use sensord_arbitration::{DataRange, SessionRegistry};
use std::time::Duration;

fn ranges() -> Vec<DataRange> {
    vec![DataRange::new(0.0, 2.0, 0.01), DataRange::new(0.0, 8.0, 0.01)]
}

fn fake_device(content: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), content).unwrap();
    file
}

#[test]
fn samples_flow_from_adaptor_through_filter_to_delivery() {
    let file = fake_device("1.0,2.0,9.8\n");
    let config = SysfsAdaptorConfig::new(
        vec![PathSpec::new(file.path().to_str().unwrap(), 0)],
        PollMode::IntervalMode,
    )
    .with_interval(Duration::from_millis(20));

    let registry = SessionRegistry::new();
    let accel = build_accelerometer_channel(&registry, "accel", config, ranges(), 100);

    let session = registry.open_session();
    registry.touch(session, "accel");
    accel.channel.start(session);
    std::thread::sleep(Duration::from_millis(150));
    accel.channel.stop(session);

    let delivered = accel.delivery.lock().unwrap().read_batch().unwrap();
    assert!(!delivered.is_empty(), "expected at least one sample delivered");
    match delivered[0].value {
        Payload::Xyz { x, y, z } => {
            assert!((x - 1.0).abs() < 1e-9);
            assert!((y - 2.0).abs() < 1e-9);
            assert!((z - 9.8).abs() < 1e-9);
        }
        other => panic!("expected Xyz payload, got {other:?}"),
    }
}

/// A constant reading is coalesced by `ChangeGateFilter`: many identical
/// polls produce at most one delivered sample.
#[test]
fn unchanged_readings_are_coalesced_by_the_filter() {
    let file = fake_device("0.0,0.0,9.8\n");
    let config = SysfsAdaptorConfig::new(
        vec![PathSpec::new(file.path().to_str().unwrap(), 0)],
        PollMode::IntervalMode,
    )
    .with_interval(Duration::from_millis(15));

    let registry = SessionRegistry::new();
    let accel = build_accelerometer_channel(&registry, "accel", config, ranges(), 100);

    let session = registry.open_session();
    registry.touch(session, "accel");
    accel.channel.start(session);
    std::thread::sleep(Duration::from_millis(200));
    accel.channel.stop(session);

    let delivered = accel.delivery.lock().unwrap().read_batch().unwrap();
    assert_eq!(delivered.len(), 1, "identical readings should coalesce to one delivery");
}

/// Spec S2/S5 at the channel level: the earlier session's tighter range and
/// faster interval stay effective while both are subscribed; teardown of
/// that session hands the head to the remaining one.
#[test]
fn session_teardown_hands_arbitration_head_to_remaining_session() {
    let file = fake_device("0.0,0.0,9.8\n");
    let config = SysfsAdaptorConfig::new(
        vec![PathSpec::new(file.path().to_str().unwrap(), 0)],
        PollMode::IntervalMode,
    )
    .with_interval(Duration::from_millis(20));

    let registry = SessionRegistry::new();
    let accel = build_accelerometer_channel(&registry, "accel", config, ranges(), 1000);

    let a = registry.open_session();
    let b = registry.open_session();
    registry.touch(a, "accel");
    registry.touch(b, "accel");

    accel.channel.start(a);
    accel.channel.set_data_range(a, ranges()[0]);
    accel.channel.set_interval(a, 50);

    accel.channel.start(b);
    accel.channel.set_data_range(b, ranges()[1]);
    accel.channel.set_interval(b, 100);

    assert_eq!(accel.channel.node().current_data_range().range, ranges()[0]);
    assert_eq!(accel.channel.node().current_interval().interval_ms, 50);

    registry.teardown(a);

    assert_eq!(accel.channel.node().current_data_range().range, ranges()[1]);
    assert_eq!(accel.channel.node().current_interval().interval_ms, 100);
    assert_eq!(accel.channel.active_session_count(), 1);

    registry.teardown(b);
    assert_eq!(accel.channel.active_session_count(), 0);
    assert!(!accel.adaptor.is_running());
}

/// Spec §4.6/S6 at the channel level, via the device-backed standby hook:
/// requesting override keeps the adaptor running; releasing it lets the
/// hook put the adaptor into standby.
#[test]
fn standby_override_keeps_device_out_of_standby_until_released() {
    let file = fake_device("0.0,0.0,9.8\n");
    let config = SysfsAdaptorConfig::new(
        vec![PathSpec::new(file.path().to_str().unwrap(), 0)],
        PollMode::IntervalMode,
    )
    .with_interval(Duration::from_millis(20));

    let registry = SessionRegistry::new();
    let accel = build_accelerometer_channel(&registry, "accel", config, ranges(), 100);

    let session = registry.open_session();
    registry.touch(session, "accel");
    accel.channel.start(session);

    assert!(accel.channel.set_standby_override(session, true));
    assert!(accel.adaptor.is_running());

    assert!(accel.channel.set_standby_override(session, false));
    assert!(accel.adaptor.is_standby());

    accel.channel.stop(session);
}
