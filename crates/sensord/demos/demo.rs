//! End-to-end demo: one accelerometer-like sensor channel, driven the way an
//! RPC transport would drive it (out of scope for this engine — this binary
//! plays that role for demonstration purposes only).
//!
//! Wiring: a `SysfsAdaptor` reader thread polls a fake sysfs attribute file
//! on an interval, parses `"x,y,z"` text into `Payload::Xyz` samples, and
//! pushes them into a ring buffer. A `Bin` drains that ring through a
//! `ChangeGateFilter` and fans the result out to a delivery sink. Two
//! sessions subscribe through an `AbstractSensorChannel`, exercise interval/
//! range arbitration and the property-map parser, and tear down.
//!
//! ```bash
//! cargo run -p sensord --bin demo
//! ```

use sensord::{build_accelerometer_channel, get_property_map, LogLevel};
use sensord_adaptor::{PathSpec, PollMode, SysfsAdaptorConfig};
use sensord_arbitration::{DataRange, SessionRegistry};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    sensord::log::set_output_level(LogLevel::Debug);

    // Property-map parsing, as a transport would use it to attach
    // construction-time options to a sensor id (spec §6).
    let options = get_property_map("accel;interval=50,range=8G,bogus");
    tracing::info!(?options, "parsed construction-time properties");

    let fake_device = tempfile::NamedTempFile::new().expect("create fake sysfs file");
    std::fs::write(fake_device.path(), b"0.0,0.0,9.8\n").expect("seed fake sysfs file");

    let ranges = vec![DataRange::new(0.0, 2.0, 0.01), DataRange::new(0.0, 8.0, 0.01)];
    let adaptor_config = SysfsAdaptorConfig::new(
        vec![PathSpec::new(fake_device.path().to_str().unwrap(), 0)],
        PollMode::IntervalMode,
    )
    .with_interval(Duration::from_millis(50));

    let registry = SessionRegistry::new();
    let accel = build_accelerometer_channel(&registry, "accel", adaptor_config, ranges.clone(), 100);

    // A background thread stands in for the device actually moving.
    let moving_path = fake_device.path().to_path_buf();
    let stop_writer = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let writer_stop = stop_writer.clone();
    let writer = thread::spawn(move || {
        let mut t = 0.0_f64;
        while !writer_stop.load(std::sync::atomic::Ordering::Acquire) {
            let z = 9.8 + (t.sin() * 0.5);
            let _ = std::fs::write(&moving_path, format!("{t:.2},0.0,{z:.2}\n"));
            t += 0.3;
            thread::sleep(Duration::from_millis(40));
        }
    });

    // Session A starts the channel and pins a tight range; session B joins
    // with a wider one but A's request (earlier insertion) stays head (S5).
    let session_a = registry.open_session();
    let session_b = registry.open_session();
    registry.touch(session_a, "accel");
    registry.touch(session_b, "accel");

    accel.channel.start(session_a);
    accel.channel.set_data_range(session_a, ranges[0]);
    accel.channel.set_interval(session_a, 50);

    accel.channel.start(session_b);
    accel.channel.set_data_range(session_b, ranges[1]);
    accel.channel.set_interval(session_b, 100); // A's 50ms stays effective (S2).

    accel.channel.set_standby_override(session_a, true);

    thread::sleep(Duration::from_millis(400));

    {
        let delivery = accel.delivery.lock().unwrap();
        for sample in delivery.read_batch().expect("delivery reader cursor is still attached") {
            tracing::info!(ts = sample.timestamp_us, value = ?sample.value, "delivered sample");
        }
    }

    // A disconnects: head range becomes B's, head interval becomes B's 100ms.
    registry.teardown(session_a);
    thread::sleep(Duration::from_millis(150));

    let rotated = sensord::log::rotate_output_level();
    tracing::info!(?rotated, "rotated log level via demo signal stand-in");

    registry.teardown(session_b);
    stop_writer.store(true, std::sync::atomic::Ordering::Release);
    writer.join().ok();

    assert!(!accel.channel.node().standby_override(), "standby override clears on teardown");
    tracing::info!("demo complete");
}
