//! End-to-end wiring: sysfs adaptor → ring → filter → bin → chain → session.
//!
//! `build_accelerometer_channel` is the glue the demo binary drives; it is
//! kept in the library (not inlined into `demos/demo.rs`) so the wiring
//! itself — not just its invocation — is something a reader can follow
//! without reading the binary.

use crate::payload::Payload;
use sensord_adaptor::{SampleProcessor, SysfsAdaptor, SysfsAdaptorConfig};
use sensord_arbitration::{AbstractSensorChannel, ArbitrationHooks, DataRange, NodeBase, SessionId, SessionRegistry};
use sensord_pipeline::{Bin, BinConfig, BinHandle, BufferReader, Filter, Sink, Source};
use sensord_ring::{RingConfig, Sample};
use std::os::unix::io::RawFd;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{info, warn};

/// Stateful, non-blocking transform that only forwards an `Xyz` sample once
/// it has moved by more than `epsilon` on any axis since the last sample it
/// forwarded — an illustrative coalescing filter (spec §4.3: "filters may
/// drop or coalesce samples"). The actual orientation-interpretation /
/// coordinate-alignment algorithms named in spec §1 are explicitly out of
/// scope; this filter stands in for "some stateful transform lives here"
/// without claiming to be one of them.
pub struct ChangeGateFilter {
    epsilon: f64,
    last: Option<Payload>,
}

impl ChangeGateFilter {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon, last: None }
    }

    fn moved_enough(&self, value: &Payload) -> bool {
        match (&self.last, value) {
            (None, _) => true,
            (Some(Payload::Xyz { x: x0, y: y0, z: z0 }), Payload::Xyz { x, y, z }) => {
                (x - x0).abs() > self.epsilon || (y - y0).abs() > self.epsilon || (z - z0).abs() > self.epsilon
            }
            (Some(prev), cur) => prev != cur,
        }
    }
}

impl Filter<Payload, Payload> for ChangeGateFilter {
    fn filter(&mut self, sample: Sample<Payload>) -> Option<Sample<Payload>> {
        if self.moved_enough(&sample.value) {
            self.last = Some(sample.value);
            Some(sample)
        } else {
            None
        }
    }
}

/// Parses one line of `"x,y,z"` ASCII text out of a sysfs-like attribute file
/// and pushes it as an `Xyz` sample into the ring the rest of the chain reads
/// from. This is the adaptor-side "reads bytes, parses, timestamps" work
/// spec §4.5 confines to `process_sample` — the only producer-thread work
/// permitted inside the engine.
struct XyzSampleProcessor {
    sink: Arc<Sink<Payload>>,
    started: Instant,
}

impl XyzSampleProcessor {
    fn new(sink: Arc<Sink<Payload>>) -> Arc<Self> {
        Arc::new(Self { sink, started: Instant::now() })
    }

    fn monotonic_timestamp_us(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }
}

impl SampleProcessor for XyzSampleProcessor {
    fn process_sample(&self, path_id: i32, fd: RawFd) {
        let mut buf = [0u8; 256];
        // Safety: `fd` is owned by the adaptor for the duration of this
        // call and `buf` is a valid, correctly-sized destination.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n <= 0 {
            return; // transient read failure: logged upstream, elided here.
        }
        let text = String::from_utf8_lossy(&buf[..n as usize]);
        let mut parts = text.trim().splitn(3, ',');
        let parsed = (|| {
            let x: f64 = parts.next()?.trim().parse().ok()?;
            let y: f64 = parts.next()?.trim().parse().ok()?;
            let z: f64 = parts.next()?.trim().parse().ok()?;
            Some((x, y, z))
        })();
        let Some((x, y, z)) = parsed else {
            warn!(path_id, raw = %text, "failed to parse xyz sample");
            return;
        };
        let sample = Sample::new(Payload::Xyz { x, y, z }, self.monotonic_timestamp_us());
        self.sink.push(sample);
    }
}

/// Routes an arbitrated interval/range/standby decision into logging and,
/// for standby, into the device adaptor: an active override means the
/// device must stay out of its low-power suspended state.
struct DeviceHooks {
    name: String,
    adaptor: Arc<SysfsAdaptor>,
}

impl ArbitrationHooks for DeviceHooks {
    fn set_data_range(&self, range: DataRange, session: SessionId) -> bool {
        info!(channel = %self.name, session, min = range.min, max = range.max, "data range changed");
        true
    }

    fn set_interval(&self, interval_ms: u32, session: SessionId) -> bool {
        info!(channel = %self.name, session, interval_ms, "interval changed");
        true
    }

    fn set_standby_override(&self, active: bool) -> bool {
        if active {
            self.adaptor.resume() || self.adaptor.is_running()
        } else {
            self.adaptor.standby() || self.adaptor.is_standby()
        }
    }
}

/// Composes a `Bin`'s reference-counted start/stop with the device
/// adaptor's own ref-counted `start_adaptor`/`stop_adaptor`, so that a
/// session starting the chain also starts the physical device, and the
/// device only closes once the last session (and therefore the last bin
/// start reference) has released it.
pub struct DeviceBin<In, Out> {
    bin: Arc<Bin<In, Out>>,
    adaptor: Arc<SysfsAdaptor>,
}

impl<In, Out> DeviceBin<In, Out>
where
    In: Copy + Default + Send + 'static,
    Out: Copy + Default + Send + 'static,
{
    pub fn new(bin: Arc<Bin<In, Out>>, adaptor: Arc<SysfsAdaptor>) -> Arc<Self> {
        Arc::new(Self { bin, adaptor })
    }

    pub fn output(&self) -> &Source<Out> {
        self.bin.output()
    }
}

impl<In, Out> BinHandle for DeviceBin<In, Out>
where
    In: Copy + Default + Send + 'static,
    Out: Copy + Default + Send + 'static,
{
    fn start_ref(&self) {
        self.adaptor.start_adaptor();
        Bin::start(&self.bin);
    }

    fn stop_ref(&self) {
        Bin::stop(&self.bin);
        self.adaptor.stop_adaptor();
    }

    fn is_running(&self) -> bool {
        self.bin.is_running()
    }
}

/// One fully wired accelerometer-like channel: a `SysfsAdaptor` producer
/// feeding a `Bin` running `ChangeGateFilter`, arbitrated through a
/// `NodeBase`, composed behind an `AbstractSensorChannel`, registered with
/// `registry` so session teardown cascades into it.
pub struct AccelChannel {
    pub channel: Arc<AbstractSensorChannel>,
    pub adaptor: Arc<SysfsAdaptor>,
    pub delivery: Mutex<BufferReader<Payload>>,
}

pub fn build_accelerometer_channel(
    registry: &SessionRegistry,
    name: &str,
    adaptor_config: SysfsAdaptorConfig,
    available_ranges: Vec<DataRange>,
    default_interval_ms: u32,
) -> AccelChannel {
    let sink_in = Sink::<Payload>::new(RingConfig::default());
    let reader = sink_in.reader().expect("fresh sink always accepts its first reader");
    let processor = XyzSampleProcessor::new(sink_in.clone());
    let adaptor = SysfsAdaptor::new(name, adaptor_config, processor);

    let bin = Arc::new(Bin::new(name, reader, Box::new(ChangeGateFilter::new(0.05)), BinConfig::low_latency()));
    let out_sink = Sink::<Payload>::new(RingConfig::default());
    bin.output().connect(out_sink.clone());
    let delivery = out_sink.reader().expect("fresh sink always accepts its first reader");

    let device_bin = DeviceBin::new(bin, adaptor.clone());

    let hooks = Arc::new(DeviceHooks { name: name.to_string(), adaptor: adaptor.clone() });
    let node = NodeBase::with_local_range(name, available_ranges, default_interval_ms, hooks);
    let channel = AbstractSensorChannel::new(name, node, vec![device_bin as Arc<dyn BinHandle>]);
    registry.register_channel(name, channel.clone());

    AccelChannel { channel, adaptor, delivery: Mutex::new(delivery) }
}
