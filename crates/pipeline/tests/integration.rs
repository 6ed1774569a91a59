//! Integration tests for the sensord-pipeline dataflow crate.

use sensord_pipeline::{Bin, BinConfig, Filter, Sink, Source};
use sensord_ring::{RingConfig, Sample};
use std::sync::Arc;
use std::time::Duration;

struct ThresholdFilter {
    min: i32,
}

impl Filter<i32, i32> for ThresholdFilter {
    fn filter(&mut self, sample: Sample<i32>) -> Option<Sample<i32>> {
        if sample.value >= self.min {
            Some(sample)
        } else {
            None
        }
    }
}

#[tokio::test]
async fn chained_bins_propagate_and_drop_below_threshold() {
    let raw_sink = Sink::<i32>::new(RingConfig::new(4, 2));
    let raw_source = Source::<i32>::new();
    raw_source.connect(raw_sink.clone());
    let raw_reader = raw_sink.reader().unwrap();

    let filter_bin = Arc::new(Bin::new(
        "threshold",
        raw_reader,
        Box::new(ThresholdFilter { min: 10 }),
        BinConfig::low_latency(),
    ));
    let filtered_sink = Sink::<i32>::new(RingConfig::default());
    filter_bin.output().connect(filtered_sink.clone());
    let filtered_reader = filtered_sink.reader().unwrap();

    filter_bin.start();
    for v in [1, 15, 3, 20, 9, 100] {
        raw_source.propagate(v, 0);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    filter_bin.stop();

    let values: Vec<_> =
        filtered_reader.read_batch().unwrap().into_iter().map(|s| s.value).collect();
    assert_eq!(values, vec![15, 20, 100]);
}

#[tokio::test]
async fn stopping_a_bin_with_outstanding_start_refs_keeps_it_alive() {
    let sink = Sink::<i32>::new(RingConfig::default());
    let reader = sink.reader().unwrap();
    let bin = Arc::new(Bin::new(
        "identity",
        reader,
        Box::new(sensord_pipeline::MapFilter::new(|v: i32| v)),
        BinConfig::default(),
    ));

    bin.start(); // session A
    bin.start(); // session B
    bin.stop(); // session A releases
    assert!(bin.is_running());
    bin.stop(); // session B releases, thread stops
    assert!(!bin.is_running());
}
