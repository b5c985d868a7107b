// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Periodic producer of runtime samples.

use super::process::ProcessStats;
use super::registry::Registry;
use crate::writer::Writer;
use crossbeam::channel::{self, Sender};
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Measurement name of the samples written by [`RuntimeCollector`].
pub const RUNTIME_MEASUREMENT: &str = "process";

/// Handle to a running collector thread.
///
/// When dropped, signals the background thread to stop and joins it.
pub struct RuntimeCollector {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RuntimeCollector {
    /// Every `interval`, capture `stats` and write one sample holding every
    /// instrument of `registry` to `writer`.
    ///
    /// Instruments registered by the caller in the same registry are
    /// included in the sample.
    pub fn start(
        writer: Arc<Writer>,
        registry: Arc<Registry>,
        mut stats: ProcessStats,
        interval: Duration,
    ) -> io::Result<Self> {
        if interval.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "collector interval must be greater than zero",
            ));
        }

        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let thread = std::thread::Builder::new()
            .name("influx-runtime-collector".to_string())
            .spawn(move || {
                log::debug!("[runtime-collector] started with interval {:?}", interval);
                let ticker = channel::tick(interval);
                loop {
                    crossbeam::select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            stats.capture();
                            writer.write(registry.sample(RUNTIME_MEASUREMENT));
                        }
                    }
                }
                log::debug!("[runtime-collector] stopped");
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Stop the collector and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the stop channel.
        self.stop.take();
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("[runtime-collector] collector thread panicked");
            }
        }
    }
}

impl Drop for RuntimeCollector {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::config::WriterConfig;
    use crate::error::SinkError;
    use crate::line_protocol::FieldValue;
    use crate::sink::Sink;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Batch>>,
    }

    impl Sink for RecordingSink {
        fn write(&self, batch: &Batch) -> Result<(), SinkError> {
            self.batches.lock().push(batch.clone());
            Ok(())
        }
    }

    fn writer(sink: Arc<RecordingSink>) -> Arc<Writer> {
        let config = WriterConfig::from_yaml(
            r#"
endpoint: "http://localhost:8086"
database: "runtime"
batch_interval: "60s"
batch_count: 1000
precision: "s"
"#,
        )
        .expect("config");
        Arc::new(Writer::new(&config, sink).expect("writer"))
    }

    #[test]
    fn test_collector_writes_process_samples() {
        let sink = Arc::new(RecordingSink::default());
        let writer = writer(sink.clone());
        let registry = Arc::new(Registry::new());
        let stats = ProcessStats::register(&registry).expect("register");
        let custom = registry.new_counter("app.jobs").expect("counter");
        custom.inc(9);

        let collector = RuntimeCollector::start(
            writer.clone(),
            registry,
            stats,
            Duration::from_millis(10),
        )
        .expect("start");
        std::thread::sleep(Duration::from_millis(80));
        collector.stop();

        let written = writer.stats().enqueued;
        writer.close().expect("close");

        let batches = sink.batches.lock();
        let points: Vec<_> = batches.iter().flat_map(|b| b.points().iter()).collect();
        assert!(written >= 1, "collector should have produced samples");
        assert_eq!(points.len() as u64, written);
        for p in points {
            assert_eq!(p.measurement, RUNTIME_MEASUREMENT);
            assert_eq!(p.fields.get("app.jobs"), Some(&FieldValue::Integer(9)));
            assert!(p.fields.contains_key("process.uptime_ns"));
        }
    }

    #[test]
    fn test_stop_halts_collection() {
        let sink = Arc::new(RecordingSink::default());
        let writer = writer(sink);
        let registry = Arc::new(Registry::new());
        let stats = ProcessStats::register(&registry).expect("register");

        let collector =
            RuntimeCollector::start(writer.clone(), registry, stats, Duration::from_millis(5))
                .expect("start");
        std::thread::sleep(Duration::from_millis(30));
        drop(collector);

        let after_stop = writer.stats().enqueued;
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(writer.stats().enqueued, after_stop);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let sink = Arc::new(RecordingSink::default());
        let registry = Arc::new(Registry::new());
        let stats = ProcessStats::register(&registry).expect("register");
        let result = RuntimeCollector::start(writer(sink), registry, stats, Duration::ZERO);
        assert!(result.is_err());
    }
}
