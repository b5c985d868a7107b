// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared sinks and helpers for integration tests.

#![allow(dead_code)]

use crossbeam::channel::{self, Receiver, Sender};
use influx_writer::{Batch, FieldValue, Sample, Sink, SinkError, WriterConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Records every batch it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<Batch>>,
    pub closed: AtomicBool,
    /// Writes observed after `close`.
    pub late_writes: AtomicUsize,
    pub fail: AtomicBool,
}

impl RecordingSink {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(Batch::len).collect()
    }

    pub fn total_points(&self) -> usize {
        self.batches.lock().iter().map(Batch::len).sum()
    }

    /// `seq` field of every recorded point, in flush order.
    pub fn sequence(&self) -> Vec<i64> {
        self.batches
            .lock()
            .iter()
            .flat_map(|b| b.points().iter())
            .filter_map(|p| match p.fields.get("seq") {
                Some(FieldValue::Integer(i)) => Some(*i),
                _ => None,
            })
            .collect()
    }
}

impl Sink for RecordingSink {
    fn write(&self, batch: &Batch) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            self.late_writes.fetch_add(1, Ordering::SeqCst);
        }
        self.batches.lock().push(batch.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(SinkError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Blocks inside `write` until the gate is released.
pub struct GatedSink {
    pub inner: RecordingSink,
    entered: Sender<()>,
    gate: Receiver<()>,
}

/// Control side of a [`GatedSink`].
pub struct Gate {
    /// Receives one message each time a worker enters `write`.
    pub entered: Receiver<()>,
    release: Option<Sender<()>>,
}

impl Gate {
    /// Let every current and future `write` through.
    pub fn open(&mut self) {
        self.release.take();
    }
}

pub fn gated_sink() -> (GatedSink, Gate) {
    let (entered_tx, entered_rx) = channel::unbounded();
    let (release_tx, release_rx) = channel::bounded(0);
    (
        GatedSink {
            inner: RecordingSink::default(),
            entered: entered_tx,
            gate: release_rx,
        },
        Gate {
            entered: entered_rx,
            release: Some(release_tx),
        },
    )
}

impl Sink for GatedSink {
    fn write(&self, batch: &Batch) -> Result<(), SinkError> {
        let _ = self.entered.send(());
        // Returns Err once the gate sender is dropped.
        let _ = self.gate.recv();
        self.inner.write(batch)
    }

    fn close(&self) -> Result<(), SinkError> {
        self.inner.close()
    }
}

pub fn config(batch_count: usize, interval: &str, workers: usize) -> WriterConfig {
    WriterConfig::from_yaml(&format!(
        r#"
endpoint: "http://localhost:8086"
database: "itest"
host: "h1"
label: "integration"
batch_interval: "{interval}"
batch_count: {batch_count}
worker_count: {workers}
precision: "ms"
tags:
  env: "test"
"#
    ))
    .expect("config")
}

pub fn seq(i: i64) -> Sample {
    Sample::new("load").tag("source", "itest").field("seq", i)
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
