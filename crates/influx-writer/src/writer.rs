// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer facade.
//!
//! Owns the bounded ingestion queue and the worker pool. Producers call the
//! `write*` methods from any thread; none of them ever blocks.

use crate::batch::Batch;
use crate::config::{ResolvedConfig, WriterConfig};
use crate::error::WriterError;
use crate::metric::{Metric, WriteRequest};
use crate::sink::Sink;
use crate::stats::{StatsSnapshot, WriterStats};
use crate::worker::Worker;
use crossbeam::channel::{self, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Batching writer in front of a [`Sink`].
///
/// ```no_run
/// use influx_writer::{Sample, Writer, WriterConfig};
///
/// let config = WriterConfig::from_yaml(r#"
/// endpoint: "http://localhost:8086"
/// database: "metrics"
/// batch_interval: "1s"
/// batch_count: 500
/// precision: "ms"
/// "#).expect("config");
///
/// let writer = Writer::from_config(&config).expect("writer");
/// writer.write(Sample::new("requests").field("count", 1i64));
/// writer.close().expect("close");
/// ```
pub struct Writer {
    /// `None` once closed. Producers hold the read lock only for the
    /// duration of a `try_send`.
    queue: RwLock<Option<Sender<WriteRequest>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    sink: Arc<dyn Sink>,
    stats: Arc<WriterStats>,
    worker_count: usize,
    queue_capacity: usize,
}

impl Writer {
    /// Validate `config` and start the worker pool in front of `sink`.
    ///
    /// Configuration errors are returned before any thread is spawned.
    pub fn new(config: &WriterConfig, sink: Arc<dyn Sink>) -> Result<Self, WriterError> {
        let resolved = config.resolve()?;
        Self::with_resolved(resolved, sink)
    }

    /// Build the HTTP sink described by `config` and start the writer.
    #[cfg(feature = "http")]
    pub fn from_config(config: &WriterConfig) -> Result<Self, WriterError> {
        let resolved = config.resolve()?;
        let sink = crate::sink::HttpSink::new(&config.endpoint, &config.user, &config.password)?;
        Self::with_resolved(resolved, Arc::new(sink))
    }

    /// Start the worker pool from an already validated configuration.
    pub fn with_resolved(config: ResolvedConfig, sink: Arc<dyn Sink>) -> Result<Self, WriterError> {
        let (tx, rx) = channel::bounded::<WriteRequest>(config.queue_capacity);
        let stats = Arc::new(WriterStats::default());
        let common_tags = Arc::new(config.common_tags);
        let database: Arc<str> = Arc::from(config.database.as_str());

        let mut workers = Vec::with_capacity(config.worker_count);
        for id in 0..config.worker_count {
            let worker = Worker::new(
                id,
                Batch::new(database.clone(), config.precision),
                config.batch_count,
                config.batch_interval,
                common_tags.clone(),
                sink.clone(),
                stats.clone(),
            );
            let queue = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("influx-writer-{}", id))
                .spawn(move || worker.run(queue));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    drop(tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(WriterError::Spawn(e));
                }
            }
        }

        log::debug!(
            "[influx-writer] started {} workers (db={}, precision={}, batch_count={}, interval={:?}, queue={})",
            config.worker_count,
            database,
            config.precision,
            config.batch_count,
            config.batch_interval,
            config.queue_capacity
        );

        Ok(Self {
            queue: RwLock::new(Some(tx)),
            workers: Mutex::new(workers),
            sink,
            stats,
            worker_count: config.worker_count,
            queue_capacity: config.queue_capacity,
        })
    }

    /// Enqueue one metric. Dropped with a warning if the queue is full.
    pub fn write<M: Metric + 'static>(&self, metric: M) {
        self.write_request(WriteRequest::single(metric));
    }

    /// Enqueue several metrics as one request. An empty vector is a no-op.
    pub fn write_batch<M: Metric + 'static>(&self, metrics: Vec<M>) {
        if metrics.is_empty() {
            return;
        }
        self.write_request(WriteRequest::batch(metrics));
    }

    /// Enqueue `metric` with probability `probability` (0.0 to 1.0).
    pub fn write_sample<M: Metric + 'static>(&self, metric: M, probability: f64) {
        if fastrand::f64() < probability {
            self.write(metric);
        }
    }

    /// Enqueue a prepared request without blocking.
    pub fn write_request(&self, request: WriteRequest) {
        let n = request.len();
        if n == 0 {
            return;
        }

        let queue = self.queue.read();
        let Some(tx) = queue.as_ref() else {
            self.stats.record_dropped(n);
            log::debug!("[influx-writer] discarded {} metrics, writer is closed", n);
            return;
        };

        match tx.try_send(request) {
            Ok(()) => self.stats.record_enqueued(n),
            Err(TrySendError::Full(_)) => {
                self.stats.record_dropped(n);
                log::warn!(
                    "[influx-writer] discarded {} metrics, queue is full ({}/{})",
                    n,
                    tx.len(),
                    self.queue_capacity
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                self.stats.record_dropped(n);
                log::error!("[influx-writer] discarded {} metrics, no worker is running", n);
            }
        }
    }

    /// Stop accepting writes, let every worker drain and flush, then close
    /// the sink.
    ///
    /// When this returns, the worker pool has terminated and the sink will
    /// not be called again. A second call returns
    /// [`WriterError::AlreadyClosed`].
    pub fn close(&self) -> Result<(), WriterError> {
        let Some(tx) = self.queue.write().take() else {
            return Err(WriterError::AlreadyClosed);
        };
        drop(tx);

        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if handle.join().is_err() {
                log::error!("[influx-writer] worker thread panicked during shutdown");
            }
        }

        self.sink.close()?;
        log::debug!("[influx-writer] closed ({:?})", self.stats.snapshot());
        Ok(())
    }

    /// True once [`Writer::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.queue.read().is_none()
    }

    /// Number of running worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Capacity of the ingestion queue.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Requests currently waiting in the queue.
    pub fn queue_len(&self) -> usize {
        self.queue.read().as_ref().map_or(0, |tx| tx.len())
    }

    /// Current counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.queue.get_mut().is_some() {
            if let Err(e) = self.close() {
                log::error!("[influx-writer] close on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SinkError};
    use crate::metric::Sample;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSink {
        writes: AtomicUsize,
        points: AtomicUsize,
        closes: AtomicUsize,
    }

    impl Sink for CountingSink {
        fn write(&self, batch: &Batch) -> Result<(), SinkError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.points.fetch_add(batch.len(), Ordering::SeqCst);
            Ok(())
        }

        fn close(&self) -> Result<(), SinkError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config(workers: usize) -> WriterConfig {
        WriterConfig {
            endpoint: "http://localhost:8086".to_string(),
            database: "metrics".to_string(),
            user: String::new(),
            password: String::new(),
            host: "h1".to_string(),
            label: "test".to_string(),
            batch_interval: "60s".to_string(),
            batch_count: 100,
            worker_count: workers,
            precision: "ms".to_string(),
            queue_capacity: None,
            tags: Default::default(),
        }
    }

    #[test]
    fn test_worker_count_clamped() {
        let sink = Arc::new(CountingSink::default());
        for (asked, expected) in [(0, 1), (1, 1), (3, 3)] {
            let writer = Writer::new(&config(asked), sink.clone()).expect("writer");
            assert_eq!(writer.worker_count(), expected);
            assert_eq!(writer.workers.lock().len(), expected);
            writer.close().expect("close");
        }
    }

    #[test]
    fn test_bad_precision_fails_before_start() {
        let sink = Arc::new(CountingSink::default());
        let mut cfg = config(2);
        cfg.precision = "incorrect".to_string();

        match Writer::new(&cfg, sink.clone()) {
            Err(WriterError::Config(ConfigError::Precision(p))) => assert_eq!(p, "incorrect"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("writer must not start"),
        }
        assert_eq!(sink.closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_bad_interval_fails_before_start() {
        let sink = Arc::new(CountingSink::default());
        let mut cfg = config(1);
        cfg.batch_interval = "whenever".to_string();

        assert!(matches!(
            Writer::new(&cfg, sink),
            Err(WriterError::Config(ConfigError::Interval { .. }))
        ));
    }

    #[test]
    fn test_close_twice_is_an_error() {
        let sink = Arc::new(CountingSink::default());
        let writer = Writer::new(&config(1), sink.clone()).expect("writer");

        writer.close().expect("first close");
        assert!(writer.is_closed());
        assert!(matches!(writer.close(), Err(WriterError::AlreadyClosed)));
        assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_writes_after_close_are_dropped() {
        let sink = Arc::new(CountingSink::default());
        let writer = Writer::new(&config(1), sink.clone()).expect("writer");
        writer.close().expect("close");

        writer.write(Sample::new("m").field("v", 1i64));

        assert_eq!(writer.stats().dropped, 1);
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_batch_is_silent_noop() {
        let sink = Arc::new(CountingSink::default());
        let writer = Writer::new(&config(1), sink.clone()).expect("writer");

        writer.write_batch(Vec::<Sample>::new());
        let stats = writer.stats();
        assert_eq!(stats.enqueued, 0);
        assert_eq!(stats.dropped, 0);

        writer.close().expect("close");
        assert_eq!(sink.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_write_sample_probability_bounds() {
        let sink = Arc::new(CountingSink::default());
        let writer = Writer::new(&config(1), sink.clone()).expect("writer");

        for i in 0..20 {
            writer.write_sample(Sample::new("never").field("v", i as i64), 0.0);
            writer.write_sample(Sample::new("always").field("v", i as i64), 1.0);
        }
        writer.close().expect("close");

        assert_eq!(writer.stats().enqueued, 20);
        assert_eq!(sink.points.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_drop_closes_writer() {
        let sink = Arc::new(CountingSink::default());
        {
            let writer = Writer::new(&config(2), sink.clone()).expect("writer");
            writer.write(Sample::new("m").field("v", 1i64));
        }
        assert_eq!(sink.points.load(Ordering::SeqCst), 1);
        assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
    }
}
