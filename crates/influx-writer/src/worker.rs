// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Worker loop: the dual-trigger flush state machine.
//!
//! Each worker races three event sources:
//!
//! ```text
//!   queue ──────► process() ──► count > batch_count ──► try_send(force)
//!   force ──┐                                              (3 slots, drop if full)
//!   ticker ─┴──► flush()  (no-op when count == 0)
//!   queue closed & drained ──► final flush ──► exit
//! ```
//!
//! The worker owns its batch; nothing else ever touches it, so flushing and
//! appending never overlap.

use crate::assembler::convert;
use crate::batch::Batch;
use crate::metric::{Tags, WriteRequest};
use crate::sink::Sink;
use crate::stats::WriterStats;
use crossbeam::channel::{self, Receiver};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Pending forced-flush signals a worker will hold. Extra signals are
/// dropped since a pending flush drains the whole batch anyway.
pub const FORCE_FLUSH_SLOTS: usize = 3;

/// What caused a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushTrigger {
    /// Point count crossed `batch_count`.
    Count,
    /// Flush interval elapsed.
    Interval,
    /// Queue closed; last flush before exit.
    Shutdown,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlushTrigger::Count => "count",
            FlushTrigger::Interval => "interval",
            FlushTrigger::Shutdown => "shutdown",
        })
    }
}

/// Per-worker state.
pub(crate) struct Worker {
    id: usize,
    batch: Batch,
    count: usize,
    batch_count: usize,
    interval: Duration,
    common_tags: Arc<Tags>,
    sink: Arc<dyn Sink>,
    stats: Arc<WriterStats>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        batch: Batch,
        batch_count: usize,
        interval: Duration,
        common_tags: Arc<Tags>,
        sink: Arc<dyn Sink>,
        stats: Arc<WriterStats>,
    ) -> Self {
        Self {
            id,
            batch,
            count: 0,
            batch_count,
            interval,
            common_tags,
            sink,
            stats,
        }
    }

    /// Run until `queue` is closed and drained, then flush once more.
    pub(crate) fn run(mut self, queue: Receiver<WriteRequest>) {
        let (force_tx, force_rx) = channel::bounded::<()>(FORCE_FLUSH_SLOTS);
        let ticker = channel::tick(self.interval);

        log::debug!(
            "[worker-{}] started (batch_count={}, interval={:?})",
            self.id,
            self.batch_count,
            self.interval
        );

        loop {
            crossbeam::select! {
                recv(queue) -> msg => match msg {
                    Ok(request) => {
                        self.process(&request);
                        if self.count > self.batch_count {
                            let _ = force_tx.try_send(());
                        }
                    }
                    // Disconnection is only reported once the queue is empty.
                    Err(_) => break,
                },
                recv(force_rx) -> _ => self.flush(FlushTrigger::Count),
                recv(ticker) -> _ => self.flush(FlushTrigger::Interval),
            }
        }

        self.flush(FlushTrigger::Shutdown);
        log::debug!("[worker-{}] stopped", self.id);
    }

    /// Convert every metric of `request` into the open batch.
    ///
    /// Returns the number of points added.
    pub(crate) fn process(&mut self, request: &WriteRequest) -> usize {
        let mut added = 0;
        for metric in request.iter() {
            match convert(metric, &self.common_tags) {
                Ok(point) => {
                    self.batch.push(point);
                    added += 1;
                }
                Err(e) => {
                    self.stats.record_conversion_error();
                    log::error!(
                        "[worker-{}] can't create point for `{}`: {}",
                        self.id,
                        metric.measurement(),
                        e
                    );
                }
            }
        }
        self.count += added;
        added
    }

    /// Send the open batch to the sink and start a fresh one.
    ///
    /// Does nothing when no point was added since the last flush. Sink
    /// failures are logged and the batch is discarded.
    pub(crate) fn flush(&mut self, trigger: FlushTrigger) {
        if self.count == 0 {
            return;
        }

        let batch = self.batch.take();
        let points = batch.len();
        self.count = 0;

        match self.sink.write(&batch) {
            Ok(()) => {
                self.stats.record_flush(points, true);
                log::debug!("[worker-{}] {} flush: wrote {} points", self.id, trigger, points);
            }
            Err(e) => {
                self.stats.record_flush(points, false);
                log::error!(
                    "[worker-{}] {} flush: can't write {} points: {}",
                    self.id,
                    trigger,
                    points,
                    e
                );
            }
        }
    }

    /// Points added since the last flush.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.count
    }
}
