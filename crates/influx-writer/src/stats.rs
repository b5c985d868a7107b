// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by the writer facade and its workers.
#[derive(Debug, Default)]
pub struct WriterStats {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    points_written: AtomicU64,
    flushes: AtomicU64,
    flush_errors: AtomicU64,
    points_lost: AtomicU64,
    conversion_errors: AtomicU64,
}

/// Point-in-time copy of [`WriterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Metrics accepted into the queue.
    pub enqueued: u64,
    /// Metrics discarded because the queue was full or closed.
    pub dropped: u64,
    /// Points delivered by successful flushes.
    pub points_written: u64,
    /// Sink write calls made.
    pub flushes: u64,
    /// Sink write calls that failed.
    pub flush_errors: u64,
    /// Points lost in failed flushes.
    pub points_lost: u64,
    /// Metrics skipped because they could not be converted.
    pub conversion_errors: u64,
}

impl WriterStats {
    pub(crate) fn record_enqueued(&self, metrics: usize) {
        self.enqueued.fetch_add(metrics as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self, metrics: usize) {
        self.dropped.fetch_add(metrics as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_flush(&self, points: usize, ok: bool) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        if ok {
            self.points_written.fetch_add(points as u64, Ordering::Relaxed);
        } else {
            self.flush_errors.fetch_add(1, Ordering::Relaxed);
            self.points_lost.fetch_add(points as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_conversion_error(&self) {
        self.conversion_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            points_written: self.points_written.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flush_errors: self.flush_errors.load(Ordering::Relaxed),
            points_lost: self.points_lost.load(Ordering::Relaxed),
            conversion_errors: self.conversion_errors.load(Ordering::Relaxed),
        }
    }
}
