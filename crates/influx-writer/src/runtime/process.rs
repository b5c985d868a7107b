// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process resource statistics.
//!
//! CPU time, page faults and context switches come from `getrusage(2)` on
//! every Unix. Resident/virtual memory, thread count and open descriptors
//! are read from `/proc/self` on Linux. Counters that only grow (faults,
//! context switches) are reported as the delta since the previous capture.

use super::registry::{Gauge, Registry};
use crate::error::RegistryError;
use std::sync::Arc;
use std::time::Instant;

/// Gauges fed by [`ProcessStats::capture`].
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub struct ProcessStats {
    started: Instant,
    uptime_ns: Arc<Gauge>,
    cpu_user_ns: Arc<Gauge>,
    cpu_system_ns: Arc<Gauge>,
    max_rss_bytes: Arc<Gauge>,
    minor_faults: Arc<Gauge>,
    major_faults: Arc<Gauge>,
    voluntary_switches: Arc<Gauge>,
    involuntary_switches: Arc<Gauge>,
    rss_bytes: Arc<Gauge>,
    virtual_bytes: Arc<Gauge>,
    threads: Arc<Gauge>,
    open_fds: Arc<Gauge>,
    previous: Usage,
}

/// Raw `getrusage` readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    /// User CPU time in nanoseconds.
    pub user_ns: i64,
    /// System CPU time in nanoseconds.
    pub system_ns: i64,
    /// Peak resident set size in bytes.
    pub max_rss_bytes: i64,
    /// Page faults served without I/O.
    pub minor_faults: i64,
    /// Page faults that required I/O.
    pub major_faults: i64,
    /// Voluntary context switches.
    pub voluntary_switches: i64,
    /// Involuntary context switches.
    pub involuntary_switches: i64,
}

impl ProcessStats {
    /// Register the process gauges in `registry` under `process.*` names.
    pub fn register(registry: &Registry) -> Result<Self, RegistryError> {
        Ok(Self {
            started: Instant::now(),
            uptime_ns: registry.new_gauge("process.uptime_ns")?,
            cpu_user_ns: registry.new_gauge("process.cpu.user_ns")?,
            cpu_system_ns: registry.new_gauge("process.cpu.system_ns")?,
            max_rss_bytes: registry.new_gauge("process.mem.max_rss_bytes")?,
            minor_faults: registry.new_gauge("process.faults.minor")?,
            major_faults: registry.new_gauge("process.faults.major")?,
            voluntary_switches: registry.new_gauge("process.ctx_switches.voluntary")?,
            involuntary_switches: registry.new_gauge("process.ctx_switches.involuntary")?,
            rss_bytes: registry.new_gauge("process.mem.rss_bytes")?,
            virtual_bytes: registry.new_gauge("process.mem.virtual_bytes")?,
            threads: registry.new_gauge("process.threads")?,
            open_fds: registry.new_gauge("process.fds")?,
            previous: Usage::default(),
        })
    }

    /// Sample the OS counters into the registered gauges.
    pub fn capture(&mut self) {
        self.uptime_ns
            .update(self.started.elapsed().as_nanos().min(i64::MAX as u128) as i64);

        if let Some(usage) = read_usage() {
            self.record_usage(usage);
        }

        #[cfg(target_os = "linux")]
        {
            if let Ok(statm) = std::fs::read_to_string("/proc/self/statm") {
                if let Some((size, resident)) = parse_statm(&statm) {
                    let page = page_size();
                    self.virtual_bytes.update(size.saturating_mul(page));
                    self.rss_bytes.update(resident.saturating_mul(page));
                }
            }
            if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
                if let Some(threads) = parse_status_threads(&status) {
                    self.threads.update(threads);
                }
            }
            if let Ok(dir) = std::fs::read_dir("/proc/self/fd") {
                self.open_fds.update(dir.count() as i64);
            }
        }
    }

    fn record_usage(&mut self, usage: Usage) {
        let prev = self.previous;
        self.cpu_user_ns.update(usage.user_ns);
        self.cpu_system_ns.update(usage.system_ns);
        self.max_rss_bytes.update(usage.max_rss_bytes);
        self.minor_faults.update(usage.minor_faults - prev.minor_faults);
        self.major_faults.update(usage.major_faults - prev.major_faults);
        self.voluntary_switches
            .update(usage.voluntary_switches - prev.voluntary_switches);
        self.involuntary_switches
            .update(usage.involuntary_switches - prev.involuntary_switches);
        self.previous = usage;
    }
}

#[cfg(unix)]
fn read_usage() -> Option<Usage> {
    // SAFETY: rusage is plain old data; getrusage fills it on success.
    let usage = unsafe {
        let mut usage: libc::rusage = std::mem::zeroed();
        if libc::getrusage(libc::RUSAGE_SELF, &mut usage) != 0 {
            return None;
        }
        usage
    };

    let tv_ns = |tv: libc::timeval| tv.tv_sec as i64 * 1_000_000_000 + tv.tv_usec as i64 * 1_000;

    // Linux reports ru_maxrss in KiB, macOS in bytes.
    #[cfg(target_os = "macos")]
    let max_rss_bytes = usage.ru_maxrss as i64;
    #[cfg(not(target_os = "macos"))]
    let max_rss_bytes = usage.ru_maxrss as i64 * 1024;

    Some(Usage {
        user_ns: tv_ns(usage.ru_utime),
        system_ns: tv_ns(usage.ru_stime),
        max_rss_bytes,
        minor_faults: usage.ru_minflt as i64,
        major_faults: usage.ru_majflt as i64,
        voluntary_switches: usage.ru_nvcsw as i64,
        involuntary_switches: usage.ru_nivcsw as i64,
    })
}

#[cfg(not(unix))]
fn read_usage() -> Option<Usage> {
    None
}

#[cfg(target_os = "linux")]
fn page_size() -> i64 {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as i64
    } else {
        4096
    }
}

/// Parse `/proc/self/statm`: total program size and resident set, in pages.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_statm(content: &str) -> Option<(i64, i64)> {
    let mut parts = content.split_whitespace();
    let size = parts.next()?.parse().ok()?;
    let resident = parts.next()?.parse().ok()?;
    Some((size, resident))
}

/// Extract the `Threads:` line of `/proc/self/status`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_status_threads(content: &str) -> Option<i64> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("Threads:"))
        .and_then(|v| v.trim().parse().ok())
}
