// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Timestamp precision of a batch.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unit in which point timestamps are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    /// Nanoseconds.
    #[default]
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
}

impl Precision {
    /// Length of one unit in nanoseconds.
    pub fn unit_nanos(self) -> i64 {
        match self {
            Precision::Nanoseconds => 1,
            Precision::Microseconds => 1_000,
            Precision::Milliseconds => 1_000_000,
            Precision::Seconds => 1_000_000_000,
            Precision::Minutes => 60_000_000_000,
            Precision::Hours => 3_600_000_000_000,
        }
    }

    /// Value of the `precision` query parameter understood by InfluxDB.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Nanoseconds => "ns",
            Precision::Microseconds => "us",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// Convert a wall-clock instant into a timestamp in this unit.
    ///
    /// Sub-unit remainders are truncated toward zero. Instants before the
    /// Unix epoch yield negative timestamps. Returns `None` when the instant
    /// lies outside [`MIN_NANO_TIME`]..=[`MAX_NANO_TIME`].
    pub fn timestamp(self, time: SystemTime) -> Option<i64> {
        let nanos = unix_nanos(time)?;
        Some(nanos / self.unit_nanos())
    }
}

/// Earliest instant InfluxDB can store, in nanoseconds since the epoch.
pub const MIN_NANO_TIME: i64 = i64::MIN + 2;

/// Latest instant InfluxDB can store, in nanoseconds since the epoch.
pub const MAX_NANO_TIME: i64 = i64::MAX - 1;

/// Nanoseconds since the Unix epoch, if the instant is storable.
pub fn unix_nanos(time: SystemTime) -> Option<i64> {
    let nanos: i128 = match time.duration_since(UNIX_EPOCH) {
        Ok(d) => i128::try_from(d.as_nanos()).ok()?,
        Err(e) => -i128::try_from(e.duration().as_nanos()).ok()?,
    };
    if nanos < MIN_NANO_TIME as i128 || nanos > MAX_NANO_TIME as i128 {
        return None;
    }
    Some(nanos as i64)
}

impl FromStr for Precision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ns" => Ok(Precision::Nanoseconds),
            "us" | "µs" | "μs" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            "m" => Ok(Precision::Minutes),
            "h" => Ok(Precision::Hours),
            other => Err(ConfigError::Precision(other.to_string())),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
