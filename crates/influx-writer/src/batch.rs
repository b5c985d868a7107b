// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Points and the per-worker batch that accumulates them.
//!
//! A batch is scoped to one database and one timestamp precision. Workers
//! own their batch exclusively and swap it for an empty one on flush.

use crate::line_protocol::encode_point;
use crate::metric::{Fields, Tags};
use crate::precision::Precision;
use std::sync::Arc;
use std::time::SystemTime;

/// A converted metric, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Measurement name.
    pub measurement: String,
    /// Merged tag set (metric tags over common tags).
    pub tags: Tags,
    /// Field values, never empty.
    pub fields: Fields,
    /// Sample time.
    pub time: SystemTime,
}

/// An in-progress collection of points awaiting a single flush.
#[derive(Debug, Clone)]
pub struct Batch {
    database: Arc<str>,
    precision: Precision,
    points: Vec<Point>,
}

impl Batch {
    /// Create an empty batch for `database` at `precision`.
    pub fn new(database: impl Into<Arc<str>>, precision: Precision) -> Self {
        Self {
            database: database.into(),
            precision,
            points: Vec::new(),
        }
    }

    /// Append a point.
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Hand the accumulated points out as a batch, leaving this one empty
    /// with the same database and precision.
    pub fn take(&mut self) -> Batch {
        Batch {
            database: self.database.clone(),
            precision: self.precision,
            points: std::mem::take(&mut self.points),
        }
    }

    /// Target database.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Timestamp precision.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Points in append order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the current number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encode every point, one Line Protocol line per point, `\n` separated.
    pub fn to_line_protocol(&self) -> String {
        let mut out = String::with_capacity(self.points.len() * 64);
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            encode_point(point, self.precision, &mut out);
        }
        out
    }
}
