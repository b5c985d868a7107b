// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Producer-facing metric types.
//!
//! Anything implementing [`Metric`] can be handed to the writer. [`Sample`] is
//! the ready-made implementation most producers use.

use crate::line_protocol::FieldValue;
use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

/// Tag set: string keys to string values.
pub type Tags = BTreeMap<String, String>;

/// Field set: string keys to typed values.
pub type Fields = BTreeMap<String, FieldValue>;

/// One named, tagged, timestamped measurement.
///
/// Implementations must be `Send` because the value travels from the
/// producer thread to whichever worker dequeues it.
pub trait Metric: Send {
    /// Measurement name.
    fn measurement(&self) -> &str;

    /// Metric-specific tags, or `None` when the metric carries none.
    fn tags(&self) -> Option<&Tags>;

    /// Field values. Must not be empty for the metric to be written.
    fn fields(&self) -> &Fields;

    /// Instant the measurement was taken.
    fn time(&self) -> SystemTime;
}

impl<M: Metric + ?Sized> Metric for Box<M> {
    fn measurement(&self) -> &str {
        (**self).measurement()
    }

    fn tags(&self) -> Option<&Tags> {
        (**self).tags()
    }

    fn fields(&self) -> &Fields {
        (**self).fields()
    }

    fn time(&self) -> SystemTime {
        (**self).time()
    }
}

/// A plain metric value built by the caller.
///
/// ```
/// use influx_writer::{Metric, Sample};
///
/// let sample = Sample::new("requests")
///     .tag("route", "/login")
///     .field("count", 12i64)
///     .field("latency_ms", 3.5);
/// assert_eq!(sample.fields().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    measurement: String,
    tags: Option<Tags>,
    fields: Fields,
    time: SystemTime,
}

impl Sample {
    /// Start a sample for `measurement`, stamped with the current time.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: None,
            fields: Fields::new(),
            time: SystemTime::now(),
        }
    }

    /// Add a tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(Tags::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a field value.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Replace the whole field set.
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Override the timestamp.
    pub fn at(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }
}

impl Metric for Sample {
    fn measurement(&self) -> &str {
        &self.measurement
    }

    fn tags(&self) -> Option<&Tags> {
        self.tags.as_ref()
    }

    fn fields(&self) -> &Fields {
        &self.fields
    }

    fn time(&self) -> SystemTime {
        self.time
    }
}

/// Unit of transfer through the ingestion queue.
pub enum WriteRequest {
    /// One metric.
    Single(Box<dyn Metric>),
    /// Several metrics handed off together.
    Batch(Vec<Box<dyn Metric>>),
}

impl WriteRequest {
    /// Wrap a single metric.
    pub fn single<M: Metric + 'static>(metric: M) -> Self {
        WriteRequest::Single(Box::new(metric))
    }

    /// Wrap a sequence of metrics.
    pub fn batch<M: Metric + 'static>(metrics: Vec<M>) -> Self {
        WriteRequest::Batch(
            metrics
                .into_iter()
                .map(|m| Box::new(m) as Box<dyn Metric>)
                .collect(),
        )
    }

    /// Number of metrics carried.
    pub fn len(&self) -> usize {
        match self {
            WriteRequest::Single(_) => 1,
            WriteRequest::Batch(metrics) => metrics.len(),
        }
    }

    /// True when the request carries no metric at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the carried metrics in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Metric> {
        let slice: &[Box<dyn Metric>] = match self {
            WriteRequest::Single(m) => std::slice::from_ref(m),
            WriteRequest::Batch(metrics) => metrics,
        };
        slice.iter().map(|m| &**m as &dyn Metric)
    }
}

impl fmt::Debug for WriteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteRequest::Single(m) => f.debug_tuple("Single").field(&m.measurement()).finish(),
            WriteRequest::Batch(metrics) => f.debug_tuple("Batch").field(&metrics.len()).finish(),
        }
    }
}
