// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric to point conversion.
//!
//! Merges the writer-wide common tags into each metric and validates that
//! the result is representable as a Line Protocol point.

use crate::batch::Point;
use crate::error::ConversionError;
use crate::line_protocol::FieldValue;
use crate::metric::{Metric, Tags};
use crate::precision::unix_nanos;

/// Convert a metric into a point, merging `common_tags`.
///
/// Metric tags take precedence over common tags on key collision. A metric
/// without tags gets the common tags verbatim.
pub fn convert(metric: &dyn Metric, common_tags: &Tags) -> Result<Point, ConversionError> {
    let measurement = metric.measurement();
    if measurement.is_empty() {
        return Err(ConversionError::EmptyMeasurement);
    }

    let fields = metric.fields();
    if fields.is_empty() {
        return Err(ConversionError::NoFields(measurement.to_string()));
    }
    if let Some((key, _)) = fields
        .iter()
        .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
    {
        return Err(ConversionError::NonFinite {
            measurement: measurement.to_string(),
            field: key.clone(),
        });
    }

    if fields.keys().any(|k| k.is_empty()) {
        return Err(ConversionError::EmptyFieldKey(measurement.to_string()));
    }

    let time = metric.time();
    if unix_nanos(time).is_none() {
        return Err(ConversionError::TimeOutOfRange(measurement.to_string()));
    }

    let tags = merge_tags(metric.tags(), common_tags);

    // Empty tags are never encoded, so only written names and values count.
    let written_tags = tags
        .iter()
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .flat_map(|(k, v)| [k.as_str(), v.as_str()]);
    let names = std::iter::once(measurement)
        .chain(written_tags)
        .chain(fields.keys().map(String::as_str));
    for name in names {
        check_escapable(measurement, name)?;
    }

    Ok(Point {
        measurement: measurement.to_string(),
        tags,
        fields: fields.clone(),
        time,
    })
}

/// Reject names Line Protocol escaping cannot represent.
fn check_escapable(measurement: &str, value: &str) -> Result<(), ConversionError> {
    if value.contains('\n') {
        return Err(ConversionError::Newline {
            measurement: measurement.to_string(),
            value: value.to_string(),
        });
    }
    if value.ends_with('\\') {
        return Err(ConversionError::TrailingBackslash {
            measurement: measurement.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Merge metric tags over common tags.
pub fn merge_tags(tags: Option<&Tags>, common_tags: &Tags) -> Tags {
    match tags {
        None => common_tags.clone(),
        Some(tags) => {
            let mut merged = common_tags.clone();
            merged.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged
        }
    }
}
