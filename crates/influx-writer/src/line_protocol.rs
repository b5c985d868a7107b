// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Line Protocol encoding.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp
//! ```
//!
//! The timestamp is expressed in the batch precision.
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use crate::batch::Point;
use crate::precision::Precision;
use std::fmt;
use std::fmt::Write as _;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
    /// UTF-8 string.
    String(String),
    /// Boolean value.
    Boolean(bool),
}

impl FieldValue {
    /// Append this value in Line Protocol form.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    /// - String: quoted with double quotes, inner quotes escaped (e.g., `"hello"`)
    /// - Boolean: `true` or `false`
    pub fn write_line_protocol(&self, out: &mut String) {
        match self {
            FieldValue::Float(v) => {
                let _ = write!(out, "{}", v);
            }
            FieldValue::Integer(v) => {
                let _ = write!(out, "{}i", v);
            }
            FieldValue::String(v) => {
                out.push('"');
                for c in v.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            FieldValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        }
    }

    /// Format this value for Line Protocol.
    pub fn to_line_protocol(&self) -> String {
        let mut out = String::new();
        self.write_line_protocol(&mut out);
        out
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line_protocol())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(v as f64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

/// Append one point as a Line Protocol line (without trailing newline).
///
/// Tags are written in key order; tags with an empty key or value are
/// skipped since Line Protocol has no representation for them. Points are
/// expected to come out of [`crate::assembler::convert`]; the timestamp of a
/// hand-built point outside the storable range is left out.
pub fn encode_point(point: &Point, precision: Precision, out: &mut String) {
    escape_into(out, &point.measurement, &[',', ' ']);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        out.push(',');
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        escape_into(out, value, &[',', '=', ' ']);
    }

    out.push(' ');

    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        value.write_line_protocol(out);
    }

    if let Some(ts) = precision.timestamp(point.time) {
        let _ = write!(out, " {}", ts);
    }
}

/// Escape `special` characters of `s` with a backslash.
fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{Fields, Tags};
    use std::time::{Duration, UNIX_EPOCH};

    fn point(measurement: &str, tags: &[(&str, &str)], fields: Fields, secs: u64) -> Point {
        Point {
            measurement: measurement.to_string(),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Tags>(),
            fields,
            time: UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    fn encode(p: &Point, precision: Precision) -> String {
        let mut out = String::new();
        encode_point(p, precision, &mut out);
        out
    }

    #[test]
    fn test_field_value_float() {
        assert_eq!(FieldValue::Float(3.15).to_line_protocol(), "3.15");
    }

    #[test]
    fn test_field_value_integer() {
        assert_eq!(FieldValue::Integer(42).to_line_protocol(), "42i");
        assert_eq!(FieldValue::Integer(-7).to_line_protocol(), "-7i");
    }

    #[test]
    fn test_field_value_string_with_quotes_and_backslash() {
        let v = FieldValue::String("say \"hi\" \\o/".to_string());
        assert_eq!(v.to_line_protocol(), "\"say \\\"hi\\\" \\\\o/\"");
    }

    #[test]
    fn test_field_value_boolean() {
        assert_eq!(FieldValue::Boolean(true).to_line_protocol(), "true");
        assert_eq!(FieldValue::Boolean(false).to_line_protocol(), "false");
    }

    #[test]
    fn test_simple_point() {
        let mut fields = Fields::new();
        fields.insert("value".into(), FieldValue::Float(23.5));
        let p = point("temperature", &[], fields, 1);

        assert_eq!(encode(&p, Precision::Nanoseconds), "temperature value=23.5 1000000000");
        assert_eq!(encode(&p, Precision::Seconds), "temperature value=23.5 1");
    }

    #[test]
    fn test_tags_and_fields_sorted_by_key() {
        let mut fields = Fields::new();
        fields.insert("temp".into(), FieldValue::Float(22.1));
        fields.insert("humidity".into(), FieldValue::Integer(65));
        fields.insert("ok".into(), FieldValue::Boolean(true));
        let p = point("weather", &[("station", "north"), ("region", "eu")], fields, 2);

        assert_eq!(
            encode(&p, Precision::Milliseconds),
            "weather,region=eu,station=north humidity=65i,ok=true,temp=22.1 2000"
        );
    }

    #[test]
    fn test_escape_special_chars() {
        let mut fields = Fields::new();
        fields.insert("field=key".into(), FieldValue::String("hello \"world\"".into()));
        let p = point("my measurement", &[("tag key", "tag,value")], fields, 3);

        assert_eq!(
            encode(&p, Precision::Seconds),
            "my\\ measurement,tag\\ key=tag\\,value field\\=key=\"hello \\\"world\\\"\" 3"
        );
    }

    #[test]
    fn test_empty_tag_values_are_skipped() {
        let mut fields = Fields::new();
        fields.insert("v".into(), FieldValue::Integer(1));
        let p = point("m", &[("host", ""), ("label", "api")], fields, 4);

        assert_eq!(encode(&p, Precision::Seconds), "m,label=api v=1i 4");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(FieldValue::from(1.5f64), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(3i32), FieldValue::Integer(3));
        assert_eq!(FieldValue::from(true), FieldValue::Boolean(true));
        assert_eq!(FieldValue::from("x"), FieldValue::String("x".into()));
    }
}
