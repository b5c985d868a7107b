// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the writer, its configuration and its sinks.

/// Configuration errors. Always surfaced before any worker starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Timestamp precision is not a recognised duration unit.
    #[error("can't parse precision `{0}`: expected one of ns, us, ms, s, m, h")]
    Precision(String),

    /// Flush interval is not a valid duration string.
    #[error("can't parse batch interval `{value}`: {reason}")]
    Interval {
        /// The rejected string.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The configured queue capacity is zero.
    #[error("queue capacity must be at least 1")]
    QueueCapacity,

    /// The endpoint URL could not be used to build a sink.
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    Endpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single metric could not be turned into a point.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// The metric has an empty measurement name.
    #[error("metric has an empty measurement name")]
    EmptyMeasurement,

    /// The metric carries no field values.
    #[error("metric `{0}` has no fields")]
    NoFields(String),

    /// A field has an empty key.
    #[error("metric `{0}` has a field with an empty key")]
    EmptyFieldKey(String),

    /// A measurement, key or tag value ends with a backslash, which would
    /// escape the separator written after it.
    #[error("`{value}` in `{measurement}` ends with a backslash")]
    TrailingBackslash {
        /// Measurement of the rejected metric.
        measurement: String,
        /// The offending name or value.
        value: String,
    },

    /// A measurement, key or tag value contains a newline.
    #[error("`{value}` in `{measurement}` contains a newline")]
    Newline {
        /// Measurement of the rejected metric.
        measurement: String,
        /// The offending name or value.
        value: String,
    },

    /// The timestamp is outside the range InfluxDB can store.
    #[error("timestamp of `{0}` is outside the storable range")]
    TimeOutOfRange(String),

    /// A float field is NaN or infinite.
    #[error("field `{field}` of `{measurement}` is not a finite number")]
    NonFinite {
        /// Measurement the field belongs to.
        measurement: String,
        /// The offending field key.
        field: String,
    },
}

/// A sink write or close failed.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Transport-level failure (connect, DNS, TLS, body read).
    #[cfg(feature = "http")]
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server, or the raw body.
        message: String,
    },

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink was already closed.
    #[error("sink is closed")]
    Closed,
}

/// Errors returned by [`crate::Writer`] lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// The configuration was rejected; no worker was started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A worker thread could not be spawned.
    #[error("can't spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// `close` was called more than once.
    #[error("writer is already closed")]
    AlreadyClosed,

    /// Closing the sink failed after all workers stopped.
    #[error("closing sink failed: {0}")]
    Sink(#[from] SinkError),
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// An instrument with that name is already registered.
    #[error("duplicate instrument `{0}`")]
    Duplicate(String),
}
