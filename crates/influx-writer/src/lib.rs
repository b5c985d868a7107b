// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batching InfluxDB writer
//!
//! Accepts metrics from any thread without blocking, groups them into
//! batches and hands each batch to a [`Sink`] (InfluxDB v1 `/write` over
//! HTTP by default).
//!
//! This crate provides:
//! - A bounded ingestion queue that drops metrics instead of blocking
//! - A pool of workers flushing on batch size or on a timer
//! - InfluxDB Line Protocol encoding with configurable precision
//! - YAML/JSON configuration with common tags
//! - A periodic collector for process runtime statistics
//!
//! # Overview
//!
//! ```text
//! write() --> bounded queue --> Worker x N --> Batch --> Sink
//!                 |                  ^
//!               full: drop      count / interval / close
//! ```
//!
//! Every worker owns its batch. A flush is triggered when a batch reaches
//! `batch_count` points, when the interval elapses with points pending, and
//! once more on [`Writer::close`] after the queue has been drained.

pub mod assembler;
pub mod batch;
pub mod config;
pub mod error;
pub mod line_protocol;
pub mod metric;
pub mod precision;
pub mod runtime;
pub mod sink;
pub mod stats;
mod worker;
pub mod writer;

pub use batch::{Batch, Point};
pub use config::{ResolvedConfig, WriterConfig};
pub use error::{ConfigError, ConversionError, RegistryError, SinkError, WriterError};
pub use line_protocol::FieldValue;
pub use metric::{Fields, Metric, Sample, Tags, WriteRequest};
pub use precision::Precision;
pub use runtime::{ProcessStats, Registry, RuntimeCollector};
#[cfg(feature = "http")]
pub use sink::HttpSink;
pub use sink::{Sink, StdoutSink};
pub use stats::StatsSnapshot;
pub use writer::Writer;
