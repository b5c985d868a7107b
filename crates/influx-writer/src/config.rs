// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Writer configuration, loadable from JSON or YAML.

use crate::error::ConfigError;
use crate::metric::Tags;
use crate::precision::Precision;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Extra slots allocated on top of `batch_count` when no queue capacity is
/// configured.
pub const DEFAULT_QUEUE_HEADROOM: usize = 100;

/// Writer configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WriterConfig {
    /// InfluxDB URL (e.g., "http://localhost:8086").
    pub endpoint: String,
    /// Target database.
    pub database: String,
    /// Basic-auth user. Empty disables authentication.
    #[serde(default)]
    pub user: String,
    /// Basic-auth password.
    #[serde(default)]
    pub password: String,
    /// Value of the `host` tag attached to every point.
    #[serde(default)]
    pub host: String,
    /// Value of the `label` tag attached to every point.
    #[serde(default)]
    pub label: String,
    /// Flush interval as a duration string (e.g., "1s", "500ms").
    pub batch_interval: String,
    /// Point count above which a worker forces a flush.
    pub batch_count: usize,
    /// Number of worker threads. Values below 1 are treated as 1.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Timestamp precision unit ("ns", "us", "ms", "s", "m", "h").
    pub precision: String,
    /// Ingestion queue capacity. None = `batch_count + 100`.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Additional tags attached to every point.
    #[serde(default)]
    pub tags: Tags,
}

fn default_worker_count() -> usize {
    1
}

impl WriterConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse configuration from a file. `.json` files are read as JSON,
    /// everything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Validate and resolve every derived setting.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let precision: Precision = self.precision.parse()?;

        let batch_interval = humantime::parse_duration(&self.batch_interval).map_err(|e| {
            ConfigError::Interval {
                value: self.batch_interval.clone(),
                reason: e.to_string(),
            }
        })?;
        if batch_interval.is_zero() {
            return Err(ConfigError::Interval {
                value: self.batch_interval.clone(),
                reason: "interval must be greater than zero".to_string(),
            });
        }

        let queue_capacity = self
            .queue_capacity
            .unwrap_or_else(|| self.batch_count.saturating_add(DEFAULT_QUEUE_HEADROOM));
        if queue_capacity == 0 {
            return Err(ConfigError::QueueCapacity);
        }

        let mut common_tags = self.tags.clone();
        common_tags.insert("label".to_string(), self.label.clone());
        common_tags.insert("host".to_string(), self.host.clone());

        Ok(ResolvedConfig {
            database: self.database.clone(),
            precision,
            batch_interval,
            batch_count: self.batch_count,
            worker_count: self.worker_count.max(1),
            queue_capacity,
            common_tags,
        })
    }
}

/// Configuration after validation, as used by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Target database.
    pub database: String,
    /// Timestamp precision.
    pub precision: Precision,
    /// Flush interval.
    pub batch_interval: Duration,
    /// Point count above which a flush is forced.
    pub batch_count: usize,
    /// Worker thread count, at least 1.
    pub worker_count: usize,
    /// Ingestion queue capacity, at least 1.
    pub queue_capacity: usize,
    /// Tags attached to every point.
    pub common_tags: Tags,
}
