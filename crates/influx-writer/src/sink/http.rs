// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB 1.x HTTP write sink.
//!
//! Batches are POSTed as Line Protocol to `<endpoint>/write?db=..&precision=..`.
//! No request timeout is applied: a hung server stalls the calling worker
//! until the connection fails.

use super::Sink;
use crate::batch::Batch;
use crate::error::{ConfigError, SinkError};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Error body returned by InfluxDB on rejected writes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP sink for the InfluxDB `/write` endpoint.
pub struct HttpSink {
    client: Client,
    write_url: Url,
    user: String,
    password: String,
    closed: AtomicBool,
}

impl HttpSink {
    /// Build a sink for `endpoint` (e.g., "http://localhost:8086").
    ///
    /// An empty `user` disables basic authentication.
    pub fn new(endpoint: &str, user: &str, password: &str) -> Result<Self, ConfigError> {
        let write_url = write_url(endpoint)?;
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ConfigError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            write_url,
            user: user.to_string(),
            password: password.to_string(),
            closed: AtomicBool::new(false),
        })
    }

    /// Full URL of the write endpoint, without query.
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }
}

impl Sink for HttpSink {
    fn write(&self, batch: &Batch) -> Result<(), SinkError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SinkError::Closed);
        }
        if batch.is_empty() {
            return Ok(());
        }

        let mut url = self.write_url.clone();
        url.query_pairs_mut()
            .append_pair("db", batch.database())
            .append_pair("precision", batch.precision().as_str());

        let mut request = self.client.post(url).body(batch.to_line_protocol());
        if !self.user.is_empty() {
            request = request.basic_auth(&self.user, Some(&self.password));
        }

        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(SinkError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn close(&self) -> Result<(), SinkError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// Append `/write` to the endpoint path.
fn write_url(endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Endpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }

    let path = format!("{}/write", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    Ok(url)
}
