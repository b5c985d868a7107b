// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sink capability: where flushed batches go.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpSink;

use crate::batch::Batch;
use crate::error::SinkError;
use std::io::Write;

/// Destination for flushed batches.
///
/// Workers call [`Sink::write`] synchronously from their own thread, so a
/// single sink is shared by every worker and must be `Send + Sync`. Workers
/// never hand over an empty batch, but sinks are public and may be driven
/// directly, so implementations treat an empty batch as a no-op.
pub trait Sink: Send + Sync {
    /// Deliver one batch. Failure loses the batch.
    fn write(&self, batch: &Batch) -> Result<(), SinkError>;

    /// Release the connection. Called once, after every worker stopped.
    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Prints every batch as Line Protocol on standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn write(&self, batch: &Batch) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", batch.to_line_protocol())?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Precision;

    #[test]
    fn test_stdout_sink_accepts_empty_batch() {
        let sink = StdoutSink;
        assert!(sink.write(&Batch::new("metrics", Precision::Seconds)).is_ok());
        assert!(sink.close().is_ok());
    }
}
