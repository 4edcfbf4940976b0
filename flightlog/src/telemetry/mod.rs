//! Aircraft telemetry input.
//!
//! The monitor consumes [`TelemetrySample`]s through the [`TelemetrySource`]
//! trait. Acquisition itself (simulator polling, UDP, ...) lives outside this
//! crate; two adapters are provided:
//!
//! ```text
//! JSON-lines file ──► ReplaySource ─────────┐
//!                                           ├──► TelemetrySource::poll ──► Session
//! acquisition task ──► SamplePublisher ──► LatestSampleSource
//! live stream ──► spawn_stream_reader ──┘  (last value wins)
//! ```

mod sample;
mod source;

pub use sample::{sanitize, TelemetrySample};
pub use source::{
    latest_sample_channel, spawn_stream_reader, LatestSampleSource, ReplaySource, SamplePublisher,
};

use thiserror::Error;

/// Errors raised while reading telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Underlying reader failed.
    #[error("I/O error reading telemetry: {0}")]
    Io(#[from] std::io::Error),

    /// A replay line could not be decoded.
    #[error("Malformed telemetry sample on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result of polling a telemetry source.
#[derive(Debug, Clone, PartialEq)]
pub enum Polled {
    /// A sample not previously returned.
    Sample(TelemetrySample),
    /// No new data since the last poll.
    NotReady,
    /// The source is exhausted; no further samples will arrive.
    Ended,
}

/// A pollable supplier of telemetry samples.
pub trait TelemetrySource {
    /// Fetch the next sample, if one is available.
    fn poll(&mut self) -> Result<Polled, TelemetryError>;
}
