//! Cooperative polling loop driving a [`Session`].
//!
//! One loop polls the telemetry source, feeds each new sample through the
//! session and sleeps. The sleep is the cancellation point. Whatever ends the
//! loop (post-flight taxi, end of stream, telemetry failure or
//! cancellation), the OFP report is rendered exactly once from the log as it
//! stands and handed to the configured target.
//!
//! # Cadence
//!
//! ```text
//! normal:        poll_interval          (default 5 s)
//! takeoff roll:  takeoff_roll_interval  (default 200 ms)
//! ```
//!
//! A [`ReplaySource`](crate::telemetry::ReplaySource) yields one queued line
//! per poll, so a replayed file is paced at one sample per interval. Live
//! streams should go through
//! [`spawn_stream_reader`](crate::telemetry::spawn_stream_reader), which only
//! ever hands over the newest sample.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::phase::FlightPhase;
use crate::passage::PassageRecord;
use crate::report::{report_filename, write_report, write_report_file, FuelAnalysis, ReportError};
use crate::session::Session;
use crate::telemetry::{Polled, TelemetrySource};

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default interval between polls during the takeoff roll.
pub const DEFAULT_TAKEOFF_ROLL_INTERVAL: Duration = Duration::from_millis(200);

/// Polling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Interval between polls.
    pub poll_interval: Duration,
    /// Interval between polls while on the takeoff roll.
    pub takeoff_roll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            takeoff_roll_interval: DEFAULT_TAKEOFF_ROLL_INTERVAL,
        }
    }
}

impl MonitorConfig {
    /// Use one interval for every phase.
    pub fn uniform(interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            takeoff_roll_interval: interval.min(DEFAULT_TAKEOFF_ROLL_INTERVAL),
        }
    }

    fn interval_for(&self, in_takeoff_roll: bool) -> Duration {
        if in_takeoff_roll {
            self.takeoff_roll_interval
        } else {
            self.poll_interval
        }
    }
}

/// Where the final report goes.
pub enum ReportTarget {
    /// Write to this file.
    File(PathBuf),
    /// Write into this directory under the default report file name.
    Directory(PathBuf),
    /// Write to an arbitrary byte sink.
    Writer(Box<dyn Write + Send>),
    /// Keep the report in memory only.
    Discard,
}

impl std::fmt::Debug for ReportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportTarget::File(path) => f.debug_tuple("File").field(path).finish(),
            ReportTarget::Directory(path) => f.debug_tuple("Directory").field(path).finish(),
            ReportTarget::Writer(_) => f.write_str("Writer"),
            ReportTarget::Discard => f.write_str("Discard"),
        }
    }
}

/// Why monitoring ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Airborne once and now below the airborne threshold.
    PostflightTaxi,
    /// The telemetry source has no more samples.
    StreamEnded,
    /// The telemetry source failed.
    TelemetryFailed(String),
    /// The cancellation token fired.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::PostflightTaxi => write!(f, "post-flight taxi reached"),
            StopReason::StreamEnded => write!(f, "telemetry stream ended"),
            StopReason::TelemetryFailed(e) => write!(f, "telemetry failed: {}", e),
            StopReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of a monitoring run.
#[derive(Debug, Clone)]
pub struct MonitorSummary {
    /// Why the loop stopped.
    pub stop_reason: StopReason,
    /// Samples fed to the session.
    pub samples_processed: u64,
    /// Records in the final log.
    pub passages: usize,
    /// Fuel use over the reported legs.
    pub fuel: FuelAnalysis,
    /// Rendered report text.
    pub report: String,
    /// File the report was written to, if any.
    pub report_path: Option<PathBuf>,
    /// Error from the report target, if writing failed.
    pub report_error: Option<String>,
}

/// Receives monitoring events as they happen.
///
/// All methods default to doing nothing.
pub trait MonitorListener {
    /// A passage record was appended to the log.
    fn on_passage(&mut self, _record: &PassageRecord) {}

    /// The flight phase changed.
    fn on_phase_change(&mut self, _from: FlightPhase, _to: FlightPhase) {}

    /// The first takeoff roll started.
    fn on_takeoff_roll(&mut self) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl MonitorListener for NoopListener {}

/// Drives a session from a telemetry source until monitoring ends.
pub struct Monitor<'l> {
    config: MonitorConfig,
    target: ReportTarget,
    cancel: CancellationToken,
    listener: Box<dyn MonitorListener + 'l>,
}

impl<'l> Monitor<'l> {
    /// Create a monitor that keeps the report in memory.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            target: ReportTarget::Discard,
            cancel: CancellationToken::new(),
            listener: Box::new(NoopListener),
        }
    }

    /// Set where the final report goes.
    pub fn with_report_target(mut self, target: ReportTarget) -> Self {
        self.target = target;
        self
    }

    /// Use an external cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Receive events while monitoring.
    pub fn with_listener(mut self, listener: impl MonitorListener + 'l) -> Self {
        self.listener = Box::new(listener);
        self
    }

    /// Token that stops this monitor when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until the flight ends, the stream ends or the token is cancelled.
    pub async fn run<S: TelemetrySource>(
        mut self,
        session: &mut Session,
        source: &mut S,
    ) -> MonitorSummary {
        tracing::info!(
            departure = %session.departure_code(),
            destination = %session.destination_code(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Monitoring started"
        );

        let stop_reason = self.poll_loop(session, source).await;
        tracing::info!(
            reason = %stop_reason,
            samples = session.samples_processed(),
            passages = session.log().len(),
            "Monitoring stopped"
        );

        let report = session.render_report();
        let (report_path, report_error) = match deliver(&mut self.target, session, &report) {
            Ok(path) => (path, None),
            Err(e) => {
                tracing::error!(error = %e, "Failed to write OFP report");
                (None, Some(e.to_string()))
            }
        };

        MonitorSummary {
            stop_reason,
            samples_processed: session.samples_processed(),
            passages: session.log().len(),
            fuel: session.fuel_analysis(),
            report,
            report_path,
            report_error,
        }
    }

    async fn poll_loop<S: TelemetrySource>(
        &mut self,
        session: &mut Session,
        source: &mut S,
    ) -> StopReason {
        let mut phase = session.phase();

        loop {
            if self.cancel.is_cancelled() {
                return StopReason::Cancelled;
            }

            match source.poll() {
                Ok(Polled::Sample(sample)) => {
                    let outcome = session.process(&sample);

                    if outcome.entered_takeoff_roll {
                        self.listener.on_takeoff_roll();
                    }
                    if outcome.phase != phase {
                        self.listener.on_phase_change(phase, outcome.phase);
                        phase = outcome.phase;
                    }
                    for record in &outcome.passages {
                        self.listener.on_passage(record);
                    }
                    if outcome.should_stop {
                        return StopReason::PostflightTaxi;
                    }
                }
                Ok(Polled::NotReady) => {
                    tracing::trace!("No new telemetry");
                }
                Ok(Polled::Ended) => return StopReason::StreamEnded,
                Err(e) => {
                    tracing::error!(error = %e, "Telemetry source failed");
                    return StopReason::TelemetryFailed(e.to_string());
                }
            }

            let interval = self.config.interval_for(session.in_takeoff_roll());
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return StopReason::Cancelled,
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

/// Hand the report to its target; returns the file written, if any.
fn deliver(
    target: &mut ReportTarget,
    session: &Session,
    report: &str,
) -> Result<Option<PathBuf>, ReportError> {
    match target {
        ReportTarget::File(path) => {
            write_report_file(path, report)?;
            tracing::info!(path = %path.display(), "OFP report written");
            Ok(Some(path.clone()))
        }
        ReportTarget::Directory(dir) => {
            let path = dir.join(report_filename(
                session.departure_code(),
                session.destination_code(),
                session.now(),
            ));
            write_report_file(&path, report)?;
            tracing::info!(path = %path.display(), "OFP report written");
            Ok(Some(path))
        }
        ReportTarget::Writer(writer) => {
            write_report(report, writer)?;
            Ok(None)
        }
        ReportTarget::Discard => Ok(None),
    }
}
