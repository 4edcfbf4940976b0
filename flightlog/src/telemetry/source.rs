//! Telemetry source adapters.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tokio::sync::watch;

use super::{Polled, TelemetryError, TelemetrySample, TelemetrySource};

/// Replays samples from a JSON-lines stream, one sample per line.
///
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug)]
pub struct ReplaySource<R> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Replay from any buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead> TelemetrySource for ReplaySource<R> {
    fn poll(&mut self) -> Result<Polled, TelemetryError> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(Polled::Ended);
            }
            self.line_number += 1;

            let line = self.buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let sample = serde_json::from_str(line).map_err(|source| {
                TelemetryError::Malformed {
                    line: self.line_number,
                    source,
                }
            })?;
            return Ok(Polled::Sample(sample));
        }
    }
}

/// Create a single-writer, last-value-wins sample handoff.
///
/// The publisher side lives with the acquisition task; the source side is
/// polled by the monitor loop. Intermediate samples published between two
/// polls are overwritten.
pub fn latest_sample_channel() -> (SamplePublisher, LatestSampleSource) {
    let (tx, rx) = watch::channel(None);
    (SamplePublisher { tx }, LatestSampleSource { rx })
}

/// Writer half of [`latest_sample_channel`].
#[derive(Debug)]
pub struct SamplePublisher {
    tx: watch::Sender<Option<TelemetrySample>>,
}

impl SamplePublisher {
    /// Replace the current sample.
    pub fn publish(&self, sample: TelemetrySample) {
        self.tx.send_replace(Some(sample));
    }
}

/// Reader half of [`latest_sample_channel`].
#[derive(Debug)]
pub struct LatestSampleSource {
    rx: watch::Receiver<Option<TelemetrySample>>,
}

impl TelemetrySource for LatestSampleSource {
    fn poll(&mut self) -> Result<Polled, TelemetryError> {
        let fresh = {
            let value = self.rx.borrow_and_update();
            if value.has_changed() {
                value.clone()
            } else {
                None
            }
        };

        match fresh {
            Some(sample) => Ok(Polled::Sample(sample)),
            // Publisher dropped and the last value was already consumed
            None if self.rx.has_changed().is_err() => Ok(Polled::Ended),
            None => Ok(Polled::NotReady),
        }
    }
}

/// Read a live JSON-lines stream on a background thread.
///
/// Every decoded line is published into a [`latest_sample_channel`], so the
/// returned source always yields the most recent sample and never a backlog.
/// Malformed lines are logged and skipped. The source reports
/// [`Polled::Ended`] once the stream is exhausted or fails.
pub fn spawn_stream_reader<R>(reader: R) -> Result<LatestSampleSource, TelemetryError>
where
    R: BufRead + Send + 'static,
{
    let (publisher, source) = latest_sample_channel();

    std::thread::Builder::new()
        .name("telemetry-reader".to_string())
        .spawn(move || {
            let mut lines = ReplaySource::new(reader);
            loop {
                match lines.poll() {
                    Ok(Polled::Sample(sample)) => publisher.publish(sample),
                    Ok(Polled::NotReady) => {}
                    Ok(Polled::Ended) => break,
                    Err(TelemetryError::Malformed { line, source }) => {
                        tracing::warn!(line, error = %source, "Skipping malformed telemetry line");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Telemetry stream failed");
                        break;
                    }
                }
            }
            tracing::debug!("Telemetry stream closed");
        })?;

    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_replay_reads_samples_in_order() {
        let data = "\
{\"latitude\": 36.40, \"longitude\": 28.08, \"ground_speed_kt\": 10}
# comment

{\"latitude\": 36.41, \"longitude\": 28.07, \"ground_speed_kt\": 60}
";
        let mut source = ReplaySource::new(Cursor::new(data));

        let Polled::Sample(first) = source.poll().unwrap() else {
            panic!("expected first sample");
        };
        assert_eq!(first.ground_speed_kt, 10.0);

        let Polled::Sample(second) = source.poll().unwrap() else {
            panic!("expected second sample");
        };
        assert_eq!(second.ground_speed_kt, 60.0);

        assert_eq!(source.poll().unwrap(), Polled::Ended);
    }

    #[test]
    fn test_replay_reports_malformed_line() {
        let data = "{\"latitude\": 1.0, \"longitude\": 2.0}\nnot json\n";
        let mut source = ReplaySource::new(Cursor::new(data));

        assert!(matches!(source.poll(), Ok(Polled::Sample(_))));
        match source.poll() {
            Err(TelemetryError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_latest_sample_last_value_wins() {
        let (publisher, mut source) = latest_sample_channel();
        assert_eq!(source.poll().unwrap(), Polled::NotReady);

        publisher.publish(TelemetrySample::at(1.0, 1.0, 10.0));
        publisher.publish(TelemetrySample::at(2.0, 2.0, 20.0));

        match source.poll().unwrap() {
            Polled::Sample(sample) => assert_eq!(sample.ground_speed_kt, 20.0),
            other => panic!("expected sample, got {:?}", other),
        }
        assert_eq!(source.poll().unwrap(), Polled::NotReady);
    }

    #[test]
    fn test_latest_sample_ends_when_publisher_dropped() {
        let (publisher, mut source) = latest_sample_channel();
        publisher.publish(TelemetrySample::at(1.0, 1.0, 10.0));
        drop(publisher);

        // The final value is still delivered before the source reports the end
        assert!(matches!(source.poll().unwrap(), Polled::Sample(_)));
        assert_eq!(source.poll().unwrap(), Polled::Ended);
    }

    #[test]
    fn test_stream_reader_delivers_latest_and_ends() {
        let data = "\
{\"latitude\": 36.40, \"longitude\": 28.08, \"ground_speed_kt\": 10}
not json
{\"latitude\": 36.41, \"longitude\": 28.07, \"ground_speed_kt\": 60}
{\"latitude\": 36.42, \"longitude\": 28.06, \"ground_speed_kt\": 150}
";
        let mut source = spawn_stream_reader(Cursor::new(data)).unwrap();

        let mut seen = Vec::new();
        for _ in 0..500 {
            match source.poll().unwrap() {
                Polled::Sample(sample) => seen.push(sample.ground_speed_kt),
                Polled::NotReady => std::thread::sleep(std::time::Duration::from_millis(2)),
                Polled::Ended => break,
            }
        }

        assert_eq!(source.poll().unwrap(), Polled::Ended);
        // Lines read while nobody polled collapse into the newest one
        assert!(!seen.is_empty() && seen.len() <= 3);
        assert_eq!(seen.last(), Some(&150.0));
    }
}
