//! Report output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors writing a report to its sink.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The sink rejected the write.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// The report file or its directory could not be created.
    #[error("Failed to create report file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write rendered report text to any byte sink.
pub fn write_report<W: Write>(report: &str, sink: &mut W) -> Result<(), ReportError> {
    sink.write_all(report.as_bytes())?;
    sink.flush()?;
    Ok(())
}

/// Write rendered report text to a file, creating parent directories.
pub fn write_report_file(path: &Path, report: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Create {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut file = fs::File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_report(report, &mut file)
}

/// Default file name for a report, e.g. `OFP_LGRP-ESSA_20261019_1530.txt`.
pub fn report_filename(departure: &str, destination: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "OFP_{}-{}_{}.txt",
        departure,
        destination,
        generated_at.format("%Y%m%d_%H%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_write_report_to_buffer() {
        let mut buffer = Vec::new();
        write_report("line\n", &mut buffer).unwrap();
        assert_eq!(buffer, b"line\n");
    }

    #[test]
    fn test_write_report_file_creates_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports").join("ofp.txt");

        write_report_file(&path, "OFP\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "OFP\n");
    }

    #[test]
    fn test_write_report_file_fails_on_directory_path() {
        let temp = TempDir::new().unwrap();
        let result = write_report_file(temp.path(), "OFP\n");
        assert!(matches!(result, Err(ReportError::Create { .. })));
    }

    #[test]
    fn test_report_filename() {
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 15, 30, 0).unwrap();
        assert_eq!(
            report_filename("LGRP", "ESSA", t),
            "OFP_LGRP-ESSA_20261019_1530.txt"
        );
    }
}
