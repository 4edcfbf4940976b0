//! CLI error type.

use std::fmt;

use flightlog::config::ConfigError;
use flightlog::flight_plan::FlightPlanError;
use flightlog::logging::LoggingError;
use flightlog::report::ReportError;
use flightlog::telemetry::TelemetryError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem (bad key, bad value, unreadable file).
    Config(String),
    /// The flight plan could not be loaded.
    FlightPlan(FlightPlanError),
    /// The telemetry input could not be opened.
    Telemetry(TelemetryError),
    /// Logging could not be initialized.
    Logging(LoggingError),
    /// The report could not be written.
    Report(ReportError),
    /// The async runtime could not be started.
    Runtime(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::FlightPlan(e) => write!(f, "Flight plan error: {}", e),
            CliError::Telemetry(e) => write!(f, "Telemetry error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Report(e) => write!(f, "Report error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(_) => None,
            CliError::FlightPlan(e) => Some(e),
            CliError::Telemetry(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Report(e) => Some(e),
            CliError::Runtime(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<FlightPlanError> for CliError {
    fn from(e: FlightPlanError) -> Self {
        CliError::FlightPlan(e)
    }
}

impl From<TelemetryError> for CliError {
    fn from(e: TelemetryError) -> Self {
        CliError::Telemetry(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<ReportError> for CliError {
    fn from(e: ReportError) -> Self {
        CliError::Report(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_has_no_source() {
        let err = CliError::Config("bad key".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad key");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_wrapped_errors_keep_source() {
        let err: CliError = TelemetryError::Io(std::io::Error::other("gone")).into();
        assert!(err.to_string().starts_with("Telemetry error:"));
        assert!(err.source().is_some());
    }
}
