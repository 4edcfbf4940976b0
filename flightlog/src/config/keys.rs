//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use super::ConfigFile;

/// Errors resolving or setting a configuration key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },
}

/// A single setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    MonitorPollIntervalMs,
    MonitorTakeoffRollIntervalMs,
    ReportDirectory,
    ReportAircraftTitle,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 6] = [
    ConfigKey::MonitorPollIntervalMs,
    ConfigKey::MonitorTakeoffRollIntervalMs,
    ConfigKey::ReportDirectory,
    ConfigKey::ReportAircraftTitle,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section holding this key.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::MonitorPollIntervalMs | ConfigKey::MonitorTakeoffRollIntervalMs => {
                "monitor"
            }
            ConfigKey::ReportDirectory | ConfigKey::ReportAircraftTitle => "report",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::MonitorPollIntervalMs => "poll_interval_ms",
            ConfigKey::MonitorTakeoffRollIntervalMs => "takeoff_roll_interval_ms",
            ConfigKey::ReportDirectory => "directory",
            ConfigKey::ReportAircraftTitle => "aircraft_title",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::MonitorPollIntervalMs => config.monitor.poll_interval_ms.to_string(),
            ConfigKey::MonitorTakeoffRollIntervalMs => {
                config.monitor.takeoff_roll_interval_ms.to_string()
            }
            ConfigKey::ReportDirectory => config.report.directory.display().to_string(),
            ConfigKey::ReportAircraftTitle => {
                config.report.aircraft_title.clone().unwrap_or_default()
            }
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store a value. Empty strings clear optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::MonitorPollIntervalMs => {
                config.monitor.poll_interval_ms = parse_interval(value)?;
            }
            ConfigKey::MonitorTakeoffRollIntervalMs => {
                config.monitor.takeoff_roll_interval_ms = parse_interval(value)?;
            }
            ConfigKey::ReportDirectory => {
                if value.is_empty() {
                    return Err(invalid(value, "directory must not be empty"));
                }
                config.report.directory = PathBuf::from(value);
            }
            ConfigKey::ReportAircraftTitle => {
                config.report.aircraft_title = non_empty(value);
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(invalid(value, "log level must not be empty"));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = non_empty(value).map(PathBuf::from);
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

fn parse_interval(value: &str) -> Result<u64, ConfigKeyError> {
    match value.parse::<u64>() {
        Ok(0) => Err(invalid(value, "interval must be at least 1 ms")),
        Ok(ms) => Ok(ms),
        Err(e) => Err(invalid(value, &e.to_string())),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn invalid(value: &str, reason: &str) -> ConfigKeyError {
    ConfigKeyError::InvalidValue {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        assert_eq!(
            "monitor.poll_interval_ms".parse::<ConfigKey>(),
            Ok(ConfigKey::MonitorPollIntervalMs)
        );
        assert_eq!(
            "Report.Aircraft_Title".parse::<ConfigKey>(),
            Ok(ConfigKey::ReportAircraftTitle)
        );
        assert!(matches!(
            "monitor.threshold".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>(), Ok(*key));
            assert_eq!(key.to_string(), key.name());
        }
    }

    #[test]
    fn test_set_interval_rejects_zero_and_garbage() {
        let mut config = ConfigFile::default();
        let key = ConfigKey::MonitorPollIntervalMs;

        assert!(key.set(&mut config, "0").is_err());
        assert!(key.set(&mut config, "-5").is_err());
        assert!(key.set(&mut config, "fast").is_err());
        assert_eq!(config.monitor.poll_interval_ms, 5000);

        key.set(&mut config, " 2500 ").unwrap();
        assert_eq!(key.get(&config), "2500");
    }

    #[test]
    fn test_optional_keys_clear_on_empty() {
        let mut config = ConfigFile::default();
        let key = ConfigKey::ReportAircraftTitle;

        key.set(&mut config, "Airbus A320").unwrap();
        assert_eq!(config.report.aircraft_title.as_deref(), Some("Airbus A320"));

        key.set(&mut config, "").unwrap();
        assert_eq!(config.report.aircraft_title, None);
        assert_eq!(key.get(&config), "");
    }

    #[test]
    fn test_required_keys_reject_empty() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::LoggingLevel.set(&mut config, "").is_err());
        assert!(ConfigKey::ReportDirectory.set(&mut config, "  ").is_err());
    }

    #[test]
    fn test_sections_are_grouped() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        assert_eq!(
            sections,
            vec!["monitor", "monitor", "report", "report", "logging", "logging"]
        );
    }
}
