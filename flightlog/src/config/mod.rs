//! Configuration file handling.
//!
//! Settings live in an INI file at `~/.config/flightlog/config.ini` (or the
//! platform equivalent). Missing keys fall back to defaults, so an absent or
//! partial file is always usable.
//!
//! ```ini
//! [monitor]
//! poll_interval_ms = 5000
//! takeoff_roll_interval_ms = 200
//!
//! [report]
//! directory = /home/pilot/Documents/flightlog
//! aircraft_title = Boeing 737-800
//!
//! [logging]
//! level = info
//! file = /home/pilot/.local/state/flightlog/flightlog.log
//! ```

mod keys;

pub use keys::{ConfigKey, ConfigKeyError};

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::monitor::{MonitorConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TAKEOFF_ROLL_INTERVAL};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed.
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// The file could not be written.
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value in the file is not valid for its key.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// `[monitor]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Normal polling interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Polling interval during the takeoff roll in milliseconds.
    pub takeoff_roll_interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            takeoff_roll_interval_ms: DEFAULT_TAKEOFF_ROLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl MonitorSettings {
    /// Polling cadence for the monitor loop.
    pub fn to_monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            takeoff_roll_interval: Duration::from_millis(self.takeoff_roll_interval_ms),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Directory reports are written to.
    pub directory: PathBuf,
    /// Aircraft title overriding the one reported by telemetry.
    pub aircraft_title: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            directory: default_report_dir(),
            aircraft_title: None,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `flightlog=debug`).
    pub level: String,
    /// Log file; stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub monitor: MonitorSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location, or defaults when the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific path, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Build from parsed INI contents.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)
                    .map_err(|e| ConfigError::InvalidValue {
                        key: key.name(),
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(config)
    }

    /// Convert to INI contents. Unset optional values are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        self.to_ini().write_to_file(path).map_err(write_error)
    }
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flightlog")
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// Default report directory: `~/Documents/flightlog`.
pub fn default_report_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flightlog")
}
