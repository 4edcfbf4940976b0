//! Flight plan data: the fixes to watch and the airports at either end.
//!
//! Plans are supplied by an external provider. This module defines the
//! in-memory model plus a small native JSON format:
//!
//! ```json
//! {
//!   "departure":   { "code": "LGRP", "name": "RHODES DIAGORAS" },
//!   "destination": { "code": "ESSA", "name": "STOCKHOLM ARLANDA" },
//!   "cruise_altitude_ft": 37000,
//!   "fixes": [
//!     { "name": "VANES", "latitude": 36.385, "longitude": 27.731, "tolerance_nm": 1.0 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::Position;

/// Default radius within which a fix counts as passed.
pub const DEFAULT_TOLERANCE_NM: f64 = 0.5;

/// Airport code used when no flight plan metadata is available.
pub const UNKNOWN_AIRPORT: &str = "UNKNOWN";

/// Errors raised while loading a flight plan.
#[derive(Debug, Error)]
pub enum FlightPlanError {
    /// Plan file could not be read.
    #[error("Failed to read flight plan: {0}")]
    Io(#[from] std::io::Error),

    /// Plan JSON is malformed.
    #[error("Failed to parse flight plan: {0}")]
    Parse(#[from] serde_json::Error),

    /// A fix has an empty name.
    #[error("Fix #{index} has an empty name")]
    EmptyFixName { index: usize },

    /// A fix has a zero, negative or non-finite tolerance.
    #[error("Fix {name} has invalid tolerance {tolerance_nm} NM")]
    InvalidTolerance { name: String, tolerance_nm: f64 },
}

/// A named waypoint to watch for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedFix {
    /// Fix identifier (case-sensitive).
    pub name: String,
    /// Fix position.
    #[serde(flatten)]
    pub position: Position,
    /// Match radius in nautical miles.
    #[serde(default = "default_tolerance")]
    pub tolerance_nm: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_NM
}

impl NamedFix {
    /// Create a fix with the default tolerance.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            position: Position::new(latitude, longitude),
            tolerance_nm: DEFAULT_TOLERANCE_NM,
        }
    }

    /// Set the match radius.
    pub fn with_tolerance(mut self, tolerance_nm: f64) -> Self {
        self.tolerance_nm = tolerance_nm;
        self
    }
}

/// An airport at one end of the flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportInfo {
    /// ICAO-like code.
    pub code: String,
    /// Full display name.
    #[serde(default)]
    pub name: String,
}

impl AirportInfo {
    /// Create an airport entry.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Display name, falling back to the code when no name is known.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// Departure/destination metadata of a flight plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanMeta {
    /// Departure airport.
    pub departure: AirportInfo,
    /// Destination airport.
    pub destination: AirportInfo,
    /// Planned cruising altitude in feet.
    #[serde(default)]
    pub cruise_altitude_ft: Option<u32>,
}

impl FlightPlanMeta {
    /// Create metadata for a departure/destination pair.
    pub fn new(departure: AirportInfo, destination: AirportInfo) -> Self {
        Self {
            departure,
            destination,
            cruise_altitude_ft: None,
        }
    }

    /// Full name for an airport code, if it is one of this plan's airports.
    pub fn airport_name(&self, code: &str) -> Option<&str> {
        if self.departure.code == code {
            Some(self.departure.display_name())
        } else if self.destination.code == code {
            Some(self.destination.display_name())
        } else {
            None
        }
    }
}

/// Departure and destination codes, `UNKNOWN` when metadata is absent.
pub fn airport_codes(meta: Option<&FlightPlanMeta>) -> (String, String) {
    match meta {
        Some(meta) => (
            code_or_unknown(&meta.departure.code),
            code_or_unknown(&meta.destination.code),
        ),
        None => (UNKNOWN_AIRPORT.to_string(), UNKNOWN_AIRPORT.to_string()),
    }
}

fn code_or_unknown(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        UNKNOWN_AIRPORT.to_string()
    } else {
        code.to_string()
    }
}

/// A loaded flight plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    /// Airport metadata.
    #[serde(flatten)]
    pub meta: FlightPlanMeta,
    /// Fixes in route order.
    #[serde(default)]
    pub fixes: Vec<NamedFix>,
}

impl FlightPlan {
    /// Parse a plan from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, FlightPlanError> {
        let plan: FlightPlan = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FlightPlanError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<(), FlightPlanError> {
        for (index, fix) in self.fixes.iter().enumerate() {
            if fix.name.trim().is_empty() {
                return Err(FlightPlanError::EmptyFixName { index });
            }
            if !fix.tolerance_nm.is_finite() || fix.tolerance_nm <= 0.0 {
                return Err(FlightPlanError::InvalidTolerance {
                    name: fix.name.clone(),
                    tolerance_nm: fix.tolerance_nm,
                });
            }
        }
        Ok(())
    }
}
