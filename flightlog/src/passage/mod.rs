//! Passage records and the append-only passage log.
//!
//! A passage is either a waypoint overflight or one of the two synthetic
//! boundary events (takeoff, landing) emitted by the phase tracker.

mod log;

pub use log::{AppendRejection, PassageLog};

use chrono::{DateTime, Utc};

use crate::coord::Position;
use crate::telemetry::TelemetrySample;

/// What a passage record marks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PassageKind {
    /// Overflight of a named fix.
    Waypoint(String),
    /// Takeoff from the airport with the given code.
    Takeoff(String),
    /// Landing at the airport with the given code.
    Landing(String),
}

impl PassageKind {
    /// The full label, e.g. `VANES`, `TAKEOFF LGRP`, `LANDING ESSA`.
    pub fn label(&self) -> String {
        match self {
            PassageKind::Waypoint(name) => name.clone(),
            PassageKind::Takeoff(code) => format!("TAKEOFF {}", code),
            PassageKind::Landing(code) => format!("LANDING {}", code),
        }
    }

    /// The fix name or airport code without the event prefix.
    pub fn ident(&self) -> &str {
        match self {
            PassageKind::Waypoint(name) => name,
            PassageKind::Takeoff(code) | PassageKind::Landing(code) => code,
        }
    }

    /// Whether this is a takeoff or landing event.
    pub fn is_boundary(&self) -> bool {
        !matches!(self, PassageKind::Waypoint(_))
    }
}

impl std::fmt::Display for PassageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassageKind::Waypoint(name) => write!(f, "{}", name),
            PassageKind::Takeoff(code) => write!(f, "TAKEOFF {}", code),
            PassageKind::Landing(code) => write!(f, "LANDING {}", code),
        }
    }
}

/// Snapshot of the aircraft state at a passage.
///
/// Created once and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PassageRecord {
    /// When the passage was detected.
    pub timestamp: DateTime<Utc>,
    /// Waypoint, takeoff or landing.
    pub kind: PassageKind,
    /// Aircraft position at detection.
    pub position: Position,
    /// Fuel remaining in kg.
    pub fuel_remaining_kg: f64,
    /// Fuel remaining as a percentage of capacity.
    pub fuel_percent: f64,
    /// Ground speed in knots.
    pub ground_speed_kt: f64,
    /// Altitude in feet.
    pub altitude_ft: f64,
    /// Heading in degrees.
    pub heading_deg: f64,
    /// True airspeed in knots.
    pub true_airspeed_kt: f64,
    /// Mach number.
    pub mach: f64,
    /// Outside air temperature in °C.
    pub oat_c: f64,
    /// Fuel flow in kg/hr.
    pub fuel_flow_kg_hr: f64,
    /// Fuel burned since takeoff in kg.
    pub fuel_burned_kg: f64,
    /// Distance flown since the previous record, nautical miles.
    pub distance_from_previous_nm: f64,
}

impl PassageRecord {
    /// Build a record from a telemetry sample.
    ///
    /// Negative or non-finite distances are stored as zero.
    pub fn from_sample(
        kind: PassageKind,
        sample: &TelemetrySample,
        timestamp: DateTime<Utc>,
        distance_from_previous_nm: f64,
    ) -> Self {
        let distance_from_previous_nm = if distance_from_previous_nm.is_finite() {
            distance_from_previous_nm.max(0.0)
        } else {
            0.0
        };

        Self {
            timestamp,
            kind,
            position: sample.position,
            fuel_remaining_kg: sample.fuel_remaining_kg,
            fuel_percent: sample.fuel_percent(),
            ground_speed_kt: sample.ground_speed_kt,
            altitude_ft: sample.altitude_ft,
            heading_deg: sample.heading_deg,
            true_airspeed_kt: sample.true_airspeed_kt,
            mach: sample.mach,
            oat_c: sample.oat_c,
            fuel_flow_kg_hr: sample.fuel_flow_kg_hr,
            fuel_burned_kg: sample.fuel_burned_kg,
            distance_from_previous_nm,
        }
    }

    /// The record's full label (see [`PassageKind::label`]).
    pub fn name(&self) -> String {
        self.kind.label()
    }
}
