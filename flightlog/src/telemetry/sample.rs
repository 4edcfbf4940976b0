//! Telemetry sample type.

use serde::{Deserialize, Serialize};

use crate::coord::Position;

/// One telemetry snapshot from the simulator.
///
/// Values the simulator could not supply arrive as `NaN` or zero; they are
/// carried through unchanged and only sanitized when rendered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySample {
    /// Aircraft position.
    #[serde(flatten)]
    pub position: Position,
    /// Ground speed in knots.
    pub ground_speed_kt: f64,
    /// True airspeed in knots.
    pub true_airspeed_kt: f64,
    /// Mach number.
    pub mach: f64,
    /// Altitude in feet.
    pub altitude_ft: f64,
    /// Heading in degrees.
    pub heading_deg: f64,
    /// Outside air temperature in °C.
    pub oat_c: f64,
    /// Fuel remaining in kg.
    pub fuel_remaining_kg: f64,
    /// Total fuel capacity in kg.
    pub fuel_capacity_kg: f64,
    /// Fuel flow in kg/hr.
    pub fuel_flow_kg_hr: f64,
    /// Fuel burned since takeoff in kg.
    pub fuel_burned_kg: f64,
    /// Free-text aircraft identifier (title of the loaded aircraft).
    pub aircraft: String,
}

impl TelemetrySample {
    /// Create a sample at a position and ground speed, everything else zero.
    pub fn at(latitude: f64, longitude: f64, ground_speed_kt: f64) -> Self {
        Self {
            position: Position::new(latitude, longitude),
            ground_speed_kt,
            ..Default::default()
        }
    }

    /// Fuel remaining as a percentage of capacity, 0 when capacity is unknown.
    pub fn fuel_percent(&self) -> f64 {
        if self.fuel_capacity_kg > 0.0 {
            self.fuel_remaining_kg / self.fuel_capacity_kg * 100.0
        } else {
            0.0
        }
    }
}

/// Replaces non-finite values with zero.
#[inline]
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
