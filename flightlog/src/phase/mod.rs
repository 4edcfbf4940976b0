//! Flight phase tracking.
//!
//! Classifies each telemetry sample into a flight phase and reports the two
//! boundary events (takeoff, landing) exactly once per flight.
//!
//! # Detection Logic
//!
//! ```text
//! Airborne:     GS > 45kt
//! TakeoffRoll:  GS > 40kt AND not airborne AND never airborne
//! Takeoff:      first not-airborne → airborne transition
//! Landing:      airborne → not-airborne transition after takeoff
//! ```
//!
//! Ground speed is the only input. The thresholds are fixed: ground speed
//! alone separates taxi from flight for the fixed-wing traffic this targets.

use crate::coord::Position;
use crate::telemetry::TelemetrySample;

/// Ground speed above which the aircraft counts as airborne (knots).
pub const AIRBORNE_THRESHOLD_KT: f64 = 45.0;

/// Ground speed above which a not-yet-airborne aircraft is on its takeoff roll (knots).
pub const TAKEOFF_ROLL_THRESHOLD_KT: f64 = 40.0;

/// Flight phase.
///
/// Traversed forward exactly once per monitored flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FlightPhase {
    /// Parked or taxiing before departure.
    #[default]
    PreflightTaxi,

    /// Accelerating on the runway, not yet above the airborne threshold.
    TakeoffRoll,

    /// Between takeoff and landing.
    Airborne,

    /// Landed; taxiing to the gate. Terminal.
    PostflightTaxi,
}

impl FlightPhase {
    /// Get a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            FlightPhase::PreflightTaxi => "pre-flight taxi",
            FlightPhase::TakeoffRoll => "takeoff roll",
            FlightPhase::Airborne => "airborne",
            FlightPhase::PostflightTaxi => "post-flight taxi",
        }
    }
}

impl std::fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightPhase::PreflightTaxi => write!(f, "preflight_taxi"),
            FlightPhase::TakeoffRoll => write!(f, "takeoff_roll"),
            FlightPhase::Airborne => write!(f, "airborne"),
            FlightPhase::PostflightTaxi => write!(f, "postflight_taxi"),
        }
    }
}

/// Boundary event detected on a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseTransition {
    /// First climb through the airborne threshold.
    Takeoff,
    /// First descent through the airborne threshold after takeoff.
    ///
    /// Carries the distance flown since the previous record.
    Landing { distance_nm: f64 },
}

/// Result of feeding one sample to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseUpdate {
    /// Phase after this sample.
    pub phase: FlightPhase,
    /// Boundary event on this sample, if any.
    pub transition: Option<PhaseTransition>,
    /// True on the first sample of the first takeoff roll.
    ///
    /// Callers reset anything scoped to the takeoff roll (speed callouts etc.).
    pub entered_takeoff_roll: bool,
}

/// Tracks flight phase across a stream of samples.
#[derive(Debug, Default)]
pub struct FlightPhaseTracker {
    has_been_airborne: bool,
    is_currently_airborne: bool,
    in_takeoff_roll: bool,
    takeoff_roll_seen: bool,
    takeoff_recorded: bool,
    landing_recorded: bool,
    distance_since_last_record_nm: f64,
    previous_position: Option<Position>,
    last_ground_speed_kt: Option<f64>,
}

impl FlightPhaseTracker {
    /// Create a tracker in the pre-flight taxi phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the tracker with the next sample.
    pub fn update(&mut self, sample: &TelemetrySample) -> PhaseUpdate {
        let ground_speed = sample.ground_speed_kt;
        let airborne = ground_speed > AIRBORNE_THRESHOLD_KT;

        let takeoff_roll =
            !airborne && !self.has_been_airborne && ground_speed > TAKEOFF_ROLL_THRESHOLD_KT;
        let entered_takeoff_roll = takeoff_roll && !self.takeoff_roll_seen;
        if entered_takeoff_roll {
            self.takeoff_roll_seen = true;
            tracing::info!(ground_speed_kt = ground_speed, "Takeoff roll started");
        }
        self.in_takeoff_roll = takeoff_roll;

        let mut transition = None;

        if airborne && !self.is_currently_airborne && !self.takeoff_recorded {
            self.has_been_airborne = true;
            self.takeoff_recorded = true;
            self.distance_since_last_record_nm = 0.0;
            // Distance starts counting at the takeoff point
            self.previous_position = Some(sample.position);
            transition = Some(PhaseTransition::Takeoff);

            tracing::info!(
                ground_speed_kt = ground_speed,
                position = %sample.position,
                "Takeoff detected"
            );
        }

        if !airborne
            && self.is_currently_airborne
            && self.has_been_airborne
            && !self.landing_recorded
        {
            self.landing_recorded = true;
            let distance_nm = self.distance_since_last_record_nm;
            self.distance_since_last_record_nm = 0.0;
            transition = Some(PhaseTransition::Landing { distance_nm });

            tracing::info!(
                ground_speed_kt = ground_speed,
                position = %sample.position,
                "Landing detected"
            );
        }

        if airborne {
            if let Some(previous) = self.previous_position {
                self.distance_since_last_record_nm += previous.distance_nm(&sample.position);
            }
        }
        self.previous_position = Some(sample.position);
        self.is_currently_airborne = airborne;
        self.last_ground_speed_kt = Some(ground_speed);

        PhaseUpdate {
            phase: self.phase(),
            transition,
            entered_takeoff_roll,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> FlightPhase {
        if self.landing_recorded {
            FlightPhase::PostflightTaxi
        } else if self.has_been_airborne {
            FlightPhase::Airborne
        } else if self.in_takeoff_roll {
            FlightPhase::TakeoffRoll
        } else {
            FlightPhase::PreflightTaxi
        }
    }

    /// Whether the aircraft has been airborne at any point.
    pub fn has_been_airborne(&self) -> bool {
        self.has_been_airborne
    }

    /// Whether the last sample was above the airborne threshold.
    pub fn is_currently_airborne(&self) -> bool {
        self.is_currently_airborne
    }

    /// Whether the last sample was on the takeoff roll.
    pub fn in_takeoff_roll(&self) -> bool {
        self.in_takeoff_roll
    }

    /// Whether the landing event has been emitted.
    pub fn landing_recorded(&self) -> bool {
        self.landing_recorded
    }

    /// Distance flown since the last passage record (NM).
    pub fn distance_since_last_record_nm(&self) -> f64 {
        self.distance_since_last_record_nm
    }

    /// Restart distance accounting after a passage was recorded.
    pub fn record_emitted(&mut self) {
        self.distance_since_last_record_nm = 0.0;
    }

    /// Whether monitoring should stop: airborne once, now below the threshold.
    ///
    /// Level-triggered on the latest sample; re-evaluated on every call.
    pub fn should_stop_monitoring(&self) -> bool {
        self.has_been_airborne
            && self
                .last_ground_speed_kt
                .is_some_and(|gs| gs < AIRBORNE_THRESHOLD_KT)
    }
}
