//! Monitoring session state.
//!
//! A [`Session`] owns everything that changes while a flight is monitored:
//! the phase tracker, the fix matcher, the passage log and the loaded flight
//! plan. The monitor loop is its only writer.
//!
//! ```text
//! sample ──► FlightPhaseTracker ──► (TAKEOFF / LANDING) ──┐
//!                   │                                     ├──► PassageLog
//!                   └──────────► GeodesicFixMatcher ──────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::clock::{Clock, SystemClock};
use crate::flight_plan::{airport_codes, FlightPlan, FlightPlanMeta};
use crate::matcher::GeodesicFixMatcher;
use crate::passage::{PassageKind, PassageLog, PassageRecord};
use crate::phase::{FlightPhase, FlightPhaseTracker, PhaseTransition};
use crate::report::{FuelAnalysis, OfpReportGenerator};
use crate::telemetry::TelemetrySample;

/// Aircraft title used until telemetry names the aircraft.
pub const UNKNOWN_AIRCRAFT: &str = "Unknown aircraft";

/// What happened on one processed sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Phase after the sample.
    pub phase: FlightPhase,
    /// Records appended to the log by this sample, in order.
    pub passages: Vec<PassageRecord>,
    /// Whether the aircraft is on its takeoff roll.
    pub in_takeoff_roll: bool,
    /// True on the first sample of the first takeoff roll.
    pub entered_takeoff_roll: bool,
    /// Whether the post-flight taxi stop condition holds.
    pub should_stop: bool,
}

/// State of one monitored flight.
pub struct Session {
    clock: Arc<dyn Clock>,
    tracker: FlightPhaseTracker,
    matcher: GeodesicFixMatcher,
    log: PassageLog,
    meta: Option<FlightPlanMeta>,
    departure_code: String,
    destination_code: String,
    aircraft_title: Option<String>,
    title_override: Option<String>,
    samples_processed: u64,
}

impl Session {
    /// Create a session without a flight plan using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a session without a flight plan.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (departure_code, destination_code) = airport_codes(None);
        Self {
            clock,
            tracker: FlightPhaseTracker::new(),
            matcher: GeodesicFixMatcher::new(),
            log: PassageLog::new(),
            meta: None,
            departure_code,
            destination_code,
            aircraft_title: None,
            title_override: None,
            samples_processed: 0,
        }
    }

    /// Create a session with a flight plan.
    pub fn with_plan(plan: FlightPlan, clock: Arc<dyn Clock>) -> Self {
        let mut session = Self::with_clock(clock);
        session.load_flight_plan(plan);
        session
    }

    /// Load a new flight plan.
    ///
    /// Clears the passage log and matched fixes. Phase state is kept, so a
    /// plan loaded in flight does not emit a second takeoff.
    pub fn load_flight_plan(&mut self, plan: FlightPlan) {
        self.matcher.reset(&mut self.log);
        self.matcher.clear_fixes();
        for fix in plan.fixes {
            self.matcher.add_fix(fix);
        }
        self.set_meta(Some(plan.meta));

        tracing::info!(
            departure = %self.departure_code,
            destination = %self.destination_code,
            fixes = self.matcher.fixes().len(),
            "Flight plan loaded"
        );
    }

    fn set_meta(&mut self, meta: Option<FlightPlanMeta>) {
        let (departure_code, destination_code) = airport_codes(meta.as_ref());
        self.departure_code = departure_code;
        self.destination_code = destination_code;
        self.meta = meta;
    }

    /// Override the aircraft title shown in the report.
    pub fn set_aircraft_title(&mut self, title: impl Into<String>) {
        self.title_override = Some(title.into());
    }

    /// Process the next telemetry sample.
    pub fn process(&mut self, sample: &TelemetrySample) -> SampleOutcome {
        let now = self.clock.now();
        self.samples_processed += 1;

        let aircraft = sample.aircraft.trim();
        if !aircraft.is_empty() && self.aircraft_title.as_deref() != Some(aircraft) {
            self.aircraft_title = Some(aircraft.to_string());
        }

        let update = self.tracker.update(sample);
        let mut passages = Vec::new();

        match update.transition {
            Some(PhaseTransition::Takeoff) => {
                let kind = PassageKind::Takeoff(self.departure_code.clone());
                let record = PassageRecord::from_sample(kind, sample, now, 0.0);
                self.append_boundary(record, &mut passages);
            }
            Some(PhaseTransition::Landing { distance_nm }) => {
                let kind = PassageKind::Landing(self.destination_code.clone());
                let record = PassageRecord::from_sample(kind, sample, now, distance_nm.round());
                self.append_boundary(record, &mut passages);
            }
            None => {}
        }

        // Fixes are only matched between the takeoff and landing records; a
        // sample at exactly the airborne threshold is still on the ground
        if self.tracker.has_been_airborne()
            && !self.tracker.landing_recorded()
            && self.matcher.check_position(
                sample,
                self.tracker.has_been_airborne(),
                self.tracker.distance_since_last_record_nm(),
                now,
                &mut self.log,
            )
        {
            self.tracker.record_emitted();
            passages.extend(self.log.last().cloned());
        }

        tracing::trace!(
            phase = %update.phase,
            ground_speed_kt = sample.ground_speed_kt,
            position = %sample.position,
            passages = passages.len(),
            "Sample processed"
        );

        SampleOutcome {
            phase: update.phase,
            passages,
            in_takeoff_roll: self.tracker.in_takeoff_roll(),
            entered_takeoff_roll: update.entered_takeoff_roll,
            should_stop: self.tracker.should_stop_monitoring(),
        }
    }

    fn append_boundary(&mut self, record: PassageRecord, passages: &mut Vec<PassageRecord>) {
        match self.log.append(record.clone()) {
            Ok(()) => passages.push(record),
            Err(reason) => {
                tracing::debug!(event = %record.kind, %reason, "Boundary record not logged")
            }
        }
    }

    /// The passage log.
    pub fn log(&self) -> &PassageLog {
        &self.log
    }

    /// Current flight phase.
    pub fn phase(&self) -> FlightPhase {
        self.tracker.phase()
    }

    /// Whether the last sample was on the takeoff roll.
    pub fn in_takeoff_roll(&self) -> bool {
        self.tracker.in_takeoff_roll()
    }

    /// Whether the post-flight taxi stop condition holds.
    pub fn should_stop_monitoring(&self) -> bool {
        self.tracker.should_stop_monitoring()
    }

    /// Flight plan metadata, if a plan is loaded.
    pub fn meta(&self) -> Option<&FlightPlanMeta> {
        self.meta.as_ref()
    }

    /// Departure code used for the takeoff record.
    pub fn departure_code(&self) -> &str {
        &self.departure_code
    }

    /// Destination code used for the landing record.
    pub fn destination_code(&self) -> &str {
        &self.destination_code
    }

    /// The fix matcher.
    pub fn matcher(&self) -> &GeodesicFixMatcher {
        &self.matcher
    }

    /// Number of samples processed so far.
    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    /// Aircraft title for the report.
    pub fn aircraft_title(&self) -> &str {
        self.title_override
            .as_deref()
            .or(self.aircraft_title.as_deref())
            .unwrap_or(UNKNOWN_AIRCRAFT)
    }

    /// Current time from the session clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Report generator bound to this session's plan and aircraft.
    pub fn report_generator(&self) -> OfpReportGenerator<'_> {
        OfpReportGenerator::new(self.meta.as_ref(), self.aircraft_title())
    }

    /// Render the OFP report for the current log.
    pub fn render_report(&self) -> String {
        self.report_generator().render(&self.log, self.clock.now())
    }

    /// Fuel analysis over the reported records.
    pub fn fuel_analysis(&self) -> FuelAnalysis {
        self.report_generator().fuel_analysis(&self.log)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.tracker.phase())
            .field("departure", &self.departure_code)
            .field("destination", &self.destination_code)
            .field("passages", &self.log.len())
            .field("samples_processed", &self.samples_processed)
            .finish()
    }
}
