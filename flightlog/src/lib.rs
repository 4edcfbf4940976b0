//! FlightLog - automatic flight logging and OFP reports for flight simulators
//!
//! Watches a stream of aircraft telemetry, detects takeoff and landing,
//! records the moment each flight-plan fix is passed, and produces a
//! fixed-width Operational Flight Plan (OFP) style report when the flight ends.
//!
//! # Architecture
//!
//! ```text
//! TelemetrySource ──► Monitor ──► Session ──► PassageLog ──► OfpReportGenerator
//!                                  │   │
//!                FlightPhaseTracker   GeodesicFixMatcher
//! ```
//!
//! The [`session::Session`] owns all mutable flight state; the
//! [`monitor::Monitor`] polls telemetry, drives the session and writes the
//! report exactly once on exit.

pub mod clock;
pub mod config;
pub mod coord;
pub mod flight_plan;
pub mod logging;
pub mod matcher;
pub mod monitor;
pub mod passage;
pub mod phase;
pub mod report;
pub mod session;
pub mod telemetry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
