//! Property tests over arbitrary telemetry streams.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use flightlog::clock::ManualClock;
use flightlog::coord::haversine_nm;
use flightlog::flight_plan::{AirportInfo, FlightPlan, FlightPlanMeta, NamedFix};
use flightlog::passage::PassageKind;
use flightlog::session::Session;
use flightlog::telemetry::TelemetrySample;
use proptest::prelude::*;

fn plan() -> FlightPlan {
    FlightPlan {
        meta: FlightPlanMeta::new(
            AirportInfo::new("LGRP", "RHODES DIAGORAS"),
            AirportInfo::new("ESSA", "STOCKHOLM ARLANDA"),
        ),
        fixes: vec![
            NamedFix::new("VANES", 36.385, 27.731).with_tolerance(1.0),
            NamedFix::new("ETERU", 36.468, 27.060).with_tolerance(1.0),
            NamedFix::new("RDS", 36.40, 28.10).with_tolerance(2.0),
            // Same name as the destination: recorded but dropped from the report
            NamedFix::new("ESSA", 36.50, 27.50).with_tolerance(0.5),
        ],
    }
}

/// Positions around the fixes, speeds across all phases.
fn samples() -> impl Strategy<Value = Vec<(f64, f64, f64, i64)>> {
    prop::collection::vec(
        (36.3f64..36.6, 26.9f64..28.2, 0.0f64..500.0, 0i64..600),
        1..60,
    )
}

fn run(samples: &[(f64, f64, f64, i64)]) -> Session {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
    ));
    let mut session = Session::with_plan(plan(), clock.clone());
    for &(lat, lon, gs, step) in samples {
        clock.advance(Duration::seconds(step));
        session.process(&TelemetrySample::at(lat, lon, gs));
    }
    session
}

proptest! {
    #[test]
    fn prop_passage_names_are_unique(samples in samples()) {
        let session = run(&samples);
        let mut names = HashSet::new();
        for record in session.log() {
            prop_assert!(names.insert(record.name()), "duplicate {}", record.name());
        }
    }

    #[test]
    fn prop_log_is_chronological_and_distances_non_negative(samples in samples()) {
        let session = run(&samples);
        let records = session.log().records();
        for pair in records.windows(2) {
            prop_assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        for record in records {
            prop_assert!(record.distance_from_previous_nm >= 0.0);
        }
        if let Some(first) = records.first() {
            prop_assert_eq!(first.distance_from_previous_nm, 0.0);
        }
    }

    #[test]
    fn prop_boundary_records_at_ends(samples in samples()) {
        let session = run(&samples);
        let records = session.log().records();

        let takeoffs = records.iter().filter(|r| matches!(r.kind, PassageKind::Takeoff(_))).count();
        let landings = records.iter().filter(|r| matches!(r.kind, PassageKind::Landing(_))).count();
        prop_assert!(takeoffs <= 1);
        prop_assert!(landings <= 1);

        if takeoffs == 1 {
            prop_assert!(matches!(records[0].kind, PassageKind::Takeoff(_)));
        }
        if landings == 1 {
            prop_assert!(matches!(records[records.len() - 1].kind, PassageKind::Landing(_)));
            prop_assert_eq!(takeoffs, 1);
        }
    }

    #[test]
    fn prop_no_fix_matched_below_airborne_speed_on_ground(
        samples in prop::collection::vec((36.3f64..36.6, 26.9f64..28.2, 0.0f64..45.0), 1..40)
    ) {
        let samples: Vec<_> = samples.into_iter().map(|(lat, lon, gs)| (lat, lon, gs, 5)).collect();
        let session = run(&samples);
        prop_assert!(session.log().is_empty());
    }

    #[test]
    fn prop_report_always_renders(samples in samples()) {
        let session = run(&samples);
        let report = session.render_report();
        prop_assert!(report.starts_with("19OCT2026 "));
        prop_assert!(report.ends_with('\n'));
    }

    #[test]
    fn prop_haversine_is_symmetric(
        lat1 in -89.0f64..89.0, lon1 in -180.0f64..180.0,
        lat2 in -89.0f64..89.0, lon2 in -180.0f64..180.0,
    ) {
        let there = haversine_nm(lat1, lon1, lat2, lon2);
        let back = haversine_nm(lat2, lon2, lat1, lon1);
        prop_assert!(there >= 0.0);
        prop_assert!((there - back).abs() < 1e-6);
        prop_assert!(there <= std::f64::consts::PI * 3440.065 + 1e-6);
    }
}
