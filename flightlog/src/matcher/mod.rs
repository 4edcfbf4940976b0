//! Waypoint overflight detection.
//!
//! Each sample is checked against the watched fixes in route order. The
//! first unmatched fix whose great-circle distance is within its tolerance is
//! the match, so overlapping fixes resolve by list order rather than by
//! proximity. A fix is matched at most once.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::flight_plan::NamedFix;
use crate::passage::{PassageKind, PassageLog, PassageRecord};
use crate::phase::AIRBORNE_THRESHOLD_KT;
use crate::telemetry::TelemetrySample;

/// Matches telemetry positions against an ordered list of fixes.
#[derive(Debug, Default)]
pub struct GeodesicFixMatcher {
    fixes: Vec<NamedFix>,
    matched: HashSet<String>,
}

impl GeodesicFixMatcher {
    /// Create a matcher with no fixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a matcher watching `fixes` in order.
    pub fn with_fixes(fixes: impl IntoIterator<Item = NamedFix>) -> Self {
        let mut matcher = Self::new();
        for fix in fixes {
            matcher.add_fix(fix);
        }
        matcher
    }

    /// Append a fix to the watch list.
    ///
    /// Duplicate names are accepted here; only the first can ever match.
    pub fn add_fix(&mut self, fix: NamedFix) {
        self.fixes.push(fix);
    }

    /// Watched fixes in insertion order.
    pub fn fixes(&self) -> &[NamedFix] {
        &self.fixes
    }

    /// Whether the named fix has been matched.
    pub fn is_matched(&self, name: &str) -> bool {
        self.matched.contains(name)
    }

    /// Fixes not yet matched, in order.
    pub fn remaining(&self) -> impl Iterator<Item = &NamedFix> {
        self.fixes
            .iter()
            .filter(move |fix| !self.matched.contains(&fix.name))
    }

    /// Clear the matched set and the passage log.
    ///
    /// The fix list is kept; use [`GeodesicFixMatcher::clear_fixes`] to drop it.
    pub fn reset(&mut self, log: &mut PassageLog) {
        self.matched.clear();
        log.clear();
    }

    /// Remove all fixes and matches.
    pub fn clear_fixes(&mut self) {
        self.fixes.clear();
        self.matched.clear();
    }

    /// Check a sample for a fix passage.
    ///
    /// On a match a [`PassageRecord`] is appended to `log` with the rounded
    /// `distance_since_last_nm`, and `true` is returned. At most one fix is
    /// matched per call. A fix only counts as matched once its record is in
    /// the log.
    pub fn check_position(
        &mut self,
        sample: &TelemetrySample,
        has_been_airborne: bool,
        distance_since_last_nm: f64,
        timestamp: DateTime<Utc>,
        log: &mut PassageLog,
    ) -> bool {
        // Pre-flight taxi is never matched
        if sample.ground_speed_kt < AIRBORNE_THRESHOLD_KT && !has_been_airborne {
            return false;
        }

        let Some(index) = self.find_match(sample) else {
            return false;
        };
        let fix = &self.fixes[index];

        let record = PassageRecord::from_sample(
            PassageKind::Waypoint(fix.name.clone()),
            sample,
            timestamp,
            distance_since_last_nm.round(),
        );
        let name = fix.name.clone();

        // A rejected append leaves the fix open for a later sample
        match log.append(record) {
            Ok(()) => {
                self.matched.insert(name.clone());
                tracing::info!(
                    fix = %name,
                    distance_nm = distance_since_last_nm.round(),
                    ground_speed_kt = sample.ground_speed_kt,
                    altitude_ft = sample.altitude_ft,
                    "Fix passed"
                );
                true
            }
            Err(reason) => {
                tracing::debug!(fix = %name, %reason, "Fix passage not logged");
                false
            }
        }
    }

    /// Index of the first unmatched fix within tolerance of the sample.
    fn find_match(&self, sample: &TelemetrySample) -> Option<usize> {
        self.fixes.iter().position(|fix| {
            !self.matched.contains(&fix.name)
                && fix.position.distance_nm(&sample.position) <= fix.tolerance_nm
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    fn fixes() -> Vec<NamedFix> {
        vec![
            NamedFix::new("VANES", 36.385, 27.731).with_tolerance(1.0),
            NamedFix::new("ETERU", 36.468, 27.060).with_tolerance(1.0),
        ]
    }

    #[test]
    fn test_speed_gate_blocks_preflight_taxi() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();

        let sample = TelemetrySample::at(36.385, 27.731, 30.0);
        assert!(!matcher.check_position(&sample, false, 0.0, t0(), &mut log));
        assert!(log.is_empty());
        assert!(!matcher.is_matched("VANES"));
    }

    #[test]
    fn test_slow_after_airborne_still_matches() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();

        let sample = TelemetrySample::at(36.385, 27.731, 30.0);
        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
    }

    #[test]
    fn test_match_records_rounded_distance() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();
        log.append(PassageRecord::from_sample(
            PassageKind::Takeoff("LGRP".into()),
            &TelemetrySample::at(36.4, 28.08, 150.0),
            t0(),
            0.0,
        ))
        .unwrap();

        let sample = TelemetrySample::at(36.386, 27.732, 460.0);
        assert!(matcher.check_position(&sample, true, 16.7, t0(), &mut log));

        let record = &log.records()[1];
        assert_eq!(record.kind, PassageKind::Waypoint("VANES".into()));
        assert_eq!(record.distance_from_previous_nm, 17.0);
        assert!(matcher.is_matched("VANES"));
    }

    #[test]
    fn test_no_match_outside_tolerance() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();

        // ~3 NM north of VANES
        let sample = TelemetrySample::at(36.435, 27.731, 460.0);
        assert!(!matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn test_each_fix_matched_once() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();
        let sample = TelemetrySample::at(36.385, 27.731, 460.0);

        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert!(!matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_tie_break_by_insertion_order() {
        // Both fixes contain the sample; the closer one was inserted second
        let mut matcher = GeodesicFixMatcher::with_fixes(vec![
            NamedFix::new("FAR", 36.400, 27.731).with_tolerance(2.0),
            NamedFix::new("NEAR", 36.385, 27.731).with_tolerance(2.0),
        ]);
        let mut log = PassageLog::new();
        let sample = TelemetrySample::at(36.385, 27.731, 460.0);

        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert_eq!(log.records()[0].kind, PassageKind::Waypoint("FAR".into()));

        // The second fix matches on the next sample
        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert_eq!(log.records()[1].kind, PassageKind::Waypoint("NEAR".into()));
    }

    #[test]
    fn test_duplicate_fix_names_match_once() {
        let mut matcher = GeodesicFixMatcher::with_fixes(vec![
            NamedFix::new("VANES", 36.385, 27.731),
            NamedFix::new("VANES", 36.385, 27.731),
        ]);
        let mut log = PassageLog::new();
        let sample = TelemetrySample::at(36.385, 27.731, 460.0);

        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert!(!matcher.check_position(&sample, true, 0.0, t0(), &mut log));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_rejected_append_keeps_fix_open() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();
        log.append(PassageRecord::from_sample(
            PassageKind::Takeoff("LGRP".into()),
            &TelemetrySample::at(36.4, 28.08, 150.0),
            t0(),
            0.0,
        ))
        .unwrap();

        // Wall clock stepped back: the log refuses the record
        let sample = TelemetrySample::at(36.385, 27.731, 460.0);
        let earlier = t0() - chrono::Duration::seconds(30);
        assert!(!matcher.check_position(&sample, true, 0.0, earlier, &mut log));
        assert!(!matcher.is_matched("VANES"));
        assert_eq!(log.len(), 1);

        let later = t0() + chrono::Duration::seconds(5);
        assert!(matcher.check_position(&sample, true, 0.0, later, &mut log));
        assert!(matcher.is_matched("VANES"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_reset_clears_matches_and_log() {
        let mut matcher = GeodesicFixMatcher::with_fixes(fixes());
        let mut log = PassageLog::new();
        let sample = TelemetrySample::at(36.385, 27.731, 460.0);
        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));

        matcher.reset(&mut log);
        assert!(log.is_empty());
        assert!(!matcher.is_matched("VANES"));
        assert_eq!(matcher.remaining().count(), 2);
        assert!(matcher.check_position(&sample, true, 0.0, t0(), &mut log));
    }
}
