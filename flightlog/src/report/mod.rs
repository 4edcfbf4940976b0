//! OFP-style flight report.
//!
//! Renders a finished [`PassageLog`] into the fixed-width text layout of an
//! operational flight plan log page:
//!
//! ```text
//! 19OCT2026 LGRP-ESSA
//! OFP 1 RHODES DIAGORAS-STOCKHOLM ARLANDA
//! Generated: 2026-10-19 1530Z
//! Aircraft: Boeing 737-800
//!
//!                                 FL   MN OAT AFOB
//! POSITION             LAT   ET  DIS  TAS
//! IDENT               LONG  ATO RDIS   GS     ABRN
//!                                000 0.00  18  9.8
//! RHODES DIAGORAS N 36 24.3 0000    0  152
//! LGRP           E 028 05.2 1130 1412  150      0.0
//!
//!                                350 0.78 -54  9.1
//! VANES          N 36 23.1 0019   17  452
//! VANES          E 027 43.9 1149 1412  461      0.7
//!
//! ...
//! ```
//!
//! The column widths, header literals and field formats are a fixed
//! contract with downstream readers of the report.

mod fuel;
mod sink;
mod table;

pub use fuel::{FuelAnalysis, LegFuel, FUEL_SECTION_HEADER};
pub use sink::{report_filename, write_report, write_report_file, ReportError};
pub use table::{format_row, COLUMN_WIDTHS, HEADER_ROWS};

use chrono::{DateTime, Utc};

use crate::coord::{format_latitude, format_longitude};
use crate::flight_plan::{FlightPlanMeta, UNKNOWN_AIRPORT};
use crate::passage::{PassageKind, PassageLog, PassageRecord};
use crate::telemetry::sanitize;

/// Body line emitted when no fixes remain after de-duplication.
pub const NO_FIXES_LINE: &str = "No GPS fixes were passed during this flight.";

/// Renders passage logs as OFP text.
#[derive(Debug, Clone, Copy)]
pub struct OfpReportGenerator<'a> {
    meta: Option<&'a FlightPlanMeta>,
    aircraft_title: &'a str,
}

impl<'a> OfpReportGenerator<'a> {
    /// Create a generator for a flight.
    ///
    /// # Arguments
    ///
    /// * `meta` - Flight plan metadata, used for airport full names
    /// * `aircraft_title` - Aircraft shown in the header
    pub fn new(meta: Option<&'a FlightPlanMeta>, aircraft_title: &'a str) -> Self {
        Self {
            meta,
            aircraft_title,
        }
    }

    /// Render the report for a log.
    pub fn render(&self, log: &PassageLog, generated_at: DateTime<Utc>) -> String {
        self.render_records(log.records(), generated_at)
    }

    /// Render the report for an ordered slice of records.
    pub fn render_records(&self, records: &[PassageRecord], generated_at: DateTime<Utc>) -> String {
        let route = RouteSummary::from_records(records);
        let departure_name = self.airport_name(&route.departure_code);
        let destination_name = self.airport_name(&route.destination_code);
        let records = route.dedupe(records);

        let mut lines = vec![
            format!(
                "{} {}-{}",
                generated_at.format("%d%b%Y").to_string().to_uppercase(),
                route.departure_code,
                route.destination_code
            ),
            format!("OFP 1 {}-{}", departure_name, destination_name),
            format!("Generated: {}Z", generated_at.format("%Y-%m-%d %H%M")),
            format!("Aircraft: {}", self.aircraft_title),
            String::new(),
        ];

        if records.is_empty() {
            lines.push(NO_FIXES_LINE.to_string());
        } else {
            self.push_table(&mut lines, &records);
            if records.len() >= 2 {
                lines.push(FUEL_SECTION_HEADER.to_string());
                let analysis = FuelAnalysis::from_records(records.iter().copied());
                lines.extend(analysis.legs.iter().map(LegFuel::to_line));
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Fuel analysis over the records that would appear in the report.
    pub fn fuel_analysis(&self, log: &PassageLog) -> FuelAnalysis {
        let route = RouteSummary::from_records(log.records());
        FuelAnalysis::from_records(route.dedupe(log.records()))
    }

    fn push_table(&self, lines: &mut Vec<String>, records: &[&PassageRecord]) {
        lines.extend(HEADER_ROWS.iter().map(format_row));

        let first = records[0];
        let mut remaining_nm: f64 = records
            .iter()
            .map(|record| record.distance_from_previous_nm)
            .sum();

        for record in records {
            let elapsed = record.timestamp - first.timestamp;
            let burned_kg = (first.fuel_remaining_kg - record.fuel_remaining_kg).max(0.0);

            lines.push(format_row(&[
                String::new(),
                String::new(),
                String::new(),
                format!("{:03}", (record.altitude_ft / 100.0).round() as i64),
                format!("{:.2}", sanitize(record.mach)),
                format!("{:.0}", sanitize(record.oat_c)),
                format!("{:.1}", record.fuel_remaining_kg / 1000.0),
            ]));
            lines.push(format_row(&[
                self.position_name(&record.kind),
                format_latitude(record.position.latitude),
                format_hhmm(elapsed.num_minutes()),
                format!("{:.0}", record.distance_from_previous_nm),
                format!("{:.0}", sanitize(record.true_airspeed_kt)),
                String::new(),
                String::new(),
            ]));
            lines.push(format_row(&[
                record.kind.ident().to_string(),
                format_longitude(record.position.longitude),
                record.timestamp.format("%H%M").to_string(),
                format!("{:.0}", remaining_nm),
                format!("{:.0}", sanitize(record.ground_speed_kt)),
                String::new(),
                format!("{:.1}", burned_kg / 1000.0),
            ]));
            lines.push(String::new());

            remaining_nm = (remaining_nm - record.distance_from_previous_nm).max(0.0);
        }
    }

    /// Airport full name from the plan, or the code itself.
    fn airport_name(&self, code: &str) -> String {
        self.meta
            .and_then(|meta| meta.airport_name(code))
            .unwrap_or(code)
            .to_string()
    }

    fn position_name(&self, kind: &PassageKind) -> String {
        match kind {
            PassageKind::Waypoint(name) => name.clone(),
            PassageKind::Takeoff(code) | PassageKind::Landing(code) => self.airport_name(code),
        }
    }
}

/// Route endpoints as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteSummary {
    departure_code: String,
    destination_code: String,
}

impl RouteSummary {
    fn from_records(records: &[PassageRecord]) -> Self {
        let departure_code = match records.first().map(|r| &r.kind) {
            Some(PassageKind::Takeoff(code)) => code.clone(),
            _ => UNKNOWN_AIRPORT.to_string(),
        };
        let destination_code = match records.last().map(|r| &r.kind) {
            Some(PassageKind::Landing(code)) => code.clone(),
            _ => UNKNOWN_AIRPORT.to_string(),
        };
        Self {
            departure_code,
            destination_code,
        }
    }

    /// Drops plain waypoints named like an endpoint airport; the takeoff and
    /// landing records already stand for them.
    fn dedupe<'r>(&self, records: &'r [PassageRecord]) -> Vec<&'r PassageRecord> {
        records
            .iter()
            .filter(|record| match &record.kind {
                PassageKind::Waypoint(name) => {
                    *name != self.departure_code && *name != self.destination_code
                }
                _ => true,
            })
            .collect()
    }
}

/// Formats a minute count as `HHmm`.
fn format_hhmm(total_minutes: i64) -> String {
    let total_minutes = total_minutes.max(0);
    format!("{:02}{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_plan::AirportInfo;
    use crate::telemetry::TelemetrySample;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
    }

    fn meta() -> FlightPlanMeta {
        FlightPlanMeta::new(
            AirportInfo::new("LGRP", "RHODES DIAGORAS"),
            AirportInfo::new("ESSA", "STOCKHOLM ARLANDA"),
        )
    }

    fn record(kind: PassageKind, lat: f64, lon: f64, minutes: i64, distance: f64) -> PassageRecord {
        let mut sample = TelemetrySample::at(lat, lon, 300.0);
        sample.fuel_remaining_kg = 10_000.0 - minutes as f64 * 40.0;
        sample.altitude_ft = 35_040.0;
        sample.mach = 0.784;
        sample.oat_c = -54.6;
        sample.true_airspeed_kt = 452.4;
        PassageRecord::from_sample(kind, &sample, t0() + Duration::minutes(minutes), distance)
    }

    #[test]
    fn test_format_hhmm() {
        assert_eq!(format_hhmm(0), "0000");
        assert_eq!(format_hhmm(75), "0115");
        assert_eq!(format_hhmm(-3), "0000");
    }

    #[test]
    fn test_empty_log_renders_no_fixes_line() {
        let generator = OfpReportGenerator::new(None, "Boeing 737-800");
        let text = generator.render(&PassageLog::new(), t0());

        let expected = "\
19OCT2026 UNKNOWN-UNKNOWN
OFP 1 UNKNOWN-UNKNOWN
Generated: 2026-10-19 0800Z
Aircraft: Boeing 737-800

No GPS fixes were passed during this flight.
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_header_uses_plan_names() {
        let meta = meta();
        let generator = OfpReportGenerator::new(Some(&meta), "A320");
        let records = vec![
            record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0),
            record(PassageKind::Landing("ESSA".into()), 59.65, 17.92, 200, 1200.0),
        ];
        let text = generator.render_records(&records, t0());
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("19OCT2026 LGRP-ESSA"));
        assert_eq!(
            lines.next(),
            Some("OFP 1 RHODES DIAGORAS-STOCKHOLM ARLANDA")
        );
        assert_eq!(lines.next(), Some("Generated: 2026-10-19 0800Z"));
        assert_eq!(lines.next(), Some("Aircraft: A320"));
    }

    #[test]
    fn test_record_block_layout() {
        let meta = meta();
        let generator = OfpReportGenerator::new(Some(&meta), "A320");
        let records = vec![
            record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0),
            record(PassageKind::Waypoint("VANES".into()), 36.385, 27.731, 15, 17.0),
        ];
        let text = generator.render_records(&records, t0());
        let lines: Vec<&str> = text.lines().collect();

        // 5 header lines, 3 table header rows, then the VANES block
        let block = &lines[12..15];
        assert_eq!(
            block[0],
            format_row(&["", "", "", "350", "0.78", "-55", "9.4"])
        );
        assert_eq!(
            block[1],
            format_row(&["VANES", "N 36 23.1", "0015", "17", "452", "", ""])
        );
        // Remaining distance still includes this record's own leg
        assert_eq!(
            block[2],
            format_row(&["VANES", "E 027 43.9", "0815", "17", "300", "", "0.6"])
        );
    }

    #[test]
    fn test_takeoff_block_uses_airport_name() {
        let meta = meta();
        let generator = OfpReportGenerator::new(Some(&meta), "A320");
        let records = vec![record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0)];
        let text = generator.render_records(&records, t0());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[9].starts_with("RHODES DIAGORAS N 36 24.0"));
        assert!(lines[10].starts_with("LGRP           E 028 04.8"));
        // Fuel section needs at least two records
        assert!(!text.contains(FUEL_SECTION_HEADER));
    }

    #[test]
    fn test_remaining_distance_decreases_to_zero() {
        let generator = OfpReportGenerator::new(None, "A320");
        let records = vec![
            record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0),
            record(PassageKind::Waypoint("VANES".into()), 36.385, 27.731, 15, 17.0),
            record(PassageKind::Waypoint("ETERU".into()), 36.468, 27.060, 25, 33.0),
        ];
        let text = generator.render_records(&records, t0());
        let rdis: Vec<String> = text
            .lines()
            .filter(|line| line.contains(" E 0"))
            .map(|line| line[31..35].trim().to_string())
            .collect();

        assert_eq!(rdis, vec!["50", "50", "33"]);
    }

    #[test]
    fn test_endpoint_waypoints_are_deduplicated() {
        let meta = meta();
        let generator = OfpReportGenerator::new(Some(&meta), "A320");
        let records = vec![
            record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0),
            record(PassageKind::Waypoint("LGRP".into()), 36.4, 28.08, 1, 0.0),
            record(PassageKind::Waypoint("VANES".into()), 36.385, 27.731, 15, 17.0),
            record(PassageKind::Waypoint("ESSA".into()), 59.65, 17.92, 199, 1200.0),
            record(PassageKind::Landing("ESSA".into()), 59.65, 17.92, 200, 0.0),
        ];
        let text = generator.render_records(&records, t0());

        let idents: Vec<&str> = text
            .lines()
            .filter(|line| line.contains(" E 0"))
            .map(|line| line[..14].trim_end())
            .collect();
        assert_eq!(idents, vec!["LGRP", "VANES", "ESSA"]);
        assert!(text.contains("LGRP→VANES"));
        assert!(text.contains("VANES→ESSA"));
    }

    #[test]
    fn test_non_finite_values_render_as_zero() {
        let generator = OfpReportGenerator::new(None, "A320");
        let mut record = record(PassageKind::Waypoint("VANES".into()), 36.385, 27.731, 0, 0.0);
        record.mach = f64::NAN;
        record.oat_c = f64::INFINITY;
        record.true_airspeed_kt = f64::NAN;

        let text = generator.render_records(&[record], t0());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[8], format_row(&["", "", "", "350", "0.00", "0", "10.0"]));
        assert_eq!(
            lines[9],
            format_row(&["VANES", "N 36 23.1", "0000", "0", "0", "", ""])
        );
    }

    #[test]
    fn test_fuel_section() {
        let generator = OfpReportGenerator::new(None, "A320");
        let records = vec![
            record(PassageKind::Takeoff("LGRP".into()), 36.4, 28.08, 0, 0.0),
            record(PassageKind::Waypoint("VANES".into()), 36.385, 27.731, 15, 17.0),
        ];
        let text = generator.render_records(&records, t0());
        let lines: Vec<&str> = text.lines().collect();

        let header = lines
            .iter()
            .position(|line| *line == FUEL_SECTION_HEADER)
            .unwrap();
        assert_eq!(lines[header + 1], "LGRP→VANES    15.0   0.6    2400");
        assert_eq!(lines.len(), header + 2);
    }
}
