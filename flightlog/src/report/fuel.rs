//! Leg-by-leg fuel consumption analysis.

use crate::passage::PassageRecord;

/// Header line of the fuel consumption section.
pub const FUEL_SECTION_HEADER: &str = "Leg           Time   Fuel   FF (kg/h)";

/// Fuel and time between two consecutive records.
#[derive(Debug, Clone, PartialEq)]
pub struct LegFuel {
    /// Identifier of the leg start (event prefix stripped).
    pub from: String,
    /// Identifier of the leg end (event prefix stripped).
    pub to: String,
    /// Elapsed time in minutes.
    pub minutes: f64,
    /// Fuel consumed in kg.
    pub fuel_kg: f64,
    /// Average fuel flow in kg/h, 0 for zero-length legs.
    pub fuel_flow_kg_hr: f64,
}

impl LegFuel {
    fn between(from: &PassageRecord, to: &PassageRecord) -> Self {
        let minutes = (to.timestamp - from.timestamp).num_milliseconds() as f64 / 60_000.0;
        let fuel_kg = from.fuel_remaining_kg - to.fuel_remaining_kg;
        let fuel_flow_kg_hr = if minutes > 0.0 {
            fuel_kg / (minutes / 60.0)
        } else {
            0.0
        };

        Self {
            from: from.kind.ident().to_string(),
            to: to.kind.ident().to_string(),
            minutes,
            fuel_kg,
            fuel_flow_kg_hr,
        }
    }

    /// Renders the leg as a fuel section line.
    ///
    /// Each value starts in the same column as its heading in
    /// [`FUEL_SECTION_HEADER`].
    pub fn to_line(&self) -> String {
        format!(
            "{:<14}{:<7.1}{:<7.1}{:.0}",
            format!("{}→{}", self.from, self.to),
            self.minutes,
            self.fuel_kg / 1000.0,
            self.fuel_flow_kg_hr
        )
    }
}

/// Summary of fuel use across all legs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuelAnalysis {
    /// Consecutive legs in record order.
    pub legs: Vec<LegFuel>,
}

impl FuelAnalysis {
    /// Analyze consecutive record pairs.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PassageRecord>,
    {
        let records: Vec<&PassageRecord> = records.into_iter().collect();
        let legs = records
            .windows(2)
            .map(|pair| LegFuel::between(pair[0], pair[1]))
            .collect();
        Self { legs }
    }

    /// Total elapsed minutes.
    pub fn total_minutes(&self) -> f64 {
        self.legs.iter().map(|leg| leg.minutes).sum()
    }

    /// Total fuel consumed in kg.
    pub fn total_fuel_kg(&self) -> f64 {
        self.legs.iter().map(|leg| leg.fuel_kg).sum()
    }

    /// Average fuel flow over the whole flight in kg/h.
    pub fn average_fuel_flow_kg_hr(&self) -> f64 {
        let minutes = self.total_minutes();
        if minutes > 0.0 {
            self.total_fuel_kg() / (minutes / 60.0)
        } else {
            0.0
        }
    }
}
