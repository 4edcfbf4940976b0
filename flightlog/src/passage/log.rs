//! Append-only passage log.

use std::collections::HashSet;

use super::{PassageKind, PassageRecord};

/// Why an append was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendRejection {
    /// A record with the same name is already logged.
    DuplicateName,
    /// The record is older than the last logged record.
    OutOfOrder,
    /// A takeoff record can only open the log.
    TakeoffNotFirst,
    /// Nothing may follow a landing record.
    AfterLanding,
}

impl std::fmt::Display for AppendRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppendRejection::DuplicateName => write!(f, "duplicate name"),
            AppendRejection::OutOfOrder => write!(f, "timestamp before last record"),
            AppendRejection::TakeoffNotFirst => write!(f, "takeoff after other records"),
            AppendRejection::AfterLanding => write!(f, "log already closed by landing"),
        }
    }
}

/// Chronological, name-unique collection of passage records.
///
/// Invariants held by [`PassageLog::append`]:
/// - names are unique
/// - timestamps are non-decreasing
/// - a takeoff record is only accepted as the first record
/// - a landing record is always the last record
/// - the first record has a distance of zero
#[derive(Debug, Clone, Default)]
pub struct PassageLog {
    records: Vec<PassageRecord>,
    names: HashSet<String>,
}

impl PassageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, enforcing the log invariants.
    pub fn append(&mut self, mut record: PassageRecord) -> Result<(), AppendRejection> {
        let name = record.name();
        if self.names.contains(&name) {
            return Err(AppendRejection::DuplicateName);
        }

        if let Some(last) = self.records.last() {
            if matches!(last.kind, PassageKind::Landing(_)) {
                return Err(AppendRejection::AfterLanding);
            }
            if matches!(record.kind, PassageKind::Takeoff(_)) {
                return Err(AppendRejection::TakeoffNotFirst);
            }
            if record.timestamp < last.timestamp {
                return Err(AppendRejection::OutOfOrder);
            }
        } else {
            record.distance_from_previous_nm = 0.0;
        }

        self.names.insert(name);
        self.records.push(record);
        Ok(())
    }

    /// Whether a record with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[PassageRecord] {
        &self.records
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PassageRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&PassageRecord> {
        self.records.last()
    }

    /// Remove all records.
    pub fn clear(&mut self) {
        self.records.clear();
        self.names.clear();
    }
}

impl<'a> IntoIterator for &'a PassageLog {
    type Item = &'a PassageRecord;
    type IntoIter = std::slice::Iter<'a, PassageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
