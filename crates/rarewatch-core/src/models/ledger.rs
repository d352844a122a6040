//! Per-patient longitudinal symptom ledger.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patient::Visit;

/// One observation of a symptom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occurrence {
    /// Calendar date (`YYYY-MM-DD`) of the visit
    pub date: String,
    /// Full visit timestamp as supplied by the caller
    pub visit_date: String,
}

impl Occurrence {
    /// Parse the calendar date. `None` for malformed records.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

/// Symptom label → occurrences, at most one per calendar date.
///
/// Serializes as a plain mapping so stored patient snapshots stay readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SymptomLedger {
    entries: BTreeMap<String, Vec<Occurrence>>,
}

impl SymptomLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge symptoms observed at `visit_timestamp`.
    ///
    /// Labels are trimmed and lower-cased; blank labels are ignored. A symptom
    /// already recorded on the same calendar date is not recorded again.
    /// Returns the number of new occurrences.
    pub fn update<I, S>(&mut self, symptoms: I, visit_timestamp: &str) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let date = calendar_date(visit_timestamp);
        let unique: BTreeSet<String> = symptoms
            .into_iter()
            .map(|s| normalize_label(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();

        let mut added = 0;
        for symptom in unique {
            let history = self.entries.entry(symptom).or_default();
            if history.iter().any(|occ| occ.date == date) {
                continue;
            }
            history.push(Occurrence {
                date: date.to_string(),
                visit_date: visit_timestamp.to_string(),
            });
            added += 1;
        }
        added
    }

    /// Clear the ledger and replay every visit's extracted symptoms in order.
    pub fn rebuild<'a, I>(&mut self, visits: I)
    where
        I: IntoIterator<Item = &'a Visit>,
    {
        self.entries.clear();
        for visit in visits {
            if !visit.extracted_symptoms.is_empty() {
                self.update(&visit.extracted_symptoms, &visit.timestamp);
            }
        }
    }

    /// Occurrences of one symptom, if any.
    pub fn occurrences(&self, symptom: &str) -> Option<&[Occurrence]> {
        self.entries.get(symptom).map(Vec::as_slice)
    }

    /// All tracked symptom labels.
    pub fn symptoms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over (symptom, occurrences).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Occurrence])> {
        self.entries
            .iter()
            .map(|(symptom, occ)| (symptom.as_str(), occ.as_slice()))
    }

    /// Number of distinct symptoms tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no symptom has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical form of a symptom label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Date portion of a timestamp: everything before the first `T` or space.
pub fn calendar_date(timestamp: &str) -> &str {
    let trimmed = timestamp.trim();
    trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed)
}

/// Parse the calendar date of a timestamp.
pub fn parse_calendar_date(timestamp: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(calendar_date(timestamp), "%Y-%m-%d").ok()
}
