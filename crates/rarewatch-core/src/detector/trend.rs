//! Progression check over a match timeline.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::catalog::SeverityTable;
use crate::models::TimelineEntry;

/// Rarity above which a symptom is considered high-severity.
const HIGH_SEVERITY_RARITY: f64 = 0.6;
/// Growth factor in per-date symptom count that counts as worsening.
const WORSENING_FACTOR: f64 = 1.5;
/// Dates a symptom must recur on to count as persistent.
const PERSISTENT_DATES: usize = 3;

/// Whether a timeline shows at least two of: worsening symptom load,
/// a high-severity symptom, a persistent symptom.
///
/// Unlisted symptoms count as rarity 0 here, unlike in scoring.
pub fn is_pattern_concerning(timeline: &[TimelineEntry], severity: &SeverityTable) -> bool {
    if timeline.is_empty() {
        return false;
    }

    let mut by_symptom: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
    let mut by_date: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for entry in timeline {
        let symptom = entry.symptom.as_str();
        by_symptom.entry(symptom).or_default().insert(entry.date);
        by_date.entry(entry.date).or_default().insert(symptom);
    }

    let worsening = by_date.len() >= 3
        && match (by_date.values().next(), by_date.values().next_back()) {
            (Some(first), Some(last)) => last.len() as f64 > first.len() as f64 * WORSENING_FACTOR,
            _ => false,
        };

    let high_severity = by_symptom
        .keys()
        .any(|s| severity.get(s).unwrap_or(0.0) > HIGH_SEVERITY_RARITY);

    let persistent = by_symptom
        .values()
        .any(|dates| dates.len() >= PERSISTENT_DATES);

    [worsening, high_severity, persistent]
        .iter()
        .filter(|flag| **flag)
        .count()
        >= 2
}
