//! Rare-disease signature models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Default minimum number of matched symptoms.
pub const DEFAULT_MIN_MATCHES: usize = 3;
/// Default look-back window in days.
pub const DEFAULT_TIME_WINDOW_DAYS: i64 = 365;
/// Default minimum number of distinct visit dates.
pub const DEFAULT_MIN_VISITS: usize = 2;
/// Default minimum days between first and last matched date.
pub const DEFAULT_MIN_TIMESPAN_DAYS: i64 = 7;

/// Canonical, normalized description of one rare disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseSignature {
    /// Catalog key
    pub id: String,
    /// Human-readable disease name
    pub display_name: String,
    /// Symptoms that make up the pattern (lower-case)
    pub required_symptoms: BTreeSet<String>,
    /// Matched symptoms needed before scoring
    pub min_matches: usize,
    /// Only occurrences this many days before the visit count
    pub time_window_days: i64,
    /// Distinct visit dates needed
    pub min_visits_required: usize,
    /// Days between earliest and latest matched date needed
    pub min_timespan_days: i64,
    /// Symptoms that add to confidence when matched
    pub confidence_boost_symptoms: BTreeSet<String>,
    /// Recommended investigations
    pub suggested_tests: Vec<String>,
    /// Recommended referrals
    pub specialists: Vec<String>,
    /// ICD-10 code
    pub icd_code: String,
}

impl DiseaseSignature {
    /// Create a signature with default thresholds.
    pub fn new(id: String, display_name: String) -> Self {
        Self {
            id,
            display_name,
            required_symptoms: BTreeSet::new(),
            min_matches: DEFAULT_MIN_MATCHES,
            time_window_days: DEFAULT_TIME_WINDOW_DAYS,
            min_visits_required: DEFAULT_MIN_VISITS,
            min_timespan_days: DEFAULT_MIN_TIMESPAN_DAYS,
            confidence_boost_symptoms: BTreeSet::new(),
            suggested_tests: Vec::new(),
            specialists: Vec::new(),
            icd_code: String::new(),
        }
    }

    /// Builder-style helper for required symptoms.
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_symptoms = symptoms
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }
}

/// Catalog key derived from a display name: lower-case, spaces to
/// underscores, apostrophes removed.
pub fn slugify(display_name: &str) -> String {
    display_name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['\'', '\u{2019}'], "")
}
