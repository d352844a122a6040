//! Detection output models.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound for any confidence score.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Coarse alert priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl Severity {
    /// Tier for a confidence and the average rarity of the matched symptoms.
    pub fn from_scores(confidence: f64, average_rarity: f64) -> Self {
        if confidence >= 0.8 && average_rarity > 0.6 {
            Severity::High
        } else if confidence >= 0.6 {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (symptom, date) pair contributing to a match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub symptom: String,
    pub date: NaiveDate,
}

/// Breakdown of how a candidate was scored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceBreakdown {
    /// Coverage of the signature's symptoms (max 0.5)
    pub base: f64,
    /// Spread across distinct visit dates (max 0.2)
    pub visit_bonus: f64,
    /// Spread across time (max 0.2)
    pub time_bonus: f64,
    /// Average rarity of matched symptoms (max 0.1)
    pub rarity_bonus: f64,
    /// 0.05 per matched boost symptom
    pub boost_bonus: f64,
}

impl ConfidenceBreakdown {
    /// Sum of all factors, capped at [`MAX_CONFIDENCE`].
    pub fn total(&self) -> f64 {
        let sum =
            self.base + self.visit_bonus + self.time_bonus + self.rarity_bonus + self.boost_bonus;
        sum.clamp(0.0, MAX_CONFIDENCE)
    }
}

/// Unfiltered evaluation of one signature against one ledger.
///
/// Produced only when every gate passes. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    pub disease_id: String,
    /// Matched symptoms in signature order
    pub matched_symptoms: Vec<String>,
    /// Distinct calendar dates of matched occurrences
    pub visit_dates: BTreeSet<NaiveDate>,
    pub days_span: i64,
    pub raw_confidence: f64,
    pub breakdown: ConfidenceBreakdown,
    /// Average rarity of the matched symptoms
    pub average_rarity: f64,
    /// Contributing occurrences, sorted by date
    pub timeline: Vec<TimelineEntry>,
}

impl CandidateMatch {
    pub fn visit_count(&self) -> usize {
        self.visit_dates.len()
    }
}

/// A rare-disease alert, owned by the caller once returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub disease_id: String,
    pub disease_name: String,
    /// Filter-adjusted confidence
    pub confidence: f64,
    pub matched_symptoms: Vec<String>,
    pub matched_count: usize,
    /// Minimum matches the signature requires
    pub required_count: usize,
    pub visit_count: usize,
    pub days_span: i64,
    pub severity: Severity,
    /// Sorted ascending by date
    pub timeline: Vec<TimelineEntry>,
    pub suggested_tests: Vec<String>,
    pub specialists: Vec<String>,
    pub icd_code: String,
    /// Common conditions that partially explain the pattern
    pub ruled_out_conditions: Vec<String>,
    pub message: String,
    /// Whether the timeline itself looks progressive or persistent
    #[serde(default)]
    pub concerning_trend: bool,
}
