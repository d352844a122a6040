//! Signature matching and confidence scoring.
//!
//! Scoring factors (summed, capped at 0.95):
//! - Symptom coverage: up to 0.5
//! - Visit spread: 0.05 per extra visit date, up to 0.2
//! - Time spread: days / 150, up to 0.2
//! - Average symptom rarity: up to 0.1
//! - Boost symptoms: 0.05 each

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

use crate::catalog::SeverityTable;
use crate::models::{
    CandidateMatch, ConfidenceBreakdown, DiseaseSignature, Severity, SymptomLedger, TimelineEntry,
};

const BASE_WEIGHT: f64 = 0.5;
const VISIT_BONUS_PER_VISIT: f64 = 0.05;
const MAX_VISIT_BONUS: f64 = 0.2;
const TIME_BONUS_DAYS: f64 = 150.0;
const MAX_TIME_BONUS: f64 = 0.2;
const RARITY_WEIGHT: f64 = 0.1;
const BOOST_PER_SYMPTOM: f64 = 0.05;

/// Why a signature produced no candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFailure {
    TooFewSymptoms { matched: usize, required: usize },
    TooFewVisits { visits: usize, required: usize },
    SpanTooShort { days: i64, required: i64 },
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::TooFewSymptoms { matched, required } => {
                write!(f, "{matched} symptoms matched, need {required}")
            }
            GateFailure::TooFewVisits { visits, required } => {
                write!(f, "only {visits} visits, need {required}")
            }
            GateFailure::SpanTooShort { days, required } => {
                write!(f, "span {days} days, need {required}")
            }
        }
    }
}

/// Matches one signature at a time against a symptom ledger.
pub struct PatternMatcher<'a> {
    severity: &'a SeverityTable,
}

impl<'a> PatternMatcher<'a> {
    pub fn new(severity: &'a SeverityTable) -> Self {
        Self { severity }
    }

    /// Evaluate one signature.
    ///
    /// With `as_of` set, only occurrences in `[as_of - window, as_of]` count;
    /// otherwise every occurrence does.
    pub fn evaluate(
        &self,
        signature: &DiseaseSignature,
        ledger: &SymptomLedger,
        as_of: Option<NaiveDate>,
    ) -> Result<CandidateMatch, GateFailure> {
        let mut matched_symptoms = Vec::new();
        let mut visit_dates = BTreeSet::new();
        let mut timeline = Vec::new();

        for symptom in &signature.required_symptoms {
            let Some(occurrences) = ledger.occurrences(symptom) else {
                continue;
            };

            let mut in_window = false;
            for occurrence in occurrences {
                let Some(date) = occurrence.parsed_date() else {
                    tracing::warn!(
                        symptom = %symptom,
                        date = %occurrence.date,
                        "Skipping occurrence with malformed date"
                    );
                    continue;
                };
                if !within_window(date, as_of, signature.time_window_days) {
                    continue;
                }
                in_window = true;
                visit_dates.insert(date);
                timeline.push(TimelineEntry {
                    symptom: symptom.clone(),
                    date,
                });
            }
            if in_window {
                matched_symptoms.push(symptom.clone());
            }
        }

        if matched_symptoms.len() < signature.min_matches {
            return Err(GateFailure::TooFewSymptoms {
                matched: matched_symptoms.len(),
                required: signature.min_matches,
            });
        }

        let visit_count = visit_dates.len();
        if visit_count < signature.min_visits_required || visit_count == 0 {
            return Err(GateFailure::TooFewVisits {
                visits: visit_count,
                required: signature.min_visits_required,
            });
        }

        let days_span = match (visit_dates.first(), visit_dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_days(),
            _ => 0,
        };
        if days_span < signature.min_timespan_days {
            return Err(GateFailure::SpanTooShort {
                days: days_span,
                required: signature.min_timespan_days,
            });
        }

        let breakdown = self.score(signature, &matched_symptoms, visit_count, days_span);
        timeline.sort_by_key(|entry| entry.date);

        Ok(CandidateMatch {
            disease_id: signature.id.clone(),
            average_rarity: self.severity.average_rarity(&matched_symptoms),
            raw_confidence: breakdown.total(),
            matched_symptoms,
            visit_dates,
            days_span,
            breakdown,
            timeline,
        })
    }

    /// Evaluate one signature, logging and discarding gate failures.
    pub fn candidate(
        &self,
        signature: &DiseaseSignature,
        ledger: &SymptomLedger,
        as_of: Option<NaiveDate>,
    ) -> Option<CandidateMatch> {
        match self.evaluate(signature, ledger, as_of) {
            Ok(candidate) => Some(candidate),
            Err(failure) => {
                tracing::debug!(disease = %signature.display_name, reason = %failure, "No match");
                None
            }
        }
    }

    /// Multi-factor confidence for symptoms that passed every gate.
    pub fn score(
        &self,
        signature: &DiseaseSignature,
        matched_symptoms: &[String],
        visit_count: usize,
        days_span: i64,
    ) -> ConfidenceBreakdown {
        let required = signature.required_symptoms.len();
        let base = if required == 0 {
            0.0
        } else {
            matched_symptoms.len() as f64 / required as f64 * BASE_WEIGHT
        };

        let extra_visits = visit_count.saturating_sub(1) as f64;
        let boosted = matched_symptoms
            .iter()
            .filter(|s| signature.confidence_boost_symptoms.contains(*s))
            .count();

        ConfidenceBreakdown {
            base,
            visit_bonus: (extra_visits * VISIT_BONUS_PER_VISIT).min(MAX_VISIT_BONUS),
            time_bonus: (days_span.max(0) as f64 / TIME_BONUS_DAYS).min(MAX_TIME_BONUS),
            rarity_bonus: self.severity.average_rarity(matched_symptoms) * RARITY_WEIGHT,
            boost_bonus: boosted as f64 * BOOST_PER_SYMPTOM,
        }
    }

    /// Severity tier from a confidence and the matched symptoms' rarity.
    pub fn severity_for(&self, candidate: &CandidateMatch) -> Severity {
        Severity::from_scores(candidate.raw_confidence, candidate.average_rarity)
    }
}

fn within_window(date: NaiveDate, as_of: Option<NaiveDate>, window_days: i64) -> bool {
    match as_of {
        Some(as_of) => {
            let age = (as_of - date).num_days();
            (0..=window_days).contains(&age)
        }
        None => true,
    }
}
