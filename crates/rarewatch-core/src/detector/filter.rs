//! Common-condition filter.
//!
//! Adjustments applied to the raw confidence, in order:
//! - best explaining condition covers ≥ 70% of the match: ×0.5
//! - every matched symptom is very common: ×0.6
//! - child under five with fewer than two unexplained symptoms: ×0.7
//! - more than half the symptoms unexplained: ×1.2
//! - match contains a common illness triple: ×0.3 and reject
//!
//! The first two reject when the running confidence drops below 0.5.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::conditions::{
    CommonCondition, CommonConditionTable, COMMON_ILLNESS_PATTERNS, VERY_COMMON_SYMPTOMS,
};
use crate::models::MAX_CONFIDENCE;

/// Minimum shared symptoms for a condition to explain a match.
const MIN_OVERLAP: usize = 2;
/// Minimum share of the match a condition must cover.
const MIN_OVERLAP_RATIO: f64 = 0.5;
/// Overlap ratio at which the best condition halves confidence.
const DOMINANT_OVERLAP_RATIO: f64 = 0.7;
/// Running confidence below which a penalized match is rejected.
const REJECT_BELOW: f64 = 0.5;
/// Children under this age get the pediatric penalty.
const PEDIATRIC_AGE: u32 = 5;

const MAX_RULED_OUT: usize = 3;
const MAX_DIFFERENTIALS: usize = 5;

/// Outcome of filtering one candidate match.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDecision {
    pub approve: bool,
    pub adjusted_confidence: f64,
    /// Up to three explaining conditions, title-cased, best first
    pub explained_by: Vec<String>,
}

/// A common condition offered as a differential diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Differential {
    pub condition: String,
    /// Share of the symptoms the condition covers, 2 dp
    pub confidence: f64,
    pub matched_symptoms: Vec<String>,
    pub typical_duration: String,
}

/// A condition that explains part of a symptom set.
#[derive(Debug, Clone)]
struct Explanation<'a> {
    condition: &'a CommonCondition,
    overlap: BTreeSet<String>,
    ratio: f64,
}

/// Suppresses rare-disease matches better explained by everyday illness.
#[derive(Debug, Clone, Default)]
pub struct CommonConditionFilter {
    table: CommonConditionTable,
}

impl CommonConditionFilter {
    pub fn new(table: CommonConditionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CommonConditionTable {
        &self.table
    }

    /// Judge whether a match should be alerted and adjust its confidence.
    pub fn evaluate<S: AsRef<str>>(
        &self,
        matched_symptoms: &[S],
        patient_age: u32,
        raw_confidence: f64,
    ) -> FilterDecision {
        let symptoms = normalized_set(matched_symptoms);
        let explanations = self.explanations(&symptoms);

        let explained: BTreeSet<&str> = explanations
            .iter()
            .flat_map(|e| e.overlap.iter().map(String::as_str))
            .collect();
        let unexplained = symptoms
            .iter()
            .filter(|s| !explained.contains(s.as_str()))
            .count();
        let unexplained_ratio = if symptoms.is_empty() {
            0.0
        } else {
            unexplained as f64 / symptoms.len() as f64
        };

        let mut approve = true;
        let mut confidence = raw_confidence;

        if explanations
            .first()
            .is_some_and(|top| top.ratio >= DOMINANT_OVERLAP_RATIO)
        {
            confidence *= 0.5;
            if confidence < REJECT_BELOW {
                approve = false;
            }
        }

        if symptoms.iter().all(|s| VERY_COMMON_SYMPTOMS.contains(&s.as_str())) {
            confidence *= 0.6;
            if confidence < REJECT_BELOW {
                approve = false;
            }
        }

        if patient_age < PEDIATRIC_AGE && unexplained < 2 {
            confidence *= 0.7;
        }

        if unexplained_ratio > 0.5 {
            confidence *= 1.2;
        }

        if let Some(pattern) = common_illness_pattern(&symptoms) {
            tracing::debug!(pattern, "Match contains a common illness pattern");
            approve = false;
            confidence *= 0.3;
        }

        let adjusted_confidence = confidence.min(MAX_CONFIDENCE);
        let explained_by: Vec<String> = explanations
            .iter()
            .take(MAX_RULED_OUT)
            .map(|e| e.condition.display_name())
            .collect();

        tracing::info!(
            symptoms = ?symptoms,
            ruled_out = ?explained_by,
            raw_confidence,
            adjusted_confidence,
            approve,
            "Common-condition filter decision"
        );

        FilterDecision {
            approve,
            adjusted_confidence,
            explained_by,
        }
    }

    /// Up to five common conditions that explain `symptoms`, best first.
    pub fn differentials<S: AsRef<str>>(&self, symptoms: &[S]) -> Vec<Differential> {
        let symptoms = normalized_set(symptoms);
        self.explanations(&symptoms)
            .into_iter()
            .take(MAX_DIFFERENTIALS)
            .map(|e| Differential {
                condition: e.condition.display_name(),
                confidence: (e.ratio * 100.0).round() / 100.0,
                matched_symptoms: e.overlap.into_iter().collect(),
                typical_duration: e.condition.typical_duration.clone(),
            })
            .collect()
    }

    /// Conditions sharing at least two symptoms and half the set, ranked by
    /// overlap ratio then prevalence.
    fn explanations(&self, symptoms: &BTreeSet<String>) -> Vec<Explanation<'_>> {
        if symptoms.is_empty() {
            return Vec::new();
        }

        let mut explanations: Vec<Explanation<'_>> = self
            .table
            .iter()
            .filter_map(|condition| {
                let overlap: BTreeSet<String> =
                    symptoms.intersection(&condition.symptoms).cloned().collect();
                let ratio = overlap.len() as f64 / symptoms.len() as f64;
                (overlap.len() >= MIN_OVERLAP && ratio >= MIN_OVERLAP_RATIO).then_some(
                    Explanation {
                        condition,
                        overlap,
                        ratio,
                    },
                )
            })
            .collect();

        explanations.sort_by(|a, b| {
            b.ratio
                .partial_cmp(&a.ratio)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    b.condition
                        .prevalence
                        .partial_cmp(&a.condition.prevalence)
                        .unwrap_or(Ordering::Equal)
                })
        });
        explanations
    }
}

fn normalized_set<S: AsRef<str>>(symptoms: &[S]) -> BTreeSet<String> {
    symptoms
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Name of the first common illness triple contained in `symptoms`.
fn common_illness_pattern(symptoms: &BTreeSet<String>) -> Option<&'static str> {
    COMMON_ILLNESS_PATTERNS
        .iter()
        .find(|(_, triple)| triple.iter().all(|s| symptoms.contains(*s)))
        .map(|(name, _)| *name)
}
