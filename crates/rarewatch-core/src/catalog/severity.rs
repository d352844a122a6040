//! Symptom rarity table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CatalogError, CatalogResult};

/// Rarity assumed for symptoms absent from the table.
pub const DEFAULT_RARITY: f64 = 0.3;

/// One entry of the severity source file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeverityEntry {
    pub rarity_score: f64,
}

/// Symptom label → rarity score in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeverityTable {
    scores: BTreeMap<String, f64>,
}

impl SeverityTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from (label, rarity) pairs. Scores are clamped to `[0, 1]`.
    pub fn from_scores<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            scores: scores
                .into_iter()
                .map(|(label, score)| (label.as_ref().trim().to_lowercase(), score.clamp(0.0, 1.0)))
                .collect(),
        }
    }

    /// Parse `{ "<symptom>": {"rarity_score": 0.7}, ... }`.
    ///
    /// Entries without a numeric `rarity_score` are skipped.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let document: Value = serde_json::from_str(json)?;
        let Value::Object(entries) = document else {
            return Err(CatalogError::Shape(
                "severity table must be an object".to_string(),
            ));
        };

        let mut scores = Vec::with_capacity(entries.len());
        for (label, entry) in entries {
            match serde_json::from_value::<SeverityEntry>(entry) {
                Ok(SeverityEntry { rarity_score }) => scores.push((label, rarity_score)),
                Err(e) => {
                    tracing::warn!(symptom = %label, error = %e, "Skipping severity entry")
                }
            }
        }
        Ok(Self::from_scores(scores))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load a severity file, falling back to an empty table on any failure.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> (Self, Option<String>) {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(table) => {
                tracing::info!(path = %path.display(), symptoms = table.len(), "Loaded severity table");
                (table, None)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load severity table");
                (
                    Self::empty(),
                    Some(format!("severity table {}: {e}", path.display())),
                )
            }
        }
    }

    /// Rarity of a symptom, if listed.
    pub fn get(&self, symptom: &str) -> Option<f64> {
        self.scores.get(symptom).copied()
    }

    /// Rarity of a symptom, [`DEFAULT_RARITY`] if unlisted.
    pub fn rarity(&self, symptom: &str) -> f64 {
        self.get(symptom).unwrap_or(DEFAULT_RARITY)
    }

    /// Mean rarity over `symptoms`; [`DEFAULT_RARITY`] for an empty input.
    pub fn average_rarity<I, S>(&self, symptoms: I) -> f64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (sum, count) = symptoms
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), s| (sum + self.rarity(s.as_ref()), count + 1));
        if count == 0 {
            DEFAULT_RARITY
        } else {
            sum / count as f64
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
