//! Longitudinal rare-disease detection.
//!
//! Pipeline: Ledger → Pattern Matcher → Common-Condition Filter → Alert Assembler

mod alert;
mod conditions;
mod filter;
mod matcher;
mod trend;

pub use alert::*;
pub use conditions::*;
pub use filter::*;
pub use matcher::*;
pub use trend::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{DiseaseCatalog, SeverityTable};
use crate::config::EngineConfig;
use crate::models::{
    parse_calendar_date, Alert, CandidateMatch, Demographics, DiseaseSignature, SymptomLedger,
};

/// Detection errors.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

pub type DetectionResult<T> = Result<T, DetectionError>;

/// Input handed over by the visit workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionRequest {
    pub demographics: Demographics,
    pub symptom_ledger: SymptomLedger,
    pub current_visit_symptoms: Vec<String>,
    pub visit_timestamp: String,
}

/// Updated ledger plus alerts, returned to the visit workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub symptom_ledger: SymptomLedger,
    pub alerts: Vec<Alert>,
    /// Why detection did not run, if it failed
    pub diagnostic: Option<String>,
}

/// Detection engine holding the immutable catalog and reference tables.
///
/// Holds no per-patient state; one instance can serve any number of patients.
#[derive(Debug, Clone, Default)]
pub struct DetectionEngine {
    catalog: DiseaseCatalog,
    severity: SeverityTable,
    filter: CommonConditionFilter,
    load_diagnostics: Vec<String>,
}

impl DetectionEngine {
    /// Create an engine with the standard common-condition table.
    pub fn new(catalog: DiseaseCatalog, severity: SeverityTable) -> Self {
        Self {
            catalog,
            severity,
            filter: CommonConditionFilter::default(),
            load_diagnostics: Vec::new(),
        }
    }

    /// Replace the common-condition filter.
    pub fn with_filter(mut self, filter: CommonConditionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Load catalog and severity table from the configured paths.
    ///
    /// Never fails: unreadable files leave an empty structure and a
    /// diagnostic in [`load_diagnostics`](Self::load_diagnostics).
    pub fn from_config(config: &EngineConfig) -> Self {
        let (catalog, catalog_error) = DiseaseCatalog::load_or_empty(config.resolved_catalog_path());
        let (severity, severity_error) = SeverityTable::load_or_empty(&config.severity_path);

        let mut engine = Self::new(catalog, severity);
        engine.load_diagnostics = catalog_error.into_iter().chain(severity_error).collect();
        engine
    }

    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    pub fn severity(&self) -> &SeverityTable {
        &self.severity
    }

    pub fn filter(&self) -> &CommonConditionFilter {
        &self.filter
    }

    /// Problems encountered while loading reference data.
    pub fn load_diagnostics(&self) -> &[String] {
        &self.load_diagnostics
    }

    /// Alerts for every signature the ledger matches, highest confidence first.
    pub fn detect(
        &self,
        ledger: &SymptomLedger,
        demographics: &Demographics,
        as_of: Option<&str>,
    ) -> DetectionResult<Vec<Alert>> {
        let as_of = as_of.map(parse_as_of).transpose()?;
        let matcher = PatternMatcher::new(&self.severity);
        let age = demographics.age_or_default();

        let mut alerts = Vec::new();
        for signature in self.catalog.signatures() {
            let Some(candidate) = matcher.candidate(signature, ledger, as_of) else {
                continue;
            };

            let severity = matcher.severity_for(&candidate);
            let decision =
                self.filter
                    .evaluate(&candidate.matched_symptoms, age, candidate.raw_confidence);
            if !decision.approve {
                tracing::info!(
                    disease = %signature.display_name,
                    ruled_out = ?decision.explained_by,
                    "Filtered out match"
                );
                continue;
            }

            let concerning = is_pattern_concerning(&candidate.timeline, &self.severity);
            alerts.push(assemble_alert(signature, candidate, severity, decision, concerning));
        }

        alerts.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(alerts)
    }

    /// Merge the current visit's symptoms into a copy of the ledger, then
    /// detect as of the visit.
    ///
    /// Fail-open: a detection failure yields no alerts and a diagnostic, and the
    /// updated ledger is still returned.
    pub fn assess(&self, request: DetectionRequest) -> Assessment {
        let DetectionRequest {
            demographics,
            mut symptom_ledger,
            current_visit_symptoms,
            visit_timestamp,
        } = request;

        symptom_ledger.update(&current_visit_symptoms, &visit_timestamp);

        match self.detect(&symptom_ledger, &demographics, Some(visit_timestamp.as_str())) {
            Ok(alerts) => Assessment {
                symptom_ledger,
                alerts,
                diagnostic: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "Detection failed");
                Assessment {
                    symptom_ledger,
                    alerts: Vec::new(),
                    diagnostic: Some(e.to_string()),
                }
            }
        }
    }

    /// Unfiltered candidate for one signature.
    pub fn candidate(
        &self,
        signature: &DiseaseSignature,
        ledger: &SymptomLedger,
        as_of: Option<&str>,
    ) -> DetectionResult<Option<CandidateMatch>> {
        let as_of = as_of.map(parse_as_of).transpose()?;
        Ok(PatternMatcher::new(&self.severity).candidate(signature, ledger, as_of))
    }
}

fn parse_as_of(timestamp: &str) -> DetectionResult<chrono::NaiveDate> {
    parse_calendar_date(timestamp)
        .ok_or_else(|| DetectionError::InvalidTimestamp(timestamp.to_string()))
}
