//! RareWatch Core Library
//!
//! Longitudinal rare-disease pattern detection with common-condition
//! suppression. Decision support only: alerts are hints for the clinician,
//! never diagnoses.
//!
//! # Architecture
//!
//! ```text
//! Chief complaint / consultation summary
//!                 │
//!                 ▼
//!        Symptom Extractor (rarewatch-nlp)
//!                 │  symptom set
//!                 ▼
//!        Symptom Ledger Updater ──► patient.symptom_tracking
//!                 │                 (one entry per symptom per day)
//!                 ▼
//!   ┌─────────────────────────────┐
//!   │  Pattern Matcher            │◄── Disease Catalog (normalized once)
//!   │  gates: symptoms, visits,   │◄── Severity Table (rarity scores)
//!   │  timespan → confidence      │
//!   └─────────────┬───────────────┘
//!                 │  candidate match
//!                 ▼
//!      Common-Condition Filter (adjust / suppress)
//!                 │
//!                 ▼
//!          Alert Assembler ──► alerts sorted by confidence
//! ```
//!
//! # Core Principle
//!
//! **Detection is fail-open.** A broken catalog, a malformed date or an
//! unparseable timestamp never prevents a visit from being saved; it yields
//! fewer alerts and a diagnostic.
//!
//! # Modules
//!
//! - [`models`]: Domain types (ledger, signatures, alerts, patient snapshot)
//! - [`catalog`]: Disease catalog and severity table loading
//! - [`detector`]: Matcher, confidence scoring, filter and engine
//! - [`visits`]: Visit workflow over a patient snapshot
//! - [`config`]: Reference data locations

pub mod catalog;
pub mod config;
pub mod detector;
pub mod models;
pub mod visits;

// Re-export commonly used types
pub use catalog::{DiseaseCatalog, SeverityTable};
pub use config::EngineConfig;
pub use detector::{
    Assessment, CommonConditionFilter, CommonConditionTable, DetectionEngine, DetectionRequest,
};
pub use models::{
    Alert, Demographics, DiseaseSignature, PatientRecord, Severity, SymptomLedger, TimelineEntry,
    Visit,
};
pub use rarewatch_nlp::SymptomExtractor;
pub use visits::{NewVisit, VisitOutcome, VisitWorkflow};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum RareWatchError {
    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<catalog::CatalogError> for RareWatchError {
    fn from(e: catalog::CatalogError) -> Self {
        RareWatchError::CatalogError(e.to_string())
    }
}

impl From<serde_json::Error> for RareWatchError {
    fn from(e: serde_json::Error) -> Self {
        RareWatchError::SerializationError(e.to_string())
    }
}

impl From<detector::DetectionError> for RareWatchError {
    fn from(e: detector::DetectionError) -> Self {
        RareWatchError::InvalidInput(e.to_string())
    }
}

impl From<visits::VisitError> for RareWatchError {
    fn from(e: visits::VisitError) -> Self {
        match e {
            visits::VisitError::NotFound(id) => RareWatchError::NotFound(id),
        }
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open an engine from catalog and severity files.
///
/// Never fails; check `load_diagnostics()` for files that could not be read.
#[uniffi::export]
pub fn open_engine(
    catalog_path: String,
    fallback_catalog_path: Option<String>,
    severity_path: String,
) -> Arc<RareWatchCore> {
    let defaults = EngineConfig::default();
    let config = EngineConfig {
        catalog_path: catalog_path.into(),
        fallback_catalog_path: fallback_catalog_path
            .map(Into::into)
            .unwrap_or(defaults.fallback_catalog_path),
        severity_path: severity_path.into(),
    };
    Arc::new(RareWatchCore {
        engine: DetectionEngine::from_config(&config),
    })
}

/// Open an engine using the `RAREWATCH_*` environment variables or defaults.
#[uniffi::export]
pub fn open_engine_from_env() -> Arc<RareWatchCore> {
    Arc::new(RareWatchCore {
        engine: DetectionEngine::from_config(&EngineConfig::from_env()),
    })
}

/// Open an engine from in-memory JSON documents.
#[uniffi::export]
pub fn open_engine_from_json(
    catalog_json: String,
    severity_json: Option<String>,
) -> Result<Arc<RareWatchCore>, RareWatchError> {
    let catalog = DiseaseCatalog::from_json_str(&catalog_json)?;
    let severity = severity_json
        .as_deref()
        .map(SeverityTable::from_json_str)
        .transpose()?
        .unwrap_or_default();
    Ok(Arc::new(RareWatchCore {
        engine: DetectionEngine::new(catalog, severity),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Detection engine handle for FFI.
///
/// Immutable after construction, so it is shared across threads without a
/// lock. Patient snapshots cross the boundary as JSON.
#[derive(uniffi::Object)]
pub struct RareWatchCore {
    engine: DetectionEngine,
}

#[uniffi::export]
impl RareWatchCore {
    /// Extract symptom labels from free text.
    pub fn extract_symptoms(&self, text: String) -> Vec<String> {
        SymptomExtractor::new().extract(&text).into_iter().collect()
    }

    /// Run detection over a patient snapshot's ledger.
    pub fn detect(
        &self,
        patient_json: String,
        as_of: Option<String>,
    ) -> Result<Vec<FfiAlert>, RareWatchError> {
        let patient: PatientRecord = serde_json::from_str(&patient_json)?;
        let alerts = self.engine.detect(
            &patient.symptom_tracking,
            &patient.demographics,
            as_of.as_deref(),
        )?;
        Ok(alerts.into_iter().map(Into::into).collect())
    }

    /// Record a visit against a patient snapshot.
    pub fn record_visit(
        &self,
        patient_json: String,
        chief_complaint: Option<String>,
        timestamp: Option<String>,
    ) -> Result<FfiVisitOutcome, RareWatchError> {
        let mut patient: PatientRecord = serde_json::from_str(&patient_json)?;
        let outcome = VisitWorkflow::new(&self.engine).record_visit(
            &mut patient,
            NewVisit {
                chief_complaint,
                timestamp,
            },
        );
        FfiVisitOutcome::new(outcome, &patient)
    }

    /// Attach a consultation summary to an existing visit.
    pub fn update_consultation(
        &self,
        patient_json: String,
        visit_id: String,
        summary: String,
    ) -> Result<FfiVisitOutcome, RareWatchError> {
        let mut patient: PatientRecord = serde_json::from_str(&patient_json)?;
        let outcome =
            VisitWorkflow::new(&self.engine).update_consultation(&mut patient, &visit_id, &summary)?;
        FfiVisitOutcome::new(outcome, &patient)
    }

    /// Delete a visit. Returns the updated patient snapshot.
    pub fn delete_visit(
        &self,
        patient_json: String,
        visit_id: String,
    ) -> Result<String, RareWatchError> {
        let mut patient: PatientRecord = serde_json::from_str(&patient_json)?;
        VisitWorkflow::new(&self.engine).delete_visit(&mut patient, &visit_id)?;
        Ok(serde_json::to_string(&patient)?)
    }

    /// Number of disease signatures loaded.
    pub fn catalog_size(&self) -> u32 {
        self.engine.catalog().len() as u32
    }

    /// Problems encountered while loading reference data.
    pub fn load_diagnostics(&self) -> Vec<String> {
        self.engine.load_diagnostics().to_vec()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe alert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAlert {
    pub disease_id: String,
    pub disease_name: String,
    pub confidence: f64,
    pub matched_symptoms: Vec<String>,
    pub matched_count: u32,
    pub required_count: u32,
    pub visit_count: u32,
    pub days_span: i64,
    pub severity: String,
    pub timeline: Vec<FfiTimelineEntry>,
    pub suggested_tests: Vec<String>,
    pub specialists: Vec<String>,
    pub icd_code: String,
    pub ruled_out_conditions: Vec<String>,
    pub message: String,
    pub concerning_trend: bool,
}

impl From<Alert> for FfiAlert {
    fn from(alert: Alert) -> Self {
        Self {
            disease_id: alert.disease_id,
            disease_name: alert.disease_name,
            confidence: alert.confidence,
            matched_symptoms: alert.matched_symptoms,
            matched_count: alert.matched_count as u32,
            required_count: alert.required_count as u32,
            visit_count: alert.visit_count as u32,
            days_span: alert.days_span,
            severity: alert.severity.to_string(),
            timeline: alert.timeline.into_iter().map(Into::into).collect(),
            suggested_tests: alert.suggested_tests,
            specialists: alert.specialists,
            icd_code: alert.icd_code,
            ruled_out_conditions: alert.ruled_out_conditions,
            message: alert.message,
            concerning_trend: alert.concerning_trend,
        }
    }
}

/// FFI-safe timeline entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineEntry {
    pub symptom: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl From<TimelineEntry> for FfiTimelineEntry {
    fn from(entry: TimelineEntry) -> Self {
        Self {
            symptom: entry.symptom,
            date: entry.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// FFI-safe visit outcome, carrying the updated patient snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitOutcome {
    pub visit_id: String,
    pub extracted_symptoms: Vec<String>,
    pub alerts: Vec<FfiAlert>,
    pub detection_error: Option<String>,
    pub patient_json: String,
}

impl FfiVisitOutcome {
    fn new(outcome: VisitOutcome, patient: &PatientRecord) -> Result<Self, RareWatchError> {
        Ok(Self {
            visit_id: outcome.visit_id,
            extracted_symptoms: outcome.extracted_symptoms,
            alerts: outcome.alerts.into_iter().map(Into::into).collect(),
            detection_error: outcome.detection_error,
            patient_json: serde_json::to_string(patient)?,
        })
    }
}
