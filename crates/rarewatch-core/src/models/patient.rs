//! Patient snapshot and visit models.

use serde::{Deserialize, Serialize};

use super::alert::Alert;
use super::ledger::SymptomLedger;

/// Age assumed when demographics omit it.
pub const DEFAULT_PATIENT_AGE: u32 = 30;

/// Demographics the filter takes into account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Demographics {
    /// Age in years
    pub age: Option<u32>,
    /// Sex as recorded at registration
    pub sex: Option<String>,
}

impl Demographics {
    /// Age in years, or the default adult age when unknown.
    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(DEFAULT_PATIENT_AGE)
    }
}

/// The slice of a patient record the detector works on.
///
/// Owned by the caller; the engine receives it, mutates the ledger and visits,
/// and hands it back for persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientRecord {
    /// Patient identifier
    pub patient_id: String,
    /// Demographics
    #[serde(default)]
    pub demographics: Demographics,
    /// Visits in the order they were recorded
    #[serde(default)]
    pub visits: Vec<Visit>,
    /// Longitudinal symptom ledger derived from `visits`
    #[serde(default)]
    pub symptom_tracking: SymptomLedger,
}

impl PatientRecord {
    /// Create an empty record at registration.
    pub fn new(patient_id: String, demographics: Demographics) -> Self {
        Self {
            patient_id,
            demographics,
            visits: Vec::new(),
            symptom_tracking: SymptomLedger::new(),
        }
    }

    /// Find a visit by id.
    pub fn visit(&self, visit_id: &str) -> Option<&Visit> {
        self.visits.iter().find(|v| v.visit_id == visit_id)
    }

    /// Find a visit by id, mutably.
    pub fn visit_mut(&mut self, visit_id: &str) -> Option<&mut Visit> {
        self.visits.iter_mut().find(|v| v.visit_id == visit_id)
    }
}

/// One encounter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Unique visit ID
    pub visit_id: String,
    /// Visit timestamp (ISO 8601)
    pub timestamp: String,
    /// Free-text chief complaint
    #[serde(default)]
    pub chief_complaint: Option<String>,
    /// Consultation summary added after the visit
    #[serde(default)]
    pub summary: Option<String>,
    /// Symptoms extracted from complaint and summary
    #[serde(default)]
    pub extracted_symptoms: Vec<String>,
    /// Alerts attached by the last detection run
    #[serde(default)]
    pub disease_alerts: Vec<Alert>,
    /// Reason detection did not run, if it failed
    #[serde(default)]
    pub detection_error: Option<String>,
}

impl Visit {
    /// Create an empty visit.
    pub fn new(visit_id: String, timestamp: String) -> Self {
        Self {
            visit_id,
            timestamp,
            chief_complaint: None,
            summary: None,
            extracted_symptoms: Vec::new(),
            disease_alerts: Vec::new(),
            detection_error: None,
        }
    }

    /// Add symptoms not already listed for this visit. Returns the ones added.
    pub fn merge_symptoms<I, S>(&mut self, symptoms: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = Vec::new();
        for symptom in symptoms {
            let symptom = super::ledger::normalize_label(symptom.as_ref());
            if symptom.is_empty() || self.extracted_symptoms.contains(&symptom) {
                continue;
            }
            self.extracted_symptoms.push(symptom.clone());
            added.push(symptom);
        }
        added
    }
}
