//! Visit workflow over one in-memory patient snapshot.
//!
//! Every operation takes the patient record by `&mut`, so the ledger update and
//! the detection run for one patient can never interleave. Persisting the
//! record afterwards is the caller's job.

use chrono::Utc;
use rarewatch_nlp::SymptomExtractor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::detector::DetectionEngine;
use crate::models::{calendar_date, Alert, PatientRecord, Severity, Visit};

/// Visit workflow errors.
#[derive(Error, Debug)]
pub enum VisitError {
    #[error("Visit not found: {0}")]
    NotFound(String),
}

pub type VisitResult<T> = Result<T, VisitError>;

/// Data captured when a visit is opened.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVisit {
    pub chief_complaint: Option<String>,
    /// Defaults to now (RFC 3339) when absent
    pub timestamp: Option<String>,
}

/// Result of saving a visit or consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitOutcome {
    pub visit_id: String,
    pub extracted_symptoms: Vec<String>,
    pub alerts: Vec<Alert>,
    /// Set when detection failed and the visit was saved without fresh alerts
    pub detection_error: Option<String>,
}

/// Visit counts and alert rate for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitStatistics {
    pub total_visits: usize,
    pub visits_with_alerts: usize,
    /// Calendar date of the earliest visit
    pub first_visit: Option<String>,
    /// Calendar date of the latest visit
    pub last_visit: Option<String>,
    /// Percentage of visits with alerts, 1 dp
    pub alert_rate: f64,
}

/// One risk surfaced from the latest visit's alerts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LongitudinalRisk {
    pub condition: String,
    pub confidence: f64,
    pub severity: Severity,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskSummary {
    pub patient_id: String,
    pub risks: Vec<LongitudinalRisk>,
    pub risk_count: usize,
    pub high_risk_count: usize,
}

/// Tests named in a risk's suggested action.
const ACTION_TEST_LIMIT: usize = 2;

/// Saves visits and consultations, keeping the ledger and alerts in step.
pub struct VisitWorkflow<'a> {
    engine: &'a DetectionEngine,
    extractor: SymptomExtractor,
}

impl<'a> VisitWorkflow<'a> {
    pub fn new(engine: &'a DetectionEngine) -> Self {
        Self {
            engine,
            extractor: SymptomExtractor::new(),
        }
    }

    /// Open a new visit: extract symptoms from the complaint, update the
    /// ledger, append the visit and run detection as of the visit.
    ///
    /// Detection failure never stops the visit from being recorded.
    pub fn record_visit(&self, patient: &mut PatientRecord, new_visit: NewVisit) -> VisitOutcome {
        let timestamp = new_visit
            .timestamp
            .filter(|ts| !ts.trim().is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339());
        let mut visit = Visit::new(Uuid::new_v4().to_string(), timestamp);

        if let Some(complaint) = new_visit.chief_complaint.as_deref() {
            visit.merge_symptoms(self.extractor.extract(complaint));
        }
        visit.chief_complaint = new_visit.chief_complaint;

        if !visit.extracted_symptoms.is_empty() {
            patient
                .symptom_tracking
                .update(&visit.extracted_symptoms, &visit.timestamp);
        }

        match self.engine.detect(
            &patient.symptom_tracking,
            &patient.demographics,
            Some(visit.timestamp.as_str()),
        ) {
            Ok(alerts) => {
                if !alerts.is_empty() {
                    tracing::info!(
                        patient_id = %patient.patient_id,
                        alerts = alerts.len(),
                        "Rare-disease alerts raised"
                    );
                }
                visit.disease_alerts = alerts;
            }
            Err(e) => {
                tracing::error!(
                    patient_id = %patient.patient_id,
                    error = %e,
                    "Disease detection failed, saving visit without alerts"
                );
                visit.detection_error = Some(e.to_string());
            }
        }

        let outcome = outcome_of(&visit);
        patient.visits.push(visit);
        outcome
    }

    /// Attach a consultation summary and fold its symptoms into the visit.
    ///
    /// On detection failure the visit keeps its previous alerts.
    pub fn update_consultation(
        &self,
        patient: &mut PatientRecord,
        visit_id: &str,
        summary: &str,
    ) -> VisitResult<VisitOutcome> {
        let index = visit_index(patient, visit_id)?;
        let extracted = self.extractor.extract(summary);

        let visit = &mut patient.visits[index];
        visit.summary = Some(summary.to_string());
        visit.merge_symptoms(&extracted);
        if !extracted.is_empty() {
            patient.symptom_tracking.update(&extracted, &visit.timestamp);
        }

        match self.engine.detect(
            &patient.symptom_tracking,
            &patient.demographics,
            Some(visit.timestamp.as_str()),
        ) {
            Ok(alerts) => {
                visit.disease_alerts = alerts;
                visit.detection_error = None;
            }
            Err(e) => {
                tracing::error!(
                    patient_id = %patient.patient_id,
                    visit_id,
                    error = %e,
                    "Disease detection failed during consultation update"
                );
                visit.detection_error = Some(e.to_string());
            }
        }

        Ok(outcome_of(visit))
    }

    /// Remove a visit and rebuild the ledger from the visits that remain.
    pub fn delete_visit(&self, patient: &mut PatientRecord, visit_id: &str) -> VisitResult<Visit> {
        let index = visit_index(patient, visit_id)?;
        let removed = patient.visits.remove(index);
        patient.symptom_tracking.rebuild(&patient.visits);

        tracing::info!(
            patient_id = %patient.patient_id,
            visit_id,
            remaining = patient.visits.len(),
            "Visit deleted, symptom ledger rebuilt"
        );
        Ok(removed)
    }

    /// Visit counts, date range and alert rate.
    pub fn statistics(&self, patient: &PatientRecord) -> VisitStatistics {
        let total_visits = patient.visits.len();
        let visits_with_alerts = patient
            .visits
            .iter()
            .filter(|v| !v.disease_alerts.is_empty())
            .count();

        let mut timestamps: Vec<&str> = patient.visits.iter().map(|v| v.timestamp.as_str()).collect();
        timestamps.sort_unstable();
        let day = |ts: &&str| Some(calendar_date(ts).to_string()).filter(|d| !d.is_empty());

        let alert_rate = if total_visits == 0 {
            0.0
        } else {
            (visits_with_alerts as f64 / total_visits as f64 * 1000.0).round() / 10.0
        };

        VisitStatistics {
            total_visits,
            visits_with_alerts,
            first_visit: timestamps.first().and_then(day),
            last_visit: timestamps.last().and_then(day),
            alert_rate,
        }
    }

    /// Risks raised at the most recent visit.
    pub fn longitudinal_risks(&self, patient: &PatientRecord) -> RiskSummary {
        let risks: Vec<LongitudinalRisk> = patient
            .visits
            .last()
            .map(|visit| visit.disease_alerts.iter().map(risk_from_alert).collect())
            .unwrap_or_default();

        RiskSummary {
            patient_id: patient.patient_id.clone(),
            risk_count: risks.len(),
            high_risk_count: risks.iter().filter(|r| r.severity == Severity::High).count(),
            risks,
        }
    }
}

fn visit_index(patient: &PatientRecord, visit_id: &str) -> VisitResult<usize> {
    patient
        .visits
        .iter()
        .position(|v| v.visit_id == visit_id)
        .ok_or_else(|| VisitError::NotFound(visit_id.to_string()))
}

fn outcome_of(visit: &Visit) -> VisitOutcome {
    VisitOutcome {
        visit_id: visit.visit_id.clone(),
        extracted_symptoms: visit.extracted_symptoms.clone(),
        alerts: visit.disease_alerts.clone(),
        detection_error: visit.detection_error.clone(),
    }
}

fn risk_from_alert(alert: &Alert) -> LongitudinalRisk {
    let tests = alert
        .suggested_tests
        .iter()
        .take(ACTION_TEST_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    LongitudinalRisk {
        condition: alert.disease_name.clone(),
        confidence: alert.confidence,
        severity: alert.severity,
        message: alert.message.clone(),
        action: format!("Consider testing: {tests}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DiseaseCatalog, SeverityTable};
    use crate::models::{Demographics, DiseaseSignature};

    fn engine() -> DetectionEngine {
        let mut sle = DiseaseSignature::new("sle".into(), "Systemic Lupus Erythematosus".into())
            .with_symptoms(["joint pain", "rash", "fever"]);
        sle.suggested_tests = vec!["ANA".into(), "anti-dsDNA".into(), "Complement".into()];
        DetectionEngine::new(DiseaseCatalog::from_signatures([sle]), SeverityTable::empty())
    }

    fn visit(complaint: &str, timestamp: &str) -> NewVisit {
        NewVisit {
            chief_complaint: Some(complaint.to_string()),
            timestamp: Some(timestamp.to_string()),
        }
    }

    fn patient() -> PatientRecord {
        PatientRecord::new("P001".into(), Demographics::default())
    }

    #[test]
    fn test_record_visit_generates_id_and_timestamp() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        let outcome = workflow.record_visit(&mut patient, NewVisit::default());

        assert_eq!(patient.visits.len(), 1);
        assert_eq!(patient.visits[0].visit_id, outcome.visit_id);
        assert!(Uuid::parse_str(&outcome.visit_id).is_ok());
        assert!(patient.visits[0].timestamp.contains('T'));
        assert!(outcome.extracted_symptoms.is_empty());
    }

    #[test]
    fn test_longitudinal_alert_on_third_visit() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        workflow.record_visit(&mut patient, visit("joint pain", "2024-01-01T10:00:00"));
        workflow.record_visit(&mut patient, visit("fever", "2024-01-05T10:00:00"));
        let outcome = workflow.record_visit(
            &mut patient,
            visit("Patient has joint pain, rash and fever", "2024-01-20T10:00:00"),
        );

        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].visit_count, 3);

        let risks = workflow.longitudinal_risks(&patient);
        assert_eq!(risks.risk_count, 1);
        assert_eq!(risks.risks[0].action, "Consider testing: ANA, anti-dsDNA");
    }

    #[test]
    fn test_detection_failure_is_fail_open() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        let outcome = workflow.record_visit(&mut patient, visit("rash", "next week"));

        assert_eq!(patient.visits.len(), 1);
        assert!(outcome.alerts.is_empty());
        assert!(outcome.detection_error.is_some());
    }

    #[test]
    fn test_update_consultation_merges_symptoms() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        workflow.record_visit(&mut patient, visit("joint pain", "2024-01-01T10:00:00"));
        workflow.record_visit(&mut patient, visit("fever", "2024-01-05T10:00:00"));
        let last = workflow.record_visit(&mut patient, visit("joint pain", "2024-01-20T10:00:00"));
        assert!(last.alerts.is_empty());

        let outcome = workflow
            .update_consultation(&mut patient, &last.visit_id, "Examination shows rash; reports fever.")
            .unwrap();

        assert!(outcome.extracted_symptoms.contains(&"rash".to_string()));
        assert!(outcome.extracted_symptoms.contains(&"joint pain".to_string()));
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(patient.symptom_tracking.occurrences("rash").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_visit_not_found() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        assert!(matches!(
            workflow.update_consultation(&mut patient, "missing", "fever"),
            Err(VisitError::NotFound(_))
        ));
        assert!(matches!(
            workflow.delete_visit(&mut patient, "missing"),
            Err(VisitError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_visit_rebuilds_ledger() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        workflow.record_visit(&mut patient, visit("rash", "2024-01-01T10:00:00"));
        let second = workflow.record_visit(&mut patient, visit("fever", "2024-01-05T10:00:00"));

        let removed = workflow.delete_visit(&mut patient, &second.visit_id).unwrap();

        assert_eq!(removed.visit_id, second.visit_id);
        assert!(patient.symptom_tracking.occurrences("fever").is_none());
        assert!(patient.symptom_tracking.occurrences("rash").is_some());
    }

    #[test]
    fn test_statistics() {
        let engine = engine();
        let workflow = VisitWorkflow::new(&engine);
        let mut patient = patient();

        assert_eq!(workflow.statistics(&patient).alert_rate, 0.0);

        workflow.record_visit(&mut patient, visit("joint pain", "2024-01-01T10:00:00"));
        workflow.record_visit(&mut patient, visit("fever", "2024-01-05T10:00:00"));
        workflow.record_visit(&mut patient, visit("joint pain, rash, fever", "2024-01-20T10:00:00"));

        let stats = workflow.statistics(&patient);
        assert_eq!(stats.total_visits, 3);
        assert_eq!(stats.visits_with_alerts, 1);
        assert_eq!(stats.first_visit.as_deref(), Some("2024-01-01"));
        assert_eq!(stats.last_visit.as_deref(), Some("2024-01-20"));
        assert_eq!(stats.alert_rate, 33.3);
    }
}
