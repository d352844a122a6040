//! Alert assembly.

use crate::models::{Alert, CandidateMatch, DiseaseSignature, Severity};

use super::filter::FilterDecision;

/// Matched symptoms named in the message before truncating.
const MESSAGE_SYMPTOM_LIMIT: usize = 3;

/// Package an approved candidate into an alert.
pub fn assemble_alert(
    signature: &DiseaseSignature,
    candidate: CandidateMatch,
    severity: Severity,
    decision: FilterDecision,
    concerning_trend: bool,
) -> Alert {
    let visit_count = candidate.visit_count();
    let message = alert_message(
        &signature.display_name,
        &candidate.matched_symptoms,
        visit_count,
        candidate.days_span,
        decision.adjusted_confidence,
    );

    Alert {
        disease_id: candidate.disease_id,
        disease_name: signature.display_name.clone(),
        confidence: decision.adjusted_confidence,
        matched_count: candidate.matched_symptoms.len(),
        matched_symptoms: candidate.matched_symptoms,
        required_count: signature.min_matches,
        visit_count,
        days_span: candidate.days_span,
        severity,
        timeline: candidate.timeline,
        suggested_tests: signature.suggested_tests.clone(),
        specialists: signature.specialists.clone(),
        icd_code: signature.icd_code.clone(),
        ruled_out_conditions: decision.explained_by,
        message,
        concerning_trend,
    }
}

/// Human-readable summary of a match.
pub fn alert_message(
    disease_name: &str,
    matched_symptoms: &[String],
    visit_count: usize,
    days_span: i64,
    confidence: f64,
) -> String {
    let mut symptom_list = matched_symptoms
        .iter()
        .take(MESSAGE_SYMPTOM_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if matched_symptoms.len() > MESSAGE_SYMPTOM_LIMIT {
        symptom_list.push_str(&format!(
            " (+{} more)",
            matched_symptoms.len() - MESSAGE_SYMPTOM_LIMIT
        ));
    }

    format!(
        "Potential {disease_name} detected ({:.0}% confidence). \
         Pattern: {symptom_list} across {visit_count} visits over {days_span} days. \
         Consider specialist evaluation and recommended tests.",
        confidence * 100.0
    )
}
