//! Golden tests for longitudinal detection.
//!
//! Each case replays a symptom history into a fresh ledger and checks which
//! signatures alert, and with what shape.

use rarewatch_core::catalog::{DiseaseCatalog, SeverityTable};
use rarewatch_core::detector::{CommonConditionFilter, DetectionEngine};
use rarewatch_core::models::{Demographics, Severity, SymptomLedger};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    history: &'static [(&'static str, &'static [&'static str])],
    as_of: Option<&'static str>,
    age: Option<u32>,
    expected_alerts: &'static [&'static str],
}

const CATALOG: &str = r#"{
    "diseases": [
        {
            "name": "Systemic Lupus Erythematosus",
            "symptoms": ["joint pain", "rash", "fever", "fatigue", "photophobia"],
            "min_symptoms": 3,
            "confidence_boost_symptoms": ["photophobia"],
            "diagnostic_tests": ["ANA", "anti-dsDNA", "Complement levels"],
            "specialist": "Rheumatologist",
            "icd10": "M32"
        },
        {
            "name": "Fabry Disease",
            "symptoms": {
                "neurological": ["burning pain", "tingling"],
                "dermatological": ["angiokeratoma"],
                "renal": ["proteinuria"]
            },
            "min_matches": 3,
            "min_timespan_days": 30,
            "suggested_tests": ["Alpha-galactosidase A activity"],
            "specialists": ["Geneticist", "Nephrologist"],
            "icd_code": "E75.21"
        },
        {
            "name": "Wilson's Disease",
            "symptoms": ["tremor", "jaundice", "difficulty speaking", "mood swings"],
            "min_matches": 3,
            "time_window_days": 180,
            "suggested_tests": ["Serum ceruloplasmin"]
        },
        {
            "name": "Flu Lookalike",
            "symptoms": ["fever", "cough", "fatigue"],
            "min_matches": 3
        }
    ]
}"#;

const SEVERITY: &str = r#"{
    "angiokeratoma": {"rarity_score": 0.95},
    "burning pain": {"rarity_score": 0.7},
    "proteinuria": {"rarity_score": 0.6},
    "tingling": {"rarity_score": 0.5},
    "fever": {"rarity_score": 0.1},
    "fatigue": {"rarity_score": 0.15},
    "cough": {"rarity_score": 0.1}
}"#;

fn engine() -> DetectionEngine {
    DetectionEngine::new(
        DiseaseCatalog::from_json_str(CATALOG).unwrap(),
        SeverityTable::from_json_str(SEVERITY).unwrap(),
    )
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "lupus-three-visits",
            history: &[
                ("2024-01-01T09:00:00", &["joint pain"]),
                ("2024-01-05T09:00:00", &["fever"]),
                ("2024-01-20T09:00:00", &["joint pain", "rash", "fever"]),
            ],
            as_of: Some("2024-01-20T09:00:00"),
            age: Some(34),
            expected_alerts: &["systemic_lupus_erythematosus"],
        },
        GoldenCase {
            id: "single-day-never-alerts",
            history: &[
                ("2024-01-20T09:00:00", &["joint pain", "rash", "fever"]),
                ("2024-01-20T17:00:00", &["joint pain", "rash", "fever"]),
            ],
            as_of: Some("2024-01-20T18:00:00"),
            age: None,
            expected_alerts: &[],
        },
        GoldenCase {
            id: "span-too-short",
            history: &[
                ("2024-03-01T09:00:00", &["joint pain", "rash"]),
                ("2024-03-05T09:00:00", &["fever", "rash"]),
            ],
            as_of: None,
            age: None,
            expected_alerts: &[],
        },
        GoldenCase {
            id: "cold-flu-suppressed",
            history: &[
                ("2024-02-01", &["fever", "cough"]),
                ("2024-02-20", &["fatigue", "cough"]),
            ],
            as_of: Some("2024-02-20"),
            age: None,
            expected_alerts: &[],
        },
        GoldenCase {
            id: "fabry-categorized-symptoms",
            history: &[
                ("2023-06-01T10:00:00", &["burning pain", "tingling"]),
                ("2023-08-15T10:00:00", &["angiokeratoma"]),
                ("2023-11-02T10:00:00", &["proteinuria", "burning pain"]),
            ],
            as_of: Some("2023-11-02T10:00:00"),
            age: Some(19),
            expected_alerts: &["fabry_disease"],
        },
        GoldenCase {
            id: "outside-window",
            history: &[
                ("2022-01-01", &["tremor", "jaundice"]),
                ("2022-02-01", &["difficulty speaking"]),
            ],
            as_of: Some("2024-01-01"),
            age: None,
            expected_alerts: &[],
        },
        GoldenCase {
            id: "wilson-inside-window",
            history: &[
                ("2024-01-01", &["tremor", "jaundice"]),
                ("2024-02-01", &["difficulty speaking"]),
            ],
            as_of: Some("2024-02-15"),
            age: None,
            expected_alerts: &["wilsons_disease"],
        },
    ]
}

#[test]
fn test_golden_cases() {
    let engine = engine();

    for case in get_golden_cases() {
        let mut ledger = SymptomLedger::new();
        for (timestamp, symptoms) in case.history {
            ledger.update(symptoms.iter(), timestamp);
        }
        let demographics = Demographics {
            age: case.age,
            sex: None,
        };

        let alerts = engine.detect(&ledger, &demographics, case.as_of).unwrap();
        let ids: Vec<&str> = alerts.iter().map(|a| a.disease_id.as_str()).collect();

        assert_eq!(ids, case.expected_alerts, "Case {}: alert mismatch", case.id);
        for alert in &alerts {
            assert!(
                (0.0..=0.95).contains(&alert.confidence),
                "Case {}: confidence {} out of range",
                case.id,
                alert.confidence
            );
            assert!(
                alert.timeline.windows(2).all(|w| w[0].date <= w[1].date),
                "Case {}: timeline not sorted",
                case.id
            );
        }
    }
}

#[test]
fn test_lupus_alert_shape() {
    let mut ledger = SymptomLedger::new();
    ledger.update(["joint pain"], "2024-01-01T09:00:00");
    ledger.update(["fever"], "2024-01-05T09:00:00");
    ledger.update(["joint pain", "rash", "fever"], "2024-01-20T09:00:00");

    let alerts = engine()
        .detect(&ledger, &Demographics::default(), Some("2024-01-20"))
        .unwrap();
    let alert = &alerts[0];

    assert_eq!(alert.disease_name, "Systemic Lupus Erythematosus");
    assert_eq!(alert.matched_count, 3);
    assert_eq!(alert.required_count, 3);
    assert_eq!(alert.visit_count, 3);
    assert_eq!(alert.days_span, 19);
    assert_eq!(alert.suggested_tests[0], "ANA");
    assert_eq!(alert.specialists, vec!["Rheumatologist"]);
    assert_eq!(alert.icd_code, "M32");
    assert!(alert.ruled_out_conditions.is_empty());
    assert!(alert.message.starts_with("Potential Systemic Lupus Erythematosus detected ("));
    assert!(alert.message.contains("across 3 visits over 19 days"));
}

#[test]
fn test_fabry_is_high_severity() {
    let mut ledger = SymptomLedger::new();
    ledger.update(["burning pain", "tingling"], "2023-06-01");
    ledger.update(["angiokeratoma", "burning pain"], "2023-08-15");
    ledger.update(["proteinuria", "burning pain", "tingling"], "2023-11-02");

    let alerts = engine()
        .detect(&ledger, &Demographics::default(), None)
        .unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::High);
    assert_eq!(alerts[0].specialists, vec!["Geneticist", "Nephrologist"]);
    assert!(alerts[0].concerning_trend);
}

#[test]
fn test_alerts_sorted_by_confidence() {
    let mut ledger = SymptomLedger::new();
    ledger.update(["joint pain", "tremor"], "2024-01-01");
    ledger.update(["fever", "jaundice"], "2024-01-05");
    ledger.update(["joint pain", "rash", "fever", "difficulty speaking"], "2024-01-20");

    let alerts = engine()
        .detect(&ledger, &Demographics::default(), Some("2024-01-20"))
        .unwrap();

    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].confidence >= alerts[1].confidence);
}

#[test]
fn test_extended_filter_is_opt_in() {
    let engine = engine().with_filter(CommonConditionFilter::new(
        rarewatch_core::detector::CommonConditionTable::extended(),
    ));
    assert_eq!(engine.filter().table().len(), 20);
}
