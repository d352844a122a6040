//! Body-system categorization of symptom labels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Organ system a symptom is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySystem {
    General,
    Cardiovascular,
    Respiratory,
    Gastrointestinal,
    Neurological,
    Musculoskeletal,
    Genitourinary,
    Dermatological,
    Psychiatric,
    Sensory,
}

/// Keyword fragments per body system, checked in this order.
const SYSTEM_KEYWORDS: &[(BodySystem, &[&str])] = &[
    (
        BodySystem::General,
        &["fever", "fatigue", "weakness", "weight loss", "weight gain"],
    ),
    (
        BodySystem::Cardiovascular,
        &["chest pain", "palpitations", "edema", "swelling"],
    ),
    (
        BodySystem::Respiratory,
        &["cough", "shortness of breath", "wheezing", "hemoptysis"],
    ),
    (
        BodySystem::Gastrointestinal,
        &["nausea", "vomiting", "diarrhea", "abdominal pain"],
    ),
    (
        BodySystem::Neurological,
        &["headache", "dizziness", "seizure", "tremor", "numbness"],
    ),
    (
        BodySystem::Musculoskeletal,
        &["joint pain", "muscle pain", "back pain", "stiffness"],
    ),
    (
        BodySystem::Genitourinary,
        &["dysuria", "hematuria", "frequency", "discharge"],
    ),
    (
        BodySystem::Dermatological,
        &["rash", "itching", "lesions", "bruising"],
    ),
    (
        BodySystem::Psychiatric,
        &["anxiety", "depression", "insomnia", "hallucinations"],
    ),
    (
        BodySystem::Sensory,
        &["blurred vision", "hearing loss", "tinnitus", "eye pain"],
    ),
];

impl BodySystem {
    /// The first body system with a keyword contained in `symptom`, or `General`.
    pub fn classify(symptom: &str) -> Self {
        let lower = symptom.to_lowercase();
        SYSTEM_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(system, _)| *system)
            .unwrap_or(BodySystem::General)
    }
}

/// Group symptoms by body system. Systems with no symptoms are omitted.
pub fn categorize<I, S>(symptoms: I) -> BTreeMap<BodySystem, Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut grouped: BTreeMap<BodySystem, Vec<String>> = BTreeMap::new();
    for symptom in symptoms {
        let symptom = symptom.as_ref();
        grouped
            .entry(BodySystem::classify(symptom))
            .or_default()
            .push(symptom.to_string());
    }
    grouped
}
