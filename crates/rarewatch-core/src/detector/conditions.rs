//! Reference table of prevalent, non-rare conditions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Symptoms so common that a pattern made only of them is weak evidence.
pub const VERY_COMMON_SYMPTOMS: &[&str] = &[
    "fever",
    "cough",
    "fatigue",
    "headache",
    "pain",
    "nausea",
    "vomiting",
    "diarrhea",
    "weakness",
    "runny nose",
    "sore throat",
    "congestion",
];

/// Everyday illness triples. A match containing any of them is never alerted.
pub const COMMON_ILLNESS_PATTERNS: &[(&str, [&str; 3])] = &[
    ("cold/flu", ["fever", "cough", "fatigue"]),
    ("gastroenteritis", ["nausea", "vomiting", "diarrhea"]),
    ("stress/tension", ["headache", "fatigue", "stress"]),
    ("upper respiratory infection", ["fever", "sore throat", "cough"]),
    ("dehydration/anemia", ["fatigue", "weakness", "dizziness"]),
];

/// A common condition and the symptoms it typically presents with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommonCondition {
    /// Snake-case key, e.g. `viral_fever`
    pub name: String,
    pub symptoms: BTreeSet<String>,
    /// Relative prevalence in `[0, 1]`
    pub prevalence: f64,
    /// Typical course, e.g. "3-7 days" or "chronic"
    pub typical_duration: String,
}

impl CommonCondition {
    pub fn new(name: &str, symptoms: &[&str], typical_duration: &str, prevalence: f64) -> Self {
        Self {
            name: name.to_string(),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            prevalence,
            typical_duration: typical_duration.to_string(),
        }
    }

    /// Title-cased name for display: `viral_fever` → `Viral Fever`.
    pub fn display_name(&self) -> String {
        self.name
            .split('_')
            .filter(|w| !w.is_empty())
            .map(title_word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Ordered, immutable list of common conditions.
///
/// Order is the tie-break when two conditions explain a match equally well
/// and share a prevalence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommonConditionTable {
    conditions: Vec<CommonCondition>,
}

impl CommonConditionTable {
    pub fn new(conditions: Vec<CommonCondition>) -> Self {
        Self { conditions }
    }

    /// The fourteen conditions used by the detection engine.
    pub fn standard() -> Self {
        Self::new(vec![
            CommonCondition::new(
                "viral_fever",
                &["fever", "fatigue", "headache", "body ache", "weakness", "loss of appetite"],
                "3-7 days",
                0.9,
            ),
            CommonCondition::new(
                "common_cold",
                &["runny nose", "sneezing", "sore throat", "cough", "fatigue", "mild fever"],
                "7-10 days",
                0.95,
            ),
            CommonCondition::new(
                "gastroenteritis",
                &["vomiting", "diarrhea", "abdominal pain", "fever", "nausea", "weakness"],
                "2-5 days",
                0.85,
            ),
            CommonCondition::new(
                "migraine",
                &["severe headache", "nausea", "vomiting", "sensitivity to light", "dizziness"],
                "1-3 days",
                0.7,
            ),
            CommonCondition::new(
                "anxiety_disorder",
                &["palpitations", "chest pain", "shortness of breath", "dizziness", "tremor", "fatigue"],
                "chronic",
                0.6,
            ),
            CommonCondition::new(
                "iron_deficiency_anemia",
                &["fatigue", "weakness", "pale skin", "shortness of breath", "dizziness", "cold hands"],
                "chronic",
                0.5,
            ),
            CommonCondition::new(
                "seasonal_allergies",
                &["runny nose", "sneezing", "itchy eyes", "congestion", "cough", "fatigue"],
                "seasonal",
                0.6,
            ),
            CommonCondition::new(
                "acid_reflux",
                &["chest pain", "heartburn", "difficulty swallowing", "regurgitation", "chronic cough"],
                "chronic",
                0.5,
            ),
            CommonCondition::new(
                "tension_headache",
                &["headache", "neck pain", "muscle tension", "fatigue", "irritability"],
                "1-2 days",
                0.8,
            ),
            CommonCondition::new(
                "urinary_tract_infection",
                &["burning urination", "frequent urination", "abdominal pain", "fever", "fatigue"],
                "3-7 days",
                0.6,
            ),
            CommonCondition::new(
                "bronchitis",
                &["cough", "chest congestion", "wheezing", "fatigue", "mild fever", "shortness of breath"],
                "7-21 days",
                0.5,
            ),
            CommonCondition::new(
                "sinusitis",
                &["facial pain", "nasal congestion", "headache", "cough", "fatigue", "fever"],
                "7-14 days",
                0.6,
            ),
            CommonCondition::new(
                "stress_syndrome",
                &["fatigue", "headache", "muscle tension", "insomnia", "irritability", "difficulty concentrating"],
                "variable",
                0.7,
            ),
            CommonCondition::new(
                "dehydration",
                &["fatigue", "dizziness", "dry mouth", "headache", "dark urine", "weakness"],
                "1-2 days",
                0.5,
            ),
        ])
    }

    /// [`standard`](Self::standard) plus six further everyday conditions.
    pub fn extended() -> Self {
        let mut table = Self::standard();
        table.conditions.extend([
            CommonCondition::new(
                "food_poisoning",
                &["vomiting", "diarrhea", "abdominal cramps", "fever", "weakness", "dehydration"],
                "1-3 days",
                0.4,
            ),
            CommonCondition::new(
                "muscle_strain",
                &["muscle pain", "stiffness", "weakness", "swelling", "limited movement"],
                "3-7 days",
                0.7,
            ),
            CommonCondition::new(
                "viral_gastritis",
                &["nausea", "vomiting", "abdominal pain", "loss of appetite", "fatigue"],
                "2-5 days",
                0.6,
            ),
            CommonCondition::new(
                "hypoglycemia",
                &["tremor", "sweating", "palpitations", "confusion", "weakness", "dizziness"],
                "acute",
                0.3,
            ),
            CommonCondition::new(
                "orthostatic_hypotension",
                &["dizziness", "lightheadedness", "weakness", "blurred vision", "fatigue"],
                "chronic",
                0.4,
            ),
            CommonCondition::new(
                "vitamin_d_deficiency",
                &["fatigue", "bone pain", "muscle weakness", "muscle aches", "mood changes"],
                "chronic",
                0.6,
            ),
        ]);
        table
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommonCondition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Default for CommonConditionTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(CommonConditionTable::standard().len(), 14);
        assert_eq!(CommonConditionTable::extended().len(), 20);
    }

    #[test]
    fn test_display_name() {
        let c = CommonCondition::new("iron_deficiency_anemia", &["fatigue"], "chronic", 0.5);
        assert_eq!(c.display_name(), "Iron Deficiency Anemia");
    }

    #[test]
    fn test_condition_symptoms_lowercase() {
        for condition in CommonConditionTable::extended().iter() {
            for symptom in &condition.symptoms {
                assert_eq!(symptom, &symptom.to_lowercase(), "{}", condition.name);
            }
        }
    }
}
