//! Symptom extraction from free-text clinical narrative.
//!
//! Three passes are unioned, then pruned:
//! 1. Complaint patterns ("c/o ...", "presents with ...") split into fragments
//! 2. Keyword scan against the fixed vocabulary
//! 3. Multi-word phrase scan, dropping the phrase's constituent words
//!
//! Finally any label contained in a longer retained label is removed.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::vocabulary::{
    COMPLAINT_PATTERNS, EXCLUDED_TERMS, MAX_SYMPTOM_WORDS, MIN_SYMPTOM_CHARS,
    MULTI_WORD_SYMPTOMS, QUALIFIER_WORDS, SYMPTOM_KEYWORDS,
};

static COMPLAINT_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    COMPLAINT_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("Invalid complaint pattern"))
        .collect()
});

static FRAGMENT_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\band\b|/").expect("Invalid fragment separator"));

static KEYWORD_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| word_boundary_regexes(SYMPTOM_KEYWORDS));

static PHRASE_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| word_boundary_regexes(MULTI_WORD_SYMPTOMS));

fn word_boundary_regexes(terms: &[&'static str]) -> Vec<(&'static str, Regex)> {
    terms
        .iter()
        .map(|term| {
            let pattern = format!(r"\b{}\b", regex::escape(term));
            (*term, Regex::new(&pattern).expect("Invalid vocabulary term"))
        })
        .collect()
}

/// Extracts normalized symptom labels from narrative text.
///
/// Stateless: all vocabulary is compiled once per process and shared.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymptomExtractor;

impl SymptomExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the set of symptom labels mentioned in `text`.
    ///
    /// Blank text yields an empty set. Never fails.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        if text.trim().is_empty() {
            return BTreeSet::new();
        }

        let lower = text.to_lowercase();
        let mut symptoms = BTreeSet::new();

        symptoms.extend(self.pattern_pass(&lower));
        symptoms.extend(self.keyword_pass(&lower));
        self.phrase_pass(&lower, &mut symptoms);

        let pruned = remove_redundant(symptoms);
        tracing::debug!(count = pruned.len(), "extracted symptoms from narrative");
        pruned
    }

    /// Complaint-pattern pass.
    fn pattern_pass(&self, lower: &str) -> Vec<String> {
        let mut found = Vec::new();
        for regex in COMPLAINT_REGEXES.iter() {
            for caps in regex.captures_iter(lower) {
                let Some(span) = caps.get(1) else {
                    continue;
                };
                for part in FRAGMENT_SPLIT.split(span.as_str()) {
                    let candidate = clean_fragment(part);
                    if is_valid_symptom(&candidate) {
                        found.push(candidate);
                    }
                }
            }
        }
        found
    }

    /// Vocabulary pass.
    fn keyword_pass(&self, lower: &str) -> Vec<String> {
        KEYWORD_REGEXES
            .iter()
            .filter(|(_, regex)| regex.is_match(lower))
            .map(|(term, _)| (*term).to_string())
            .collect()
    }

    /// Multi-word pass. Drops standalone constituent words of matched phrases.
    fn phrase_pass(&self, lower: &str, symptoms: &mut BTreeSet<String>) {
        for (phrase, regex) in PHRASE_REGEXES.iter() {
            if !regex.is_match(lower) {
                continue;
            }
            for word in phrase.split_whitespace() {
                symptoms.remove(word);
            }
            symptoms.insert((*phrase).to_string());
        }
    }
}

/// Collapse whitespace, strip punctuation and qualifier words.
fn clean_fragment(fragment: &str) -> String {
    fragment
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
        .filter(|w| !w.is_empty() && !QUALIFIER_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a cleaned fragment is plausible as a symptom label.
fn is_valid_symptom(candidate: &str) -> bool {
    if candidate.chars().count() < MIN_SYMPTOM_CHARS {
        return false;
    }
    // Digits mean a measurement or duration.
    if candidate.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if candidate.split_whitespace().count() > MAX_SYMPTOM_WORDS {
        return false;
    }
    !EXCLUDED_TERMS.iter().any(|term| candidate.contains(term))
}

/// Drop every label that is a strict substring of another retained label.
fn remove_redundant(symptoms: BTreeSet<String>) -> BTreeSet<String> {
    symptoms
        .iter()
        .filter(|s| {
            !symptoms
                .iter()
                .any(|other| other != *s && other.contains(s.as_str()))
        })
        .cloned()
        .collect()
}
