//! Normalization of heterogeneous catalog documents into [`DiseaseSignature`]s.
//!
//! Accepted document shapes:
//! - `{ "<id>": {signature}, ... }`
//! - `[ {signature}, ... ]`
//! - `{ "diseases": { "<id>": {signature}, ... } }`
//! - `{ "diseases": [ {signature}, ... ] }`
//!
//! List entries are keyed by the slug of their display name. Signatures keep
//! document order; a repeated id replaces the earlier entry in place.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::{CatalogError, CatalogResult};
use crate::models::{
    slugify, DiseaseSignature, DEFAULT_MIN_MATCHES, DEFAULT_MIN_TIMESPAN_DAYS, DEFAULT_MIN_VISITS,
    DEFAULT_TIME_WINDOW_DAYS,
};

/// Source keys accepted for each canonical field, in priority order.
pub const DISPLAY_NAME_FIELDS: &[&str] = &["display_name", "name"];
pub const REQUIRED_SYMPTOMS_FIELDS: &[&str] = &["required_symptoms", "symptoms"];
pub const MIN_MATCHES_FIELDS: &[&str] = &["min_matches", "min_symptoms"];
pub const TIME_WINDOW_FIELDS: &[&str] = &["time_window_days"];
pub const MIN_VISITS_FIELDS: &[&str] = &["min_visits_required"];
pub const MIN_TIMESPAN_FIELDS: &[&str] = &["min_timespan_days"];
pub const BOOST_FIELDS: &[&str] = &["confidence_boost_symptoms"];
pub const SUGGESTED_TESTS_FIELDS: &[&str] = &["suggested_tests", "diagnostic_tests"];
pub const SPECIALISTS_FIELDS: &[&str] = &["specialists", "specialist"];
pub const ICD_CODE_FIELDS: &[&str] = &["icd_code", "icd10"];

/// Referral used when a signature names no specialist.
pub const DEFAULT_SPECIALIST: &str = "Specialist";

/// Key wrapping the catalog in the enveloped shapes.
const ENVELOPE_KEY: &str = "diseases";

/// Normalize a parsed catalog document.
pub fn normalize_document(document: &Value) -> CatalogResult<Vec<DiseaseSignature>> {
    match document {
        Value::Object(map) => match map.get(ENVELOPE_KEY) {
            Some(Value::Object(inner)) => Ok(from_mapping(inner)),
            Some(Value::Array(inner)) => Ok(from_list(inner)),
            Some(other) => Err(CatalogError::Shape(format!(
                "\"{ENVELOPE_KEY}\" must be an object or array, found {}",
                kind_of(other)
            ))),
            None => Ok(from_mapping(map)),
        },
        Value::Array(list) => Ok(from_list(list)),
        other => Err(CatalogError::Shape(format!(
            "catalog must be an object or array, found {}",
            kind_of(other)
        ))),
    }
}

/// Insert `signature`, replacing an earlier one with the same id at its
/// original position.
pub fn upsert_signature(signatures: &mut Vec<DiseaseSignature>, signature: DiseaseSignature) {
    match signatures.iter_mut().find(|s| s.id == signature.id) {
        Some(existing) => {
            tracing::warn!(disease_id = %signature.id, "Duplicate catalog id, keeping last");
            *existing = signature;
        }
        None => signatures.push(signature),
    }
}

fn from_mapping(map: &Map<String, Value>) -> Vec<DiseaseSignature> {
    let mut signatures = Vec::with_capacity(map.len());
    for (id, entry) in map {
        match entry.as_object() {
            Some(fields) => {
                upsert_signature(&mut signatures, normalize_signature(id.clone(), fields));
            }
            None => tracing::warn!(disease_id = %id, "Skipping non-object catalog entry"),
        }
    }
    signatures
}

fn from_list(list: &[Value]) -> Vec<DiseaseSignature> {
    let mut signatures = Vec::with_capacity(list.len());
    for (index, entry) in list.iter().enumerate() {
        let Some(fields) = entry.as_object() else {
            tracing::warn!(index, "Skipping non-object catalog entry");
            continue;
        };
        let Some(name) = first_str(fields, DISPLAY_NAME_FIELDS) else {
            tracing::warn!(index, "Skipping catalog entry without a name");
            continue;
        };
        upsert_signature(&mut signatures, normalize_signature(slugify(name), fields));
    }
    signatures
}

/// Resolve every canonical field of one signature object.
pub fn normalize_signature(id: String, fields: &Map<String, Value>) -> DiseaseSignature {
    let display_name = first_str(fields, DISPLAY_NAME_FIELDS)
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    let specialists = match string_list(fields, SPECIALISTS_FIELDS) {
        list if list.is_empty() => vec![DEFAULT_SPECIALIST.to_string()],
        list => list,
    };

    DiseaseSignature {
        display_name,
        required_symptoms: symptom_set(fields, REQUIRED_SYMPTOMS_FIELDS),
        min_matches: first_count(fields, MIN_MATCHES_FIELDS).unwrap_or(DEFAULT_MIN_MATCHES),
        time_window_days: first_days(fields, TIME_WINDOW_FIELDS)
            .unwrap_or(DEFAULT_TIME_WINDOW_DAYS),
        min_visits_required: first_count(fields, MIN_VISITS_FIELDS)
            .unwrap_or(DEFAULT_MIN_VISITS),
        min_timespan_days: first_days(fields, MIN_TIMESPAN_FIELDS)
            .unwrap_or(DEFAULT_MIN_TIMESPAN_DAYS),
        confidence_boost_symptoms: symptom_set(fields, BOOST_FIELDS),
        suggested_tests: string_list(fields, SUGGESTED_TESTS_FIELDS),
        specialists,
        icd_code: first_str(fields, ICD_CODE_FIELDS)
            .unwrap_or_default()
            .to_string(),
        id,
    }
}

/// First present value among `names`.
fn first_field<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| fields.get(*name))
}

fn first_str<'a>(fields: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_u64(fields: &Map<String, Value>, names: &[&str]) -> Option<u64> {
    names
        .iter()
        .filter_map(|name| fields.get(*name))
        .find_map(|v| v.as_u64().or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)))
}

/// Count threshold, saturating at `usize::MAX`.
fn first_count(fields: &Map<String, Value>, names: &[&str]) -> Option<usize> {
    first_u64(fields, names).map(|n| usize::try_from(n).unwrap_or(usize::MAX))
}

/// Day threshold, saturating at `i64::MAX`.
fn first_days(fields: &Map<String, Value>, names: &[&str]) -> Option<i64> {
    first_u64(fields, names).map(|n| i64::try_from(n).unwrap_or(i64::MAX))
}

/// A list of strings. Array values are preferred over a bare string under a
/// later alias.
fn string_list(fields: &Map<String, Value>, names: &[&str]) -> Vec<String> {
    let present: Vec<&Value> = names.iter().filter_map(|name| fields.get(*name)).collect();

    if let Some(list) = present.iter().find_map(|v| v.as_array()) {
        return list
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    present
        .iter()
        .find_map(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

/// Lower-cased symptom set from a flat list or a category → list mapping.
fn symptom_set(fields: &Map<String, Value>, names: &[&str]) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    match first_field(fields, names) {
        Some(Value::Array(list)) => collect_labels(list, &mut set),
        Some(Value::Object(categories)) => {
            for list in categories.values().filter_map(Value::as_array) {
                collect_labels(list, &mut set);
            }
        }
        _ => {}
    }
    set
}

fn collect_labels(list: &[Value], set: &mut BTreeSet<String>) {
    set.extend(
        list.iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty()),
    );
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
