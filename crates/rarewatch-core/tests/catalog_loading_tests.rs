//! Catalog and severity loading from files on disk.

use std::fs;
use std::path::Path;

use rarewatch_core::catalog::{DiseaseCatalog, SeverityTable, DEFAULT_RARITY};
use rarewatch_core::detector::DetectionEngine;
use rarewatch_core::EngineConfig;

const FABRY_LIST: &str = r#"[
    {"name": "Fabry Disease", "symptoms": ["Fatigue", "pain"], "min_symptoms": 2}
]"#;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_flat_list_is_keyed_by_slug() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "watchlist.json", FABRY_LIST);

    let catalog = DiseaseCatalog::from_path(&path).unwrap();
    let fabry = catalog.get("fabry_disease").unwrap();

    assert_eq!(fabry.display_name, "Fabry Disease");
    assert_eq!(
        fabry.required_symptoms.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["fatigue", "pain"]
    );
    assert_eq!(fabry.min_matches, 2);
    assert_eq!(fabry.specialists, vec!["Specialist"]);
}

#[test]
fn test_all_shapes_agree() {
    let entry = r#"{"name": "Pompe Disease", "symptoms": ["muscle weakness", "breathing difficulty"]}"#;
    let documents = [
        format!(r#"{{"pompe_disease": {entry}}}"#),
        format!("[{entry}]"),
        format!(r#"{{"diseases": {{"pompe_disease": {entry}}}}}"#),
        format!(r#"{{"diseases": [{entry}]}}"#),
    ];

    let dir = tempfile::tempdir().unwrap();
    let catalogs: Vec<DiseaseCatalog> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let path = write(dir.path(), &format!("catalog_{i}.json"), doc);
            DiseaseCatalog::from_path(path).unwrap()
        })
        .collect();

    for (i, catalog) in catalogs.iter().enumerate() {
        assert_eq!(catalog.len(), 1, "Shape {}: size mismatch", i);
        assert_eq!(catalog, &catalogs[0], "Shape {}: differs from bare mapping", i);
    }
}

#[test]
fn test_missing_catalog_loads_empty_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let (catalog, diagnostic) = DiseaseCatalog::load_or_empty(&missing);

    assert!(catalog.is_empty());
    let diagnostic = diagnostic.unwrap();
    assert!(diagnostic.starts_with("disease catalog "));
    assert!(diagnostic.contains("nope.json"));
}

#[test]
fn test_scalar_catalog_is_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "scalar.json", "42");

    let (catalog, diagnostic) = DiseaseCatalog::load_or_empty(&path);
    assert!(catalog.is_empty());
    assert!(diagnostic.is_some());
}

#[test]
fn test_engine_uses_fallback_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = write(dir.path(), "watchlist.json", FABRY_LIST);
    let severity = write(
        dir.path(),
        "severity.json",
        r#"{"fatigue": {"rarity_score": 0.2}, "pain": {"rarity_score": 0.4}}"#,
    );

    let config = EngineConfig {
        catalog_path: dir.path().join("comprehensive.json"),
        fallback_catalog_path: fallback,
        severity_path: severity,
    };
    let engine = DetectionEngine::from_config(&config);

    assert!(engine.load_diagnostics().is_empty());
    assert_eq!(engine.catalog().len(), 1);
    assert!(engine.catalog().get("fabry_disease").is_some());
    assert_eq!(engine.severity().rarity("pain"), 0.4);
}

#[test]
fn test_engine_with_nothing_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        catalog_path: dir.path().join("a.json"),
        fallback_catalog_path: dir.path().join("b.json"),
        severity_path: dir.path().join("c.json"),
    };
    let engine = DetectionEngine::from_config(&config);

    assert!(engine.catalog().is_empty());
    assert!(engine.severity().is_empty());
    assert_eq!(engine.load_diagnostics().len(), 2);
    assert_eq!(engine.severity().rarity("anything"), DEFAULT_RARITY);
}

#[test]
fn test_severity_file_skips_bad_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "severity.json",
        r#"{
            "Angiokeratoma": {"rarity_score": 0.95},
            "broken": "high",
            "too_high": {"rarity_score": 4.0}
        }"#,
    );

    let table = SeverityTable::from_path(&path).unwrap();

    assert_eq!(table.get("angiokeratoma"), Some(0.95));
    assert_eq!(table.get("broken"), None);
    assert_eq!(table.get("too_high"), Some(1.0));
}
