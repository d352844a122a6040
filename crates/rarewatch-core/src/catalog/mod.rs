//! Disease catalog and symptom severity table.
//!
//! Both are loaded once and treated as immutable. Strict loaders return a
//! [`CatalogError`]; the `load_or_empty` variants log the failure and hand back
//! an empty structure with the error text as a diagnostic, so a missing or
//! corrupt file never prevents the engine from starting.

mod normalize;
mod severity;

pub use normalize::*;
pub use severity::*;

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::DiseaseSignature;

/// Catalog and severity loading errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported document shape: {0}")]
    Shape(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Normalized disease signatures in document order, unique by disease id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiseaseCatalog {
    signatures: Vec<DiseaseSignature>,
}

impl DiseaseCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-normalized signatures, keeping their order. A
    /// repeated id replaces the earlier signature.
    pub fn from_signatures<I>(signatures: I) -> Self
    where
        I: IntoIterator<Item = DiseaseSignature>,
    {
        let mut catalog = Self::empty();
        for signature in signatures {
            upsert_signature(&mut catalog.signatures, signature);
        }
        catalog
    }

    /// Parse and normalize a catalog document in any accepted shape.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self {
            signatures: normalize_document(&document)?,
        })
    }

    /// Read and normalize a catalog file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Load a catalog file, falling back to an empty catalog on any failure.
    ///
    /// The second element carries the failure reason, if there was one.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> (Self, Option<String>) {
        let path = path.as_ref();
        match Self::from_path(path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.display(),
                    diseases = catalog.len(),
                    "Loaded disease catalog"
                );
                (catalog, None)
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to load disease catalog");
                (
                    Self::empty(),
                    Some(format!("disease catalog {}: {e}", path.display())),
                )
            }
        }
    }

    /// Look up one signature.
    pub fn get(&self, disease_id: &str) -> Option<&DiseaseSignature> {
        self.signatures.iter().find(|s| s.id == disease_id)
    }

    /// Signatures in catalog order.
    pub fn signatures(&self) -> impl Iterator<Item = &DiseaseSignature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str_bare_mapping() {
        let json = r#"{
            "gaucher_disease": {
                "name": "Gaucher Disease",
                "symptoms": ["bone pain", "fatigue", "bruising"],
                "time_window_days": 730
            }
        }"#;
        let catalog = DiseaseCatalog::from_json_str(json).unwrap();

        let gaucher = catalog.get("gaucher_disease").unwrap();
        assert_eq!(gaucher.time_window_days, 730);
        assert_eq!(gaucher.min_visits_required, 2);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            DiseaseCatalog::from_json_str("{not json"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_empty_with_diagnostic() {
        let (catalog, diagnostic) =
            DiseaseCatalog::load_or_empty("/nonexistent/rarewatch/catalog.json");

        assert!(catalog.is_empty());
        assert!(diagnostic.unwrap().contains("disease catalog"));
    }
}
