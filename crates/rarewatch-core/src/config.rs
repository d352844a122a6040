//! Engine configuration: where reference data lives.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATALOG_PATH: &str = "data/config/rare_diseases_comprehensive.json";
pub const DEFAULT_FALLBACK_CATALOG_PATH: &str = "data/config/disease_watchlist.json";
pub const DEFAULT_SEVERITY_PATH: &str = "data/config/symptom_severity_scores.json";

pub const CATALOG_PATH_ENV: &str = "RAREWATCH_CATALOG_PATH";
pub const FALLBACK_CATALOG_PATH_ENV: &str = "RAREWATCH_FALLBACK_CATALOG_PATH";
pub const SEVERITY_PATH_ENV: &str = "RAREWATCH_SEVERITY_PATH";

/// Paths to the disease catalog and severity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Primary disease catalog
    pub catalog_path: PathBuf,
    /// Catalog used when the primary file does not exist
    pub fallback_catalog_path: PathBuf,
    /// Symptom severity table
    pub severity_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            fallback_catalog_path: PathBuf::from(DEFAULT_FALLBACK_CATALOG_PATH),
            severity_path: PathBuf::from(DEFAULT_SEVERITY_PATH),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any non-empty `RAREWATCH_*` environment variable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_path: env_path(CATALOG_PATH_ENV).unwrap_or(defaults.catalog_path),
            fallback_catalog_path: env_path(FALLBACK_CATALOG_PATH_ENV)
                .unwrap_or(defaults.fallback_catalog_path),
            severity_path: env_path(SEVERITY_PATH_ENV).unwrap_or(defaults.severity_path),
        }
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid engine config {}", path.display()))
    }

    /// The primary catalog path if it exists, else the fallback.
    pub fn resolved_catalog_path(&self) -> &Path {
        if self.catalog_path.exists() {
            &self.catalog_path
        } else {
            tracing::warn!(
                primary = %self.catalog_path.display(),
                fallback = %self.fallback_catalog_path.display(),
                "Primary disease catalog not found, using fallback"
            );
            &self.fallback_catalog_path
        }
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.catalog_path.ends_with("rare_diseases_comprehensive.json"));
        assert!(config.fallback_catalog_path.ends_with("disease_watchlist.json"));
        assert!(config.severity_path.ends_with("symptom_severity_scores.json"));
    }

    #[test]
    fn test_from_json_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"severity_path": "/tmp/severity.json"}}"#).unwrap();

        let config = EngineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.severity_path, PathBuf::from("/tmp/severity.json"));
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = EngineConfig::from_json_file("/nonexistent/rarewatch.json").unwrap_err();
        assert!(err.to_string().contains("failed to read engine config"));
    }

    #[test]
    fn test_resolved_catalog_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("watchlist.json");
        std::fs::write(&fallback, "[]").unwrap();

        let mut config = EngineConfig {
            catalog_path: dir.path().join("missing.json"),
            fallback_catalog_path: fallback.clone(),
            severity_path: dir.path().join("severity.json"),
        };
        assert_eq!(config.resolved_catalog_path(), fallback.as_path());

        config.catalog_path = fallback.clone();
        assert_eq!(config.resolved_catalog_path(), fallback.as_path());
    }
}
