use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    snapshot::{DocumentFilter, DEFAULT_EXTENSIONS},
    transform::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE},
};

/// Default application configuration file name inside the data
/// directory.
pub const APP_CONFIG_FILE: &str = "app_config.json";

/// Application configuration, persisted as JSON.
///
/// Every field has a default, so a partial or missing file still
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory watched for source documents.
    pub documents_dir: PathBuf,
    /// Path of the sync manifest.
    pub manifest_file: PathBuf,
    /// Extension allow-list for document discovery.
    pub extensions: Vec<String>,
    /// Chunk size in characters for the ingestion transform.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("data"),
            manifest_file: PathBuf::from("manifest.json"),
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl AppConfig {
    /// Load the configuration, falling back to defaults when the file
    /// is absent or malformed. Never fails.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "could not read configuration, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "malformed configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Write the configuration back as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply a single field update addressed by its CLI key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "documents-dir" => self.documents_dir = PathBuf::from(value),
            "manifest-file" => self.manifest_file = PathBuf::from(value),
            "extensions" => {
                let extensions: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if extensions.is_empty() {
                    return Err(Error::Config(
                        "extensions cannot be empty".into(),
                    ));
                }
                self.extensions = extensions;
            }
            "chunk-size" => {
                self.chunk_size = value.parse().map_err(|_| {
                    Error::Config(format!("not a valid chunk size: {value}"))
                })?;
            }
            "chunk-overlap" => {
                self.chunk_overlap = value.parse().map_err(|_| {
                    Error::Config(format!("not a valid chunk overlap: {value}"))
                })?;
            }
            other => {
                return Err(Error::Config(format!(
                    "unknown configuration key: {other}"
                )));
            }
        }
        Ok(())
    }

    pub fn document_filter(&self) -> DocumentFilter {
        DocumentFilter::new(&self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&tmp.path().join("nope.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("app_config.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(AppConfig::load(&path), AppConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("app_config.json");
        std::fs::write(&path, r#"{"documents_dir": "corpus"}"#).unwrap();

        let config = AppConfig::load(&path);
        assert_eq!(config.documents_dir, PathBuf::from("corpus"));
        assert_eq!(config.manifest_file, PathBuf::from("manifest.json"));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("app_config.json");

        let mut config = AppConfig::default();
        config.set("documents-dir", "corpus").unwrap();
        config.set("chunk-size", "2048").unwrap();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path);
        assert_eq!(loaded, config);
        assert_eq!(loaded.documents_dir, PathBuf::from("corpus"));
        assert_eq!(loaded.chunk_size, 2048);
    }

    #[test]
    fn set_parses_extension_lists() {
        let mut config = AppConfig::default();
        config.set("extensions", "md, .rst,txt").unwrap();
        assert_eq!(config.extensions, vec!["md", "rst", "txt"]);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.set("colour", "blue").is_err());
        assert!(config.set("chunk-size", "many").is_err());
        assert!(config.set("extensions", " , ").is_err());
        // A failed update leaves the configuration untouched.
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn filter_reflects_configured_extensions() {
        let config = AppConfig {
            extensions: vec!["pdf".to_string()],
            ..AppConfig::default()
        };
        let filter = config.document_filter();
        assert!(filter.matches("report.pdf"));
        assert!(!filter.matches("notes.md"));
    }
}
