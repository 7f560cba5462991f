//! Pipeline configuration.
//!
//! ```toml
//! language = "maltese"
//! feature_matrix = "features.csv"
//! output_dir = "output"
//! method = "frisch"
//! progress_interval = 1000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::enumerate::DEFAULT_PROGRESS_INTERVAL;
use crate::error::{PhonosimError, Result};
use crate::persist::OutputLayout;
use crate::similarity::SimilarityMethod;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Language name; keys the natural class cache and output file names.
    pub language: String,
    /// Path to the segment/feature CSV.
    pub feature_matrix: PathBuf,
    pub output_dir: PathBuf,
    pub method: SimilarityMethod,
    /// Combinations between enumeration progress reports.
    pub progress_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: String::new(),
            feature_matrix: PathBuf::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            method: SimilarityMethod::default(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PipelineConfig {
    pub fn new(language: impl Into<String>, feature_matrix: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            feature_matrix: feature_matrix.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PhonosimError::Config {
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PhonosimError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output_dir)
    }

    pub fn validate(&self) -> Result<()> {
        validate_language(&self.language)?;
        if self.feature_matrix.as_os_str().is_empty() {
            return Err(PhonosimError::Config {
                reason: "feature_matrix path is required".to_string(),
            });
        }
        if self.progress_interval == 0 {
            return Err(PhonosimError::Config {
                reason: "progress_interval must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Language names become file names, so they must be a single path component.
pub fn validate_language(language: &str) -> Result<()> {
    if language.trim().is_empty() {
        return Err(PhonosimError::Config {
            reason: "language name is required".to_string(),
        });
    }
    if language.contains(['/', '\\']) || language == "." || language == ".." {
        return Err(PhonosimError::Config {
            reason: format!("language name {language:?} must not contain path separators"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = PipelineConfig::from_toml_str(
            "language = \"maltese\"\nfeature_matrix = \"features.csv\"\n",
        )
        .unwrap();
        assert_eq!(config.language, "maltese");
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.method, SimilarityMethod::Frisch);
        assert_eq!(config.progress_interval, DEFAULT_PROGRESS_INTERVAL);
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = PipelineConfig::from_toml_str("language = \"x\"\nmethod = \"cosine\"\n");
        assert!(matches!(err, Err(PhonosimError::Config { .. })));
    }

    #[test]
    fn test_validation() {
        assert!(PipelineConfig::new("", "f.csv").validate().is_err());
        assert!(PipelineConfig::new("../etc", "f.csv").validate().is_err());
        assert!(PipelineConfig::new("maltese", "").validate().is_err());

        let mut config = PipelineConfig::new("maltese", "f.csv");
        config.progress_interval = 0;
        assert!(config.validate().is_err());
    }
}
