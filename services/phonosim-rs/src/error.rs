//! Error taxonomy for the similarity pipeline.

use std::path::PathBuf;

/// Errors raised while building or persisting similarity data.
#[derive(Debug, thiserror::Error)]
pub enum PhonosimError {
    /// The feature matrix could not be parsed. Fatal for the run.
    #[error("malformed feature matrix at line {line}: {reason}")]
    Ingestion { line: usize, reason: String },

    /// Segments handed to the inventory are inconsistent.
    #[error("invalid feature inventory: {reason}")]
    Inventory { reason: String },

    #[error("feature matrix has {count} features; at most {max} are supported")]
    TooManyFeatures { count: usize, max: usize },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("malformed similarity matrix: {reason}")]
    MatrixFormat { reason: String },

    #[error("similarity matrix not found at {}; run matrix construction first", path.display())]
    MatrixNotFound { path: PathBuf },

    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    #[error("natural class enumeration interrupted after {enumerated} of {total} combinations")]
    Interrupted { enumerated: usize, total: usize },
}

impl PhonosimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn ingestion(line: usize, reason: impl Into<String>) -> Self {
        Self::Ingestion {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PhonosimError>;
