//! Average adjacent-segment similarity per word.
//!
//! Consumes a finished [`SimilarityMatrix`] and a word list (one word per
//! line, segments separated by whitespace). Each word scores the mean
//! similarity of its adjacent segment pairs.

use std::path::{Path, PathBuf};

use phonosim_core::{OutputLayout, PhonosimError, SimilarityMatrix};
use rayon::prelude::*;
use tracing::debug;

#[cfg(feature = "python")]
mod python;

#[derive(Debug, thiserror::Error)]
pub enum AdjacencyError {
    #[error("similarity matrix not found at {}; run matrix construction first", path.display())]
    MatrixNotFound { path: PathBuf },

    #[error("failed to read word list {}: {source}", path.display())]
    WordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] PhonosimError),
}

pub type Result<T> = std::result::Result<T, AdjacencyError>;

/// Load the persisted matrix for `language` from `output_dir`
pub fn load_matrix(output_dir: &Path, language: &str) -> Result<SimilarityMatrix> {
    let path = OutputLayout::new(output_dir).matrix_path(language);
    SimilarityMatrix::load(&path).map_err(|e| match e {
        PhonosimError::MatrixNotFound { path } => AdjacencyError::MatrixNotFound { path },
        other => AdjacencyError::Core(other),
    })
}

/// Similarity of two segments, `None` when either is missing from the matrix
pub fn similar(matrix: &SimilarityMatrix, a: &str, b: &str) -> Option<f64> {
    matrix.get(a, b)
}

/// Mean similarity over a word's adjacent pairs.
///
/// Pairs that miss the matrix count as zero, and zero contributions are
/// left out of the mean. A word without any remaining pair scores 0.
pub fn word_score(matrix: &SimilarityMatrix, word: &str) -> f64 {
    let segments: Vec<&str> = word.split_whitespace().collect();
    let scores: Vec<f64> = segments
        .windows(2)
        .map(|pair| similar(matrix, pair[0], pair[1]).unwrap_or(0.0))
        .filter(|&sim| sim != 0.0)
        .collect();

    if scores.is_empty() {
        if segments.len() > 1 {
            debug!(word, "no scorable adjacent pairs");
        }
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Score every word, preserving input order
pub fn calc<S: AsRef<str> + Sync>(matrix: &SimilarityMatrix, words: &[S]) -> Vec<f64> {
    words
        .par_iter()
        .map(|word| word_score(matrix, word.as_ref()))
        .collect()
}

/// Read a word list: one word per line
pub fn read_word_list(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|source| AdjacencyError::WordList {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Score every word in the word-list file at `path`
pub fn calc_file(matrix: &SimilarityMatrix, path: &Path) -> Result<Vec<f64>> {
    let words = read_word_list(path)?;
    debug!(path = %path.display(), words = words.len(), "scoring word list");
    Ok(calc(matrix, &words))
}
