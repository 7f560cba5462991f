//! Pairwise segment similarity over natural-class membership.
//!
//! The shared-classes ratio (Frisch, Pierrehumbert & Broe 2004):
//!
//! ```text
//! similarity(a, b) = shared / (shared + not_shared)
//! ```
//!
//! where `shared` counts classes containing both segments and `not_shared`
//! counts classes containing exactly one of them.

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classes::ClassMap;
use crate::error::PhonosimError;

/// Similarity between two segments, in `[0, 1]`
pub trait Scorer: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Available similarity definitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    /// Shared natural classes ratio
    #[default]
    Frisch,
}

impl SimilarityMethod {
    /// Build the scorer for this method over a deduplicated class set
    pub fn scorer(self, classes: &ClassMap) -> Box<dyn Scorer> {
        match self {
            SimilarityMethod::Frisch => Box::new(SharedClassScorer::new(classes)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SimilarityMethod::Frisch => "frisch",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimilarityMethod {
    type Err = PhonosimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frisch" => Ok(SimilarityMethod::Frisch),
            other => Err(PhonosimError::Config {
                reason: format!("unknown similarity method {other:?}"),
            }),
        }
    }
}

/// Frisch-style scorer with a precomputed segment → class index
pub struct SharedClassScorer {
    membership: AHashMap<String, FxHashSet<usize>>,
}

impl SharedClassScorer {
    pub fn new(classes: &ClassMap) -> Self {
        // Classes are identified by their member list, not by vector.
        let mut ids: AHashMap<&[String], usize> = AHashMap::new();
        let mut membership: AHashMap<String, FxHashSet<usize>> = AHashMap::new();

        for class in classes {
            let next = ids.len();
            let id = *ids.entry(class.members.as_slice()).or_insert(next);
            for member in &class.members {
                membership.entry(member.clone()).or_default().insert(id);
            }
        }

        debug!(
            classes = ids.len(),
            segments = membership.len(),
            "indexed natural class membership"
        );
        Self { membership }
    }

    /// Shared and not-shared class counts for a pair
    pub fn overlap(&self, a: &str, b: &str) -> (usize, usize) {
        match (self.membership.get(a), self.membership.get(b)) {
            (Some(a_ids), Some(b_ids)) => {
                let shared = a_ids.intersection(b_ids).count();
                (shared, a_ids.len() + b_ids.len() - 2 * shared)
            }
            (Some(ids), None) | (None, Some(ids)) => (0, ids.len()),
            (None, None) => (0, 0),
        }
    }
}

impl Scorer for SharedClassScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        let (shared, not_shared) = self.overlap(a, b);
        let total = shared + not_shared;
        if total == 0 {
            debug!(a, b, "no natural classes contain either segment");
            return 0.0;
        }
        shared as f64 / total as f64
    }
}
