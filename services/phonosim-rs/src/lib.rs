//! Phonosim Core: segment similarity from shared natural classes.
//!
//! Pipeline stages:
//! - Feature matrix ingestion ([`FeatureInventory`])
//! - Natural class enumeration over all ternary feature combinations
//! - Deduplication of combinations selecting identical segment sets
//! - Pairwise similarity (Frisch et al. 2004) and the full matrix
//! - Per-language caching of the natural classes
//!
//! Python bindings via PyO3 are available behind the `python` feature.

pub mod cache;
pub mod classes;
pub mod config;
pub mod dedup;
pub mod enumerate;
pub mod error;
pub mod inventory;
pub mod matrix;
pub mod persist;
pub mod pipeline;
pub mod similarity;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use cache::NaturalClassCache;
pub use classes::ClassMap;
pub use config::PipelineConfig;
pub use dedup::deduplicate;
pub use enumerate::{FeatureCombinations, NaturalClassEnumerator};
pub use error::{PhonosimError, Result};
pub use inventory::FeatureInventory;
pub use matrix::SimilarityMatrix;
pub use persist::{write_atomic, OutputLayout};
pub use pipeline::{Pipeline, PipelineReport};
pub use similarity::{Scorer, SharedClassScorer, SimilarityMethod};
pub use types::{EnumerationProgress, FeatureValue, FeatureVector, NaturalClass, Segment, Valuation};
