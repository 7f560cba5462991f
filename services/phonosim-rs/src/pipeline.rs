//! End-to-end run: load → natural classes (cached) → score → persist.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use rustc_hash::FxHashSet;
use tracing::{info, warn};

use crate::cache::NaturalClassCache;
use crate::classes::ClassMap;
use crate::config::PipelineConfig;
use crate::dedup::deduplicate;
use crate::enumerate::NaturalClassEnumerator;
use crate::error::Result;
use crate::inventory::FeatureInventory;
use crate::matrix::SimilarityMatrix;
use crate::types::EnumerationProgress;

/// Outcome of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub language: String,
    pub segments: usize,
    pub features: usize,
    pub classes: usize,
    /// True when enumeration was skipped in favor of the cache
    pub from_cache: bool,
    pub classes_path: PathBuf,
    pub matrix_path: PathBuf,
    pub matrix: SimilarityMatrix,
}

pub struct Pipeline<'a> {
    config: PipelineConfig,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Abort enumeration once `flag` is set; nothing is persisted then.
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run<F>(&self, on_progress: F) -> Result<PipelineReport>
    where
        F: FnMut(EnumerationProgress),
    {
        let language = &self.config.language;
        let inventory = FeatureInventory::load(&self.config.feature_matrix)?;
        info!(
            language = %language,
            segments = inventory.segment_count(),
            features = inventory.feature_count(),
            "feature matrix loaded"
        );

        let (classes, from_cache) = self.natural_classes(&inventory, on_progress)?;

        let scorer = self.config.method.scorer(&classes);
        let matrix = SimilarityMatrix::build(&inventory.labels(), scorer.as_ref());
        let matrix_path = self.config.layout().matrix_path(language);
        matrix.save(&matrix_path)?;
        info!(
            language = %language,
            method = %self.config.method,
            path = %matrix_path.display(),
            "similarity matrix written"
        );

        Ok(PipelineReport {
            language: language.clone(),
            segments: inventory.segment_count(),
            features: inventory.feature_count(),
            classes: classes.len(),
            from_cache,
            classes_path: self.config.layout().classes_path(language),
            matrix_path,
            matrix,
        })
    }

    /// Deduplicated natural classes, from the cache when present.
    ///
    /// Returns the classes and whether they came from the cache.
    pub fn natural_classes<F>(
        &self,
        inventory: &FeatureInventory,
        on_progress: F,
    ) -> Result<(ClassMap, bool)>
    where
        F: FnMut(EnumerationProgress),
    {
        let language = &self.config.language;
        let cache = NaturalClassCache::new(self.config.layout());

        match cache.load(language) {
            Some(classes) if covers_inventory(&classes, inventory) => {
                info!(language = %language, classes = classes.len(), "reusing cached natural classes");
                return Ok((classes, true));
            }
            Some(_) => warn!(
                language = %language,
                "cached natural classes do not match the feature matrix segments; recomputing"
            ),
            None => {}
        }

        let mut enumerator = NaturalClassEnumerator::new(inventory)
            .with_progress_interval(self.config.progress_interval);
        if let Some(flag) = self.cancel {
            enumerator = enumerator.with_cancel_flag(flag);
        }
        info!(
            language = %language,
            combinations = enumerator.total(),
            "enumerating natural classes"
        );

        let classes = deduplicate(&enumerator.enumerate(on_progress)?);
        let path = cache.store(language, &classes)?;
        info!(
            language = %language,
            classes = classes.len(),
            path = %path.display(),
            "natural classes cached"
        );

        Ok((classes, false))
    }
}

/// A cache is usable only if its members are exactly the inventory's segments
fn covers_inventory(classes: &ClassMap, inventory: &FeatureInventory) -> bool {
    let cached: FxHashSet<&str> = classes
        .iter()
        .flat_map(|c| c.members.iter().map(String::as_str))
        .collect();
    cached.len() == inventory.segment_count()
        && inventory.segments().iter().all(|s| cached.contains(s.label.as_str()))
}
