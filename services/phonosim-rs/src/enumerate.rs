//! Natural class enumeration.
//!
//! Visits every ternary feature combination in Cartesian-product order
//! (last position fastest, `+` then `-` then wildcard) and records the
//! inventory segments satisfying each one. Combinations matching nothing
//! are dropped.
//!
//! Matching works over segment indices into the immutable inventory: the
//! candidate list starts as the whole inventory and is narrowed once per
//! contiguous run of specified positions.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::classes::ClassMap;
use crate::error::{PhonosimError, Result};
use crate::inventory::FeatureInventory;
use crate::types::{EnumerationProgress, FeatureVector, NaturalClass, Valuation};

/// Default number of combinations between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Number of combinations for `width` features
pub fn combination_count(width: usize) -> usize {
    3usize.pow(width as u32)
}

/// Lazy, restartable sequence of all 3^F feature vectors
#[derive(Debug, Clone)]
pub struct FeatureCombinations {
    digits: Vec<usize>,
    remaining: usize,
}

impl FeatureCombinations {
    pub fn new(width: usize) -> Self {
        Self {
            digits: vec![0; width],
            remaining: combination_count(width),
        }
    }

    fn advance(&mut self) {
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < Valuation::ORDER.len() {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for FeatureCombinations {
    type Item = FeatureVector;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let vector = FeatureVector::new(self.digits.iter().map(|&d| Valuation::ORDER[d]).collect());
        self.remaining -= 1;
        self.advance();
        Some(vector)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FeatureCombinations {}

/// Generates every combination and the segments matching it
pub struct NaturalClassEnumerator<'a> {
    inventory: &'a FeatureInventory,
    progress_interval: usize,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> NaturalClassEnumerator<'a> {
    pub fn new(inventory: &'a FeatureInventory) -> Self {
        Self {
            inventory,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cancel: None,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Stop early (with [`PhonosimError::Interrupted`]) once `flag` is set
    pub fn with_cancel_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn total(&self) -> usize {
        combination_count(self.inventory.feature_count())
    }

    pub fn combinations(&self) -> FeatureCombinations {
        FeatureCombinations::new(self.inventory.feature_count())
    }

    /// Indices of the inventory segments satisfying `vector`
    pub fn matching(&self, vector: &FeatureVector) -> Vec<usize> {
        let segments = self.inventory.segments();

        if vector.is_fully_specified() {
            return segments
                .iter()
                .enumerate()
                .filter(|(_, seg)| seg.matches_run(vector, 0..vector.len()))
                .map(|(idx, _)| idx)
                .collect();
        }

        let mut candidates: Vec<usize> = (0..segments.len()).collect();
        for run in vector.specified_runs() {
            candidates.retain(|&idx| segments[idx].matches_run(vector, run.clone()));
            if candidates.is_empty() {
                break;
            }
        }
        candidates
    }

    /// Enumerate all combinations, reporting progress along the way.
    ///
    /// The callback receives a snapshot every `progress_interval`
    /// combinations, and on completion unless the last one just fired.
    pub fn enumerate<F>(&self, mut on_progress: F) -> Result<ClassMap>
    where
        F: FnMut(EnumerationProgress),
    {
        let total = self.total();
        let mut classes = ClassMap::new();

        for (enumerated, vector) in self.combinations().enumerate() {
            if self.is_cancelled() {
                return Err(PhonosimError::Interrupted { enumerated, total });
            }

            let matches = self.matching(&vector);
            if !matches.is_empty() {
                let members = matches
                    .into_iter()
                    .map(|idx| self.inventory.segments()[idx].label.clone())
                    .collect();
                classes.push(NaturalClass::new(vector, members));
            }

            if (enumerated + 1) % self.progress_interval == 0 {
                on_progress(EnumerationProgress {
                    enumerated: enumerated + 1,
                    total,
                    found: classes.len(),
                });
            }
        }

        if total % self.progress_interval != 0 {
            on_progress(EnumerationProgress {
                enumerated: total,
                total,
                found: classes.len(),
            });
        }
        debug!(total, found = classes.len(), "enumeration complete");

        Ok(classes)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureValue, Segment};

    fn inventory(rows: &[(&str, Vec<FeatureValue>)]) -> FeatureInventory {
        let width = rows.first().map(|(_, f)| f.len()).unwrap_or(0);
        let features = (0..width).map(|i| format!("f{i}")).collect();
        let segments = rows
            .iter()
            .map(|(label, values)| Segment::new(label.to_string(), values.clone()))
            .collect();
        FeatureInventory::new(features, segments).unwrap()
    }

    use FeatureValue::{Negative as N, Positive as P, Unspecified as U};

    fn labels(inv: &FeatureInventory, indices: Vec<usize>) -> Vec<String> {
        indices
            .into_iter()
            .map(|i| inv.segments()[i].label.clone())
            .collect()
    }

    #[test]
    fn test_combination_count() {
        assert_eq!(FeatureCombinations::new(2).count(), 9);
        assert_eq!(FeatureCombinations::new(0).count(), 1);
        assert_eq!(FeatureCombinations::new(5).len(), 243);
    }

    #[test]
    fn test_traversal_order() {
        let keys: Vec<String> = FeatureCombinations::new(2).map(|v| v.to_string()).collect();
        assert_eq!(
            keys,
            [
                "[+, +]", "[+, -]", "[+, 0]", "[-, +]", "[-, -]", "[-, 0]", "[0, +]", "[0, -]",
                "[0, 0]"
            ]
        );
    }

    #[test]
    fn test_combinations_restart() {
        let inv = inventory(&[("p", vec![P, N])]);
        let enumerator = NaturalClassEnumerator::new(&inv);
        let first: Vec<_> = enumerator.combinations().collect();
        let second: Vec<_> = enumerator.combinations().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_match_with_duplicates() {
        let inv = inventory(&[("p", vec![P, N]), ("b", vec![P, N])]);
        let enumerator = NaturalClassEnumerator::new(&inv);

        let both = enumerator.matching(&"[+, -]".parse().unwrap());
        assert_eq!(labels(&inv, both), ["p", "b"]);
        assert!(enumerator.matching(&"[-, +]".parse().unwrap()).is_empty());

        let classes = enumerator.enumerate(|_| {}).unwrap();
        assert!(classes.members(&"[-, +]".parse().unwrap()).is_none());
        assert_eq!(
            classes.members(&"[+, -]".parse().unwrap()).unwrap(),
            ["p", "b"]
        );
    }

    #[test]
    fn test_wildcard_match() {
        let inv = inventory(&[("p", vec![P, N, P]), ("b", vec![P, P, P]), ("t", vec![N, N, P])]);
        let enumerator = NaturalClassEnumerator::new(&inv);
        let found = enumerator.matching(&"[+, 0, +]".parse().unwrap());
        assert_eq!(labels(&inv, found), ["p", "b"]);
    }

    #[test]
    fn test_all_wildcard_matches_everything() {
        let inv = inventory(&[("p", vec![P, U]), ("h", vec![U, U])]);
        let enumerator = NaturalClassEnumerator::new(&inv);
        let found = enumerator.matching(&"[0, 0]".parse().unwrap());
        assert_eq!(labels(&inv, found), ["p", "h"]);
    }

    #[test]
    fn test_unspecified_values_need_wildcards() {
        let inv = inventory(&[("h", vec![U, P])]);
        let classes = NaturalClassEnumerator::new(&inv).enumerate(|_| {}).unwrap();
        let keys: Vec<String> = classes.iter().map(|c| c.vector.to_string()).collect();
        assert_eq!(keys, ["[0, +]", "[0, 0]"]);
    }

    #[test]
    fn test_progress_reports() {
        let inv = inventory(&[("p", vec![P, N, P])]);
        let mut reports = Vec::new();
        NaturalClassEnumerator::new(&inv)
            .with_progress_interval(10)
            .enumerate(|p| reports.push(p))
            .unwrap();

        let enumerated: Vec<usize> = reports.iter().map(|p| p.enumerated).collect();
        assert_eq!(enumerated, [10, 20, 27]);
        assert!(reports.iter().all(|p| p.total == 27));
        assert_eq!(reports.last().unwrap().found, 8);
    }

    #[test]
    fn test_completion_reported_once() {
        let inv = inventory(&[("p", vec![P, N])]);
        for interval in [1, 3, 9] {
            let mut enumerated = Vec::new();
            NaturalClassEnumerator::new(&inv)
                .with_progress_interval(interval)
                .enumerate(|p| enumerated.push(p.enumerated))
                .unwrap();
            assert_eq!(enumerated.len(), 9 / interval);
            assert_eq!(enumerated.last(), Some(&9));
        }
    }

    #[test]
    fn test_cancellation() {
        let inv = inventory(&[("p", vec![P, N])]);
        let flag = AtomicBool::new(true);
        let err = NaturalClassEnumerator::new(&inv)
            .with_cancel_flag(&flag)
            .enumerate(|_| {})
            .unwrap_err();
        assert!(matches!(
            err,
            PhonosimError::Interrupted {
                enumerated: 0,
                total: 9
            }
        ));
    }
}
