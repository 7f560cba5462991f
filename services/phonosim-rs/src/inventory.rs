//! Segment inventory and feature-matrix ingestion.
//!
//! The feature matrix is a comma-separated table: the header names the
//! segments, every following row starts with a feature name and carries one
//! `+`/`-`/`0` cell per segment.

use std::path::Path;

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::error::{PhonosimError, Result};
use crate::types::{FeatureValue, Segment};

/// Largest feature count accepted; enumeration visits 3^F combinations.
pub const MAX_FEATURES: usize = 20;

/// Immutable snapshot of a language's segments and their feature values
#[derive(Debug, Clone)]
pub struct FeatureInventory {
    features: Vec<String>,
    segments: Vec<Segment>,
    index: AHashMap<String, usize>,
}

impl FeatureInventory {
    /// Build an inventory from already-parsed segments.
    pub fn new(features: Vec<String>, segments: Vec<Segment>) -> Result<Self> {
        if features.len() > MAX_FEATURES {
            return Err(PhonosimError::TooManyFeatures {
                count: features.len(),
                max: MAX_FEATURES,
            });
        }

        let mut index = AHashMap::with_capacity(segments.len());
        for (idx, segment) in segments.iter().enumerate() {
            if segment.features.len() != features.len() {
                return Err(PhonosimError::Inventory {
                    reason: format!(
                        "segment {:?} has {} feature values, expected {}",
                        segment.label,
                        segment.features.len(),
                        features.len()
                    ),
                });
            }
            if index.insert(segment.label.clone(), idx).is_some() {
                return Err(PhonosimError::Inventory {
                    reason: format!("duplicate segment {:?}", segment.label),
                });
            }
        }

        Ok(Self {
            features,
            segments,
            index,
        })
    }

    /// Read and parse a feature matrix file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PhonosimError::io(path, e))?;
        let inventory = Self::from_csv_str(&text)?;
        debug!(
            path = %path.display(),
            segments = inventory.segment_count(),
            features = inventory.feature_count(),
            "loaded feature matrix"
        );
        Ok(inventory)
    }

    /// Parse a feature matrix from CSV text
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rows = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (header_line, header) = rows
            .next()
            .ok_or_else(|| PhonosimError::ingestion(1, "missing header row"))?;
        let header = split_row(header);
        let labels: Vec<String> = header.into_iter().skip(1).collect();
        if labels.is_empty() {
            return Err(PhonosimError::ingestion(header_line, "header names no segments"));
        }
        if let Some(empty) = labels.iter().position(|l| l.is_empty()) {
            return Err(PhonosimError::ingestion(
                header_line,
                format!("segment column {} has an empty name", empty + 2),
            ));
        }
        let mut seen = AHashSet::with_capacity(labels.len());
        if let Some(dup) = labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(PhonosimError::ingestion(
                header_line,
                format!("duplicate segment {dup:?}"),
            ));
        }

        let mut features = Vec::new();
        let mut columns: Vec<Vec<FeatureValue>> = vec![Vec::new(); labels.len()];

        for (line, row) in rows {
            let cells = split_row(row);
            if cells.len() != labels.len() + 1 {
                return Err(PhonosimError::ingestion(
                    line,
                    format!(
                        "expected {} cells, found {}",
                        labels.len() + 1,
                        cells.len()
                    ),
                ));
            }

            let mut cells = cells.into_iter();
            features.push(cells.next().unwrap_or_default());
            for ((token, column), label) in cells.zip(columns.iter_mut()).zip(&labels) {
                let value = FeatureValue::from_token(&token).ok_or_else(|| {
                    PhonosimError::ingestion(
                        line,
                        format!("unrecognized value {token:?} for segment {label:?}"),
                    )
                })?;
                column.push(value);
            }
        }

        if features.is_empty() {
            return Err(PhonosimError::ingestion(header_line, "no feature rows"));
        }

        let segments = labels
            .into_iter()
            .zip(columns)
            .map(|(label, values)| Segment::new(label, values))
            .collect();

        Self::new(features, segments)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment identifiers in inventory order
    pub fn labels(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.label.clone()).collect()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn get(&self, label: &str) -> Option<&Segment> {
        self.position(label).map(|idx| &self.segments[idx])
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| cell.trim().trim_matches('"').trim().to_string())
        .collect()
}
