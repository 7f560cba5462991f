//! Labeled square similarity matrix.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Write as _;
use std::path::Path;

use ahash::AHashMap;
use ndarray::{Array2, ArrayView1};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::error::{PhonosimError, Result};
use crate::persist::write_atomic;
use crate::similarity::Scorer;

/// Segment × segment similarity table, rows and columns in inventory order
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    labels: Vec<String>,
    index: AHashMap<String, usize>,
    values: Array2<f64>,
}

impl SimilarityMatrix {
    /// Score every ordered pair of `labels`, self-pairs included.
    ///
    /// Rows are scored in parallel; the scorer is pure, so the result does
    /// not depend on scheduling.
    pub fn build(labels: &[String], scorer: &dyn Scorer) -> Self {
        let n = labels.len();
        let rows: Vec<Vec<f64>> = labels
            .par_iter()
            .map(|a| labels.iter().map(|b| scorer.score(a, b)).collect())
            .collect();

        let mut values = Array2::<f64>::zeros((n, n));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, sim) in row.into_iter().enumerate() {
                values[[i, j]] = sim;
            }
        }

        Self {
            index: index_of(labels),
            labels: labels.to_vec(),
            values,
        }
    }

    /// Wrap precomputed values; `values` must be `labels.len()` square.
    pub fn from_parts(labels: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let n = labels.len();
        if values.dim() != (n, n) {
            return Err(PhonosimError::MatrixFormat {
                reason: format!("expected {n}x{n} values, found {:?}", values.dim()),
            });
        }
        let index = index_of(&labels);
        if index.len() != n {
            return Err(PhonosimError::MatrixFormat {
                reason: "duplicate segment labels".to_string(),
            });
        }
        Ok(Self {
            labels,
            index,
            values,
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Similarity of a pair, `None` if either segment is unknown
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = *self.index.get(a)?;
        let j = *self.index.get(b)?;
        Some(self.values[[i, j]])
    }

    pub fn row(&self, segment: &str) -> Option<ArrayView1<'_, f64>> {
        let i = *self.index.get(segment)?;
        Some(self.values.row(i))
    }

    /// The `k` segments most similar to `segment`, excluding itself.
    ///
    /// Ties keep inventory order.
    pub fn nearest(&self, segment: &str, k: usize) -> Vec<(String, f64)> {
        let idx = match self.index.get(segment) {
            Some(&i) => i,
            None => return vec![],
        };

        let mut heap: BinaryHeap<(OrderedFloat<f64>, Reverse<usize>)> = self
            .values
            .row(idx)
            .iter()
            .enumerate()
            .filter(|(col, _)| *col != idx)
            .map(|(col, &sim)| (OrderedFloat(sim), Reverse(col)))
            .collect();

        let mut results = Vec::with_capacity(k.min(heap.len()));
        while results.len() < k {
            match heap.pop() {
                Some((score, Reverse(col))) => results.push((self.labels[col].clone(), score.0)),
                None => break,
            }
        }
        results
    }

    /// Render as CSV: a header of labels, then one labeled row per segment
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        for label in &self.labels {
            out.push(',');
            out.push_str(label);
        }
        out.push('\n');

        for (label, row) in self.labels.iter().zip(self.values.outer_iter()) {
            out.push_str(label);
            for value in row.iter() {
                let _ = write!(out, ",{value:?}");
            }
            out.push('\n');
        }
        out
    }

    /// Parse the CSV produced by [`SimilarityMatrix::to_csv_string`].
    ///
    /// Rows may appear in any order; they are placed by label.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header = lines.next().ok_or_else(|| PhonosimError::MatrixFormat {
            reason: "empty matrix file".to_string(),
        })?;
        let labels: Vec<String> = header
            .split(',')
            .skip(1)
            .map(|cell| cell.trim().trim_matches('"').to_string())
            .collect();
        let index = index_of(&labels);
        if index.len() != labels.len() {
            return Err(PhonosimError::MatrixFormat {
                reason: "duplicate column labels".to_string(),
            });
        }

        let n = labels.len();
        let mut values = Array2::<f64>::zeros((n, n));
        let mut filled = vec![false; n];

        for line in lines {
            let mut cells = line.split(',').map(|c| c.trim().trim_matches('"'));
            let label = cells.next().unwrap_or_default();
            let i = *index.get(label).ok_or_else(|| PhonosimError::MatrixFormat {
                reason: format!("row {label:?} has no matching column"),
            })?;
            if std::mem::replace(&mut filled[i], true) {
                return Err(PhonosimError::MatrixFormat {
                    reason: format!("row {label:?} appears twice"),
                });
            }

            let row: Vec<f64> = cells
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| PhonosimError::MatrixFormat {
                        reason: format!("row {label:?}: {cell:?} is not a number"),
                    })
                })
                .collect::<Result<_>>()?;
            if row.len() != n {
                return Err(PhonosimError::MatrixFormat {
                    reason: format!("row {label:?} has {} values, expected {n}", row.len()),
                });
            }
            for (j, sim) in row.into_iter().enumerate() {
                values[[i, j]] = sim;
            }
        }

        if let Some(missing) = filled.iter().position(|f| !f) {
            return Err(PhonosimError::MatrixFormat {
                reason: format!("missing row for {:?}", labels[missing]),
            });
        }

        Ok(Self {
            labels,
            index,
            values,
        })
    }

    /// Load a matrix file, reporting a missing file as `MatrixNotFound`
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PhonosimError::MatrixNotFound {
                path: path.to_path_buf(),
            },
            _ => PhonosimError::io(path, e),
        })?;
        Self::from_csv_str(&text)
    }

    /// Persist atomically, replacing any previous file
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_csv_string().as_bytes())
    }
}

impl PartialEq for SimilarityMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels && self.values == other.values
    }
}

fn index_of(labels: &[String]) -> AHashMap<String, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.clone(), idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Fixed;

    impl Scorer for Fixed {
        fn score(&self, a: &str, b: &str) -> f64 {
            if a == b {
                1.0
            } else if (a, b) == ("p", "b") || (a, b) == ("b", "p") {
                0.75
            } else {
                0.25
            }
        }
    }

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_visits_every_pair() {
        let matrix = SimilarityMatrix::build(&labels(&["p", "b", "t"]), &Fixed);
        assert_eq!(matrix.values().dim(), (3, 3));
        assert_eq!(matrix.get("p", "p"), Some(1.0));
        assert_eq!(matrix.get("b", "p"), Some(0.75));
        assert_eq!(matrix.get("t", "b"), Some(0.25));
        assert_eq!(matrix.get("p", "x"), None);
    }

    #[test]
    fn test_nearest() {
        let matrix = SimilarityMatrix::build(&labels(&["p", "b", "t", "k"]), &Fixed);
        let nearest = matrix.nearest("p", 2);
        assert_eq!(
            nearest,
            vec![("b".to_string(), 0.75), ("t".to_string(), 0.25)]
        );
        assert_eq!(matrix.nearest("p", 10).len(), 3);
        assert!(matrix.nearest("x", 2).is_empty());
    }

    #[test]
    fn test_csv_round_trip() {
        let matrix = SimilarityMatrix::from_parts(
            labels(&["p", "b"]),
            array![[1.0, 1.0 / 3.0], [1.0 / 3.0, 1.0]],
        )
        .unwrap();
        let csv = matrix.to_csv_string();
        assert!(csv.starts_with(",p,b\np,1.0,0.3333333333333333\n"));
        assert_eq!(SimilarityMatrix::from_csv_str(&csv).unwrap(), matrix);
    }

    #[test]
    fn test_csv_rows_placed_by_label() {
        let matrix = SimilarityMatrix::from_csv_str(",p,t\nt,0.6,1.0\np,1.0,0.6\n").unwrap();
        assert_eq!(matrix.get("p", "t"), Some(0.6));
        assert_eq!(matrix.row("t").unwrap().to_vec(), vec![0.6, 1.0]);
    }

    #[test]
    fn test_csv_errors() {
        assert!(SimilarityMatrix::from_csv_str("").is_err());
        assert!(SimilarityMatrix::from_csv_str(",p,t\np,1.0\nt,0.5,1.0\n").is_err());
        assert!(SimilarityMatrix::from_csv_str(",p,t\np,1.0,x\nt,0.5,1.0\n").is_err());
        assert!(SimilarityMatrix::from_csv_str(",p,t\np,1.0,0.5\n").is_err());
    }

    #[test]
    fn test_from_parts_shape_check() {
        let err = SimilarityMatrix::from_parts(labels(&["p"]), Array2::zeros((2, 2)));
        assert!(err.is_err());
    }

    #[test]
    fn test_load_missing() {
        let err = SimilarityMatrix::load(Path::new("/nonexistent/dir/x.csv")).unwrap_err();
        assert!(matches!(err, PhonosimError::MatrixNotFound { .. }));
    }
}
