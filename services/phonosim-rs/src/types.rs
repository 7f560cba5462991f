//! Shared data structures for segment similarity computation.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PhonosimError;

/// Observed value of one feature on an inventory segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureValue {
    Positive,
    Negative,
    Unspecified,
}

impl FeatureValue {
    /// Parse a feature-matrix cell (`+`, `-`, `0` or `n`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Positive),
            "-" => Some(Self::Negative),
            "0" | "n" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

/// Query-side value of one feature position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Valuation {
    Positive,
    Negative,
    Wildcard,
}

impl Valuation {
    /// Traversal order of a single position during enumeration.
    pub const ORDER: [Valuation; 3] = [Valuation::Positive, Valuation::Negative, Valuation::Wildcard];

    /// Whether a segment value satisfies this position.
    ///
    /// Unspecified segment values are only reachable through a wildcard.
    pub fn matches(self, value: FeatureValue) -> bool {
        match self {
            Valuation::Wildcard => true,
            Valuation::Positive => value == FeatureValue::Positive,
            Valuation::Negative => value == FeatureValue::Negative,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Valuation::Positive => "+",
            Valuation::Negative => "-",
            Valuation::Wildcard => "0",
        }
    }
}

/// One logically possible feature combination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    values: Vec<Valuation>,
}

impl FeatureVector {
    pub fn new(values: Vec<Valuation>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Valuation] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn wildcard_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| **v == Valuation::Wildcard)
            .count()
    }

    /// True when no position is a wildcard
    pub fn is_fully_specified(&self) -> bool {
        self.wildcard_count() == 0
    }

    /// Contiguous runs of specified positions, split at every wildcard.
    pub fn specified_runs(&self) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let mut start = 0;
        for (i, value) in self.values.iter().enumerate() {
            if *value == Valuation::Wildcard {
                if start < i {
                    runs.push(start..i);
                }
                start = i + 1;
            }
        }
        if start < self.values.len() {
            runs.push(start..self.values.len());
        }
        runs
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(value.symbol())?;
        }
        f.write_str("]")
    }
}

impl FromStr for FeatureVector {
    type Err = PhonosimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| PhonosimError::Serialization {
                reason: format!("feature vector key {s:?} is not bracketed"),
            })?;

        if inner.trim().is_empty() {
            return Ok(Self::new(Vec::new()));
        }

        let values = inner
            .split(',')
            .map(|token| match token.trim().trim_matches('\'') {
                "+" => Ok(Valuation::Positive),
                "-" => Ok(Valuation::Negative),
                "0" => Ok(Valuation::Wildcard),
                other => Err(PhonosimError::Serialization {
                    reason: format!("unknown valuation {other:?} in key {s:?}"),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(values))
    }
}

/// Consonant segment with its observed feature values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub label: String,
    pub features: Vec<FeatureValue>,
}

impl Segment {
    pub fn new(label: String, features: Vec<FeatureValue>) -> Self {
        Self { label, features }
    }

    /// Whether every specified position of `vector` within `run` agrees with this segment
    pub fn matches_run(&self, vector: &FeatureVector, run: Range<usize>) -> bool {
        vector.values()[run.clone()]
            .iter()
            .zip(&self.features[run])
            .all(|(query, value)| query.matches(*value))
    }
}

/// Feature specification together with the segments satisfying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalClass {
    pub vector: FeatureVector,
    pub members: Vec<String>,
}

impl NaturalClass {
    pub fn new(vector: FeatureVector, members: Vec<String>) -> Self {
        Self { vector, members }
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.members.iter().any(|m| m == segment)
    }
}

/// Snapshot of a running enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationProgress {
    pub enumerated: usize,
    pub total: usize,
    pub found: usize,
}

impl EnumerationProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.enumerated as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(s: &str) -> FeatureVector {
        s.parse().unwrap()
    }

    #[test]
    fn test_display_round_trip() {
        let v = FeatureVector::new(vec![
            Valuation::Positive,
            Valuation::Negative,
            Valuation::Wildcard,
        ]);
        assert_eq!(v.to_string(), "[+, -, 0]");
        assert_eq!(vector("[+, -, 0]"), v);
    }

    #[test]
    fn test_parses_python_style_keys() {
        let v = vector("['+', '-', 0]");
        assert_eq!(v.to_string(), "[+, -, 0]");
    }

    #[test]
    fn test_rejects_unknown_valuation() {
        assert!("[+, x]".parse::<FeatureVector>().is_err());
        assert!("+, -".parse::<FeatureVector>().is_err());
    }

    #[test]
    fn test_specified_runs() {
        assert_eq!(vector("[+, 0, -, -, 0]").specified_runs(), vec![0..1, 2..4]);
        assert_eq!(vector("[0, 0]").specified_runs(), Vec::<Range<usize>>::new());
        assert_eq!(vector("[+, -]").specified_runs(), vec![0..2]);
        assert_eq!(vector("[0, +]").specified_runs(), vec![1..2]);
    }

    #[test]
    fn test_unspecified_only_matches_wildcard() {
        assert!(Valuation::Wildcard.matches(FeatureValue::Unspecified));
        assert!(!Valuation::Positive.matches(FeatureValue::Unspecified));
        assert!(!Valuation::Negative.matches(FeatureValue::Unspecified));
    }

    #[test]
    fn test_segment_matches_run() {
        let seg = Segment::new(
            "p".to_string(),
            vec![FeatureValue::Positive, FeatureValue::Negative, FeatureValue::Positive],
        );
        let v = vector("[+, 0, -]");
        assert!(seg.matches_run(&v, 0..1));
        assert!(!seg.matches_run(&v, 2..3));
    }
}
