use std::collections::HashSet;

use crate::error::PrepError;
use crate::model::NumericValue;

/// Where a value landed in a `BucketScheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOutcome {
    /// Index into the scheme's labels.
    Assigned(usize),
    Missing,
    /// Below the first boundary, or at/above the last.
    OutOfRange,
}

/// Ordered, labeled partition of the number line.
///
/// # Tie rule
/// Buckets are left-inclusive: bucket `i` is `[b[i], b[i+1])`. A value equal
/// to a boundary belongs to the bucket that boundary opens, never the one it
/// closes.
///
/// # Out of range
/// Values `< b[0]` or `>= b[last]` are `OutOfRange`; they are never clamped
/// into an edge bucket. Use `f64::INFINITY` as the last boundary for an
/// unbounded top bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketScheme {
    boundaries: Vec<f64>,
    labels: Vec<String>,
}

impl BucketScheme {
    /// Validate and build a scheme. All checks happen here so a bad scheme
    /// is rejected before any record is bucketed.
    pub fn new(boundaries: Vec<f64>, labels: Vec<String>) -> Result<Self, PrepError> {
        let fail = |reason: String| PrepError::Configuration {
            boundaries: boundaries.len(),
            labels: labels.len(),
            reason,
        };

        if boundaries.len() < 2 {
            return Err(fail("at least 2 boundaries are required".into()));
        }
        if labels.len() != boundaries.len() - 1 {
            return Err(fail(format!(
                "expected {} labels for {} boundaries",
                boundaries.len() - 1,
                boundaries.len()
            )));
        }
        if let Some(pos) = boundaries.iter().position(|b| b.is_nan()) {
            return Err(fail(format!("boundary {pos} is NaN")));
        }
        if let Some(pos) = boundaries.windows(2).position(|w| w[0] >= w[1]) {
            return Err(fail(format!(
                "boundaries must be strictly increasing ({} >= {} at position {})",
                boundaries[pos],
                boundaries[pos + 1],
                pos + 1
            )));
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(fail("labels must not be empty".into()));
        }
        let duplicate = {
            let mut seen = HashSet::new();
            labels.iter().find(|l| !seen.insert(l.as_str())).cloned()
        };
        if let Some(dup) = duplicate {
            return Err(fail(format!("duplicate label '{dup}'")));
        }

        Ok(Self { boundaries, labels })
    }

    /// Cases scheme used by the country-wise world map.
    pub fn covid_cases() -> Self {
        Self {
            boundaries: vec![-1.0, 5e4, 2e5, 8e5, 1.5e6, 1e9],
            labels: ["U50K", "50K–200K", "200K–800K", "800K–1.5M", "1.5M+"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn bucket(&self, value: NumericValue) -> BucketOutcome {
        let x = match value {
            NumericValue::Value(x) => x,
            NumericValue::Missing => return BucketOutcome::Missing,
        };
        let first = self.boundaries[0];
        let last = self.boundaries[self.boundaries.len() - 1];
        if x.is_nan() || x < first || x >= last {
            return BucketOutcome::OutOfRange;
        }
        // Number of boundaries <= x; the bucket is the one the last of them opens.
        let opened = self.boundaries.partition_point(|b| *b <= x);
        BucketOutcome::Assigned(opened - 1)
    }

    /// Label for a value, or `None` when missing or out of range.
    pub fn label_for(&self, value: NumericValue) -> Option<&str> {
        match self.bucket(value) {
            BucketOutcome::Assigned(i) => self.label(i),
            BucketOutcome::Missing | BucketOutcome::OutOfRange => None,
        }
    }
}
