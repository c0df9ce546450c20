use serde::Deserialize;

use crate::bucket::BucketScheme;
use crate::coerce::{MissingMarkers, DEFAULT_MISSING_MARKERS};
use crate::error::PrepError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PrepConfig {
    /// Record field coerced and bucketed, e.g. `"Confirmed"`.
    pub value_field: String,
    #[serde(default)]
    pub on_unresolved: UnresolvedPolicy,
    #[serde(default)]
    pub key_form: KeyForm,
    #[serde(default = "default_missing_markers")]
    pub missing_markers: Vec<String>,
    /// Batches at least this large are processed in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    pub buckets: BucketConfig,
}

fn default_missing_markers() -> Vec<String> {
    DEFAULT_MISSING_MARKERS.iter().map(|m| m.to_string()).collect()
}

fn default_parallel_threshold() -> usize {
    1024
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do with records that fail any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Exclude them from the output (counted in the summary).
    #[default]
    Drop,
    /// Return them separately, annotated with the failing stage.
    Flag,
}

/// Which form of the canonical key the renderer receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyForm {
    /// ISO-3166-1 alpha-3 (`DEU`).
    #[default]
    Alpha3,
    /// Standardized ISO short name (`Germany`).
    Name,
}

impl std::fmt::Display for UnresolvedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drop => write!(f, "drop"),
            Self::Flag => write!(f, "flag"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BucketConfig {
    pub boundaries: Vec<f64>,
    pub labels: Vec<String>,
}

// ---------------------------------------------------------------------------
// Build + Parse + Validate
// ---------------------------------------------------------------------------

impl PrepConfig {
    /// Config with default policies for the given field and bucket edges.
    pub fn new(value_field: impl Into<String>, boundaries: Vec<f64>, labels: Vec<String>) -> Self {
        Self {
            value_field: value_field.into(),
            on_unresolved: UnresolvedPolicy::default(),
            key_form: KeyForm::default(),
            missing_markers: default_missing_markers(),
            parallel_threshold: default_parallel_threshold(),
            buckets: BucketConfig { boundaries, labels },
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.on_unresolved = policy;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn from_toml(input: &str) -> Result<Self, PrepError> {
        let config: PrepConfig =
            toml::from_str(input).map_err(|e| PrepError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        if self.value_field.trim().is_empty() {
            return Err(PrepError::ConfigValidation("value_field must not be empty".into()));
        }

        if self.parallel_threshold == 0 {
            return Err(PrepError::ConfigValidation(
                "parallel_threshold must be at least 1".into(),
            ));
        }

        if self.missing_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(PrepError::ConfigValidation(
                "missing_markers must not contain blank entries".into(),
            ));
        }

        self.scheme().map(|_| ())
    }

    pub fn scheme(&self) -> Result<BucketScheme, PrepError> {
        BucketScheme::new(self.buckets.boundaries.clone(), self.buckets.labels.clone())
    }

    pub fn markers(&self) -> MissingMarkers {
        MissingMarkers::new(&self.missing_markers)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
