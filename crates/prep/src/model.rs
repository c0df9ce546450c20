use std::collections::BTreeMap;

use covidscope_geo::CountryCode;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A raw cell as supplied by the loader.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<i64> for RawValue {
    fn from(x: i64) -> Self {
        Self::Number(x as f64)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One input row: a country name plus named raw value fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub country: String,
    #[serde(default)]
    pub fields: BTreeMap<String, RawValue>,
}

impl Record {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Field value; an absent field reads as `Null`.
    pub fn field(&self, name: &str) -> &RawValue {
        self.fields.get(name).unwrap_or(&RawValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------------

/// A finite number or an explicit missing marker. `Missing` is never read as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Value(f64),
    Missing,
}

impl NumericValue {
    pub fn as_option(self) -> Option<f64> {
        match self {
            Self::Value(x) => Some(x),
            Self::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl Serialize for NumericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(x) => serializer.serialize_some(x),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// First pipeline stage that failed for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    UnresolvedCountry,
    MissingValue,
    MalformedNumeric,
    OutOfRange,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedCountry => "unresolved_country",
            Self::MissingValue => "missing_value",
            Self::MalformedNumeric => "malformed_numeric",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One processed row. Accepted rows have `key`, `value` and `bucket` set and
/// no `reason`; rejected rows carry whatever stages succeeded plus `reason`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    /// Position in the input sequence.
    pub index: usize,
    pub country: String,
    pub key: Option<CountryCode>,
    pub value: NumericValue,
    pub bucket: Option<String>,
    pub reason: Option<RejectReason>,
}

impl EnrichedRecord {
    pub fn is_accepted(&self) -> bool {
        self.reason.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrepSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Rejected records excluded from the output (drop policy).
    pub dropped: usize,
    pub reason_counts: BTreeMap<String, usize>,
    /// In bucket-scheme order; labels with zero records are included.
    pub bucket_counts: Vec<BucketCount>,
    /// Distinct country names that failed resolution, sorted.
    pub unresolved_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrepOutput {
    pub accepted: Vec<EnrichedRecord>,
    /// Empty under the drop policy.
    pub rejected: Vec<EnrichedRecord>,
    pub summary: PrepSummary,
}

impl PrepOutput {
    /// Accepted and rejected rows merged back into input order.
    pub fn table(&self) -> Vec<&EnrichedRecord> {
        let mut rows: Vec<&EnrichedRecord> = self.accepted.iter().chain(&self.rejected).collect();
        rows.sort_by_key(|r| r.index);
        rows
    }
}
