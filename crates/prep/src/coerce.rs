use crate::model::{NumericValue, RawValue};

/// Text values read as missing unless a config overrides the list.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["nan", "n/a", "na", "null", "none", "-"];

/// Case-insensitive set of textual "missing" markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingMarkers {
    markers: Vec<String>,
}

impl MissingMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn is_marker(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.markers.iter().any(|m| *m == lowered)
    }
}

impl Default for MissingMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_MARKERS)
    }
}

/// Coercion result with the reason a value is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Value(f64),
    /// Null, NaN number, or blank text.
    Absent,
    /// Text matched a missing marker.
    Marker,
    /// Text that is not a number after separator stripping, or a non-finite number.
    Malformed,
}

impl Coerced {
    pub fn numeric(self) -> NumericValue {
        match self {
            Self::Value(x) => NumericValue::Value(x),
            Self::Absent | Self::Marker | Self::Malformed => NumericValue::Missing,
        }
    }
}

/// Coerce a raw cell into a number, reporting why it is missing.
///
/// # Rules
/// - Whitespace is trimmed; blank text is absent
/// - Missing markers match case-insensitively
/// - Grouping commas and inner whitespace are stripped (`"1,234,567"` → 1234567)
/// - Leading `+` or `-` is allowed
/// - Anything non-finite (`inf`, NaN) is never a value
pub fn coerce_detailed(raw: &RawValue, markers: &MissingMarkers) -> Coerced {
    match raw {
        RawValue::Null => Coerced::Absent,
        RawValue::Number(x) if x.is_nan() => Coerced::Absent,
        RawValue::Number(x) if x.is_finite() => Coerced::Value(*x),
        RawValue::Number(_) => Coerced::Malformed,
        RawValue::Text(text) => coerce_text(text, markers),
    }
}

/// Coerce a raw cell into a `NumericValue`.
pub fn coerce(raw: &RawValue, markers: &MissingMarkers) -> NumericValue {
    coerce_detailed(raw, markers).numeric()
}

/// Convenience for text input with the default markers.
pub fn coerce_str(text: &str) -> NumericValue {
    coerce_text(text, &MissingMarkers::default()).numeric()
}

fn coerce_text(text: &str, markers: &MissingMarkers) -> Coerced {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Coerced::Absent;
    }
    if markers.is_marker(trimmed) {
        return Coerced::Marker;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    // Only digits, one sign, a decimal point and an exponent may remain.
    // This keeps `f64::from_str` from accepting "inf" or "nan" spellings.
    let plausible = cleaned.char_indices().all(|(i, c)| match c {
        '0'..='9' | '.' | 'e' | 'E' => true,
        '+' | '-' => i == 0 || matches!(cleaned.as_bytes()[i - 1], b'e' | b'E'),
        _ => false,
    });
    if !plausible {
        return Coerced::Malformed;
    }

    match cleaned.parse::<f64>() {
        Ok(x) if x.is_finite() => Coerced::Value(x),
        _ => Coerced::Malformed,
    }
}
