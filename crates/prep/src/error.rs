use std::fmt;

use covidscope_geo::GeoError;

#[derive(Debug)]
pub enum PrepError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty field name, bad threshold, etc.).
    ConfigValidation(String),
    /// Bucket boundaries and labels are inconsistent.
    Configuration { boundaries: usize, labels: usize, reason: String },
    /// Fault inside country resolution (not an unresolved name).
    Geo(GeoError),
    /// Writing the hand-off table failed.
    Output(String),
    /// The external forecaster failed or returned an inconsistent result.
    Forecast(String),
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Configuration { boundaries, labels, reason } => write!(
                f,
                "bucket configuration error ({boundaries} boundaries, {labels} labels): {reason}"
            ),
            Self::Geo(err) => write!(f, "country resolution failed: {err}"),
            Self::Output(msg) => write!(f, "output error: {msg}"),
            Self::Forecast(msg) => write!(f, "forecast error: {msg}"),
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GeoError> for PrepError {
    fn from(err: GeoError) -> Self {
        Self::Geo(err)
    }
}
