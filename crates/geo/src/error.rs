use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// Reference CSV could not be read or deserialized.
    ReferenceParse(String),
    /// Two entries share the same alpha-3 code.
    DuplicateCode(String),
    /// An alias points at an alpha-3 code that has no entry.
    UnknownAliasTarget { alias: String, alpha3: String },
    /// One normalized lookup key maps to two different entries.
    AmbiguousKey { key: String, first: String, second: String },
    /// The resolver's memo cache lock was poisoned by a panicking worker.
    CachePoisoned,
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceParse(msg) => write!(f, "reference table parse error: {msg}"),
            Self::DuplicateCode(code) => write!(f, "duplicate alpha-3 code in reference table: {code}"),
            Self::UnknownAliasTarget { alias, alpha3 } => {
                write!(f, "alias '{alias}' targets unknown code '{alpha3}'")
            }
            Self::AmbiguousKey { key, first, second } => {
                write!(f, "lookup key '{key}' maps to both {first} and {second}")
            }
            Self::CachePoisoned => write!(f, "resolver cache lock poisoned"),
        }
    }
}

impl std::error::Error for GeoError {}
