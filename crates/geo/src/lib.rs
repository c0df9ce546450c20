//! `covidscope-geo` — Country reference table and name resolution.
//!
//! Maps free-form country names to ISO-3166-1 keys a choropleth renderer can
//! place on a map. Unknown names resolve to `Unresolved`; they are never
//! errors.

pub mod error;
pub mod normalize;
pub mod reference;
pub mod resolver;

pub use error::GeoError;
pub use reference::{CountryCode, CountryEntry, ReferenceTable};
pub use resolver::{CountryResolver, Resolution, ResolvedKey};
