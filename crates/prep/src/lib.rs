//! `covidscope-prep` — Normalization and range-binning pipeline.
//!
//! Pure engine crate: receives pre-loaded records, returns enriched rows
//! (canonical country key, clean numeric value, bucket label) ready for a
//! choropleth renderer. No file loading, no rendering.

pub mod bucket;
pub mod coerce;
pub mod config;
pub mod derived;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod series;
pub mod sink;
pub mod summary;

pub use bucket::{BucketOutcome, BucketScheme};
pub use coerce::{coerce, coerce_str, MissingMarkers};
pub use config::{KeyForm, PrepConfig, UnresolvedPolicy};
pub use error::PrepError;
pub use model::{EnrichedRecord, NumericValue, PrepOutput, RawValue, Record, RejectReason};
pub use pipeline::{process, Pipeline};
