use std::sync::Arc;

use covidscope_geo::CountryResolver;
use rayon::prelude::*;

use crate::bucket::{BucketOutcome, BucketScheme};
use crate::coerce::{coerce_detailed, Coerced, MissingMarkers};
use crate::config::{PrepConfig, UnresolvedPolicy};
use crate::error::PrepError;
use crate::model::{EnrichedRecord, PrepOutput, Record, RejectReason};
use crate::sink::ChoroplethFrame;
use crate::summary::compute_summary;

/// Resolve → coerce → bucket, once per record.
///
/// Built from a validated config; a bad bucket scheme fails in `new`, before
/// any record is seen.
#[derive(Debug)]
pub struct Pipeline {
    config: PrepConfig,
    scheme: BucketScheme,
    markers: MissingMarkers,
    resolver: Arc<CountryResolver>,
}

impl Pipeline {
    pub fn new(config: PrepConfig, resolver: Arc<CountryResolver>) -> Result<Self, PrepError> {
        config.validate()?;
        let scheme = config.scheme()?;
        let markers = config.markers();
        Ok(Self {
            config,
            scheme,
            markers,
            resolver,
        })
    }

    pub fn scheme(&self) -> &BucketScheme {
        &self.scheme
    }

    /// Process a batch. Output order follows input order.
    ///
    /// Per-record failures never abort the batch: they become a
    /// `RejectReason`, and the record is dropped or flagged per
    /// `on_unresolved`. Only a fault inside the resolver returns `Err`.
    pub fn process(&self, records: &[Record]) -> Result<PrepOutput, PrepError> {
        let rows: Vec<EnrichedRecord> = if records.len() >= self.config.parallel_threshold {
            records
                .par_iter()
                .enumerate()
                .map(|(index, record)| self.enrich(index, record))
                .collect::<Result<_, _>>()?
        } else {
            records
                .iter()
                .enumerate()
                .map(|(index, record)| self.enrich(index, record))
                .collect::<Result<_, _>>()?
        };

        let policy = self.config.on_unresolved;
        let summary = compute_summary(&rows, &self.scheme, policy);

        let (accepted, rejected): (Vec<_>, Vec<_>) =
            rows.into_iter().partition(EnrichedRecord::is_accepted);
        let rejected = match policy {
            UnresolvedPolicy::Flag => rejected,
            UnresolvedPolicy::Drop => Vec::new(),
        };

        log::info!(
            "prepared '{}': {} of {} records accepted ({} rejected, policy={})",
            self.config.value_field,
            summary.accepted,
            summary.total,
            summary.rejected,
            policy
        );
        if summary.dropped > 0 {
            log::warn!(
                "dropped {} record(s) from '{}': {:?}",
                summary.dropped,
                self.config.value_field,
                summary.reason_counts
            );
        }

        Ok(PrepOutput {
            accepted,
            rejected,
            summary,
        })
    }

    /// Renderer frame for `output`, keyed by the configured `key_form`.
    pub fn frame(&self, output: &PrepOutput) -> ChoroplethFrame {
        ChoroplethFrame::from_output(output, self.config.key_form)
    }

    fn enrich(&self, index: usize, record: &Record) -> Result<EnrichedRecord, PrepError> {
        let resolved = self.resolver.resolve(&record.country)?;
        let key = resolved.code().cloned();

        let coerced = coerce_detailed(record.field(&self.config.value_field), &self.markers);
        let value = coerced.numeric();

        let (bucket, bucket_failure) = match self.scheme.bucket(value) {
            BucketOutcome::Assigned(i) => (self.scheme.label(i).map(String::from), None),
            BucketOutcome::Missing => (None, None),
            BucketOutcome::OutOfRange => (None, Some(RejectReason::OutOfRange)),
        };

        // First failing stage wins.
        let reason = if key.is_none() {
            Some(RejectReason::UnresolvedCountry)
        } else {
            match coerced {
                Coerced::Absent | Coerced::Marker => Some(RejectReason::MissingValue),
                Coerced::Malformed => Some(RejectReason::MalformedNumeric),
                Coerced::Value(_) => bucket_failure,
            }
        };

        if let Some(reason) = reason {
            log::debug!("record {index} ({:?}) rejected: {reason}", record.country);
        }

        Ok(EnrichedRecord {
            index,
            country: record.country.clone(),
            key,
            value,
            bucket,
            reason,
        })
    }
}

/// One-shot helper: build a pipeline and process a batch.
pub fn process(
    records: &[Record],
    config: PrepConfig,
    resolver: Arc<CountryResolver>,
) -> Result<PrepOutput, PrepError> {
    Pipeline::new(config, resolver)?.process(records)
}
