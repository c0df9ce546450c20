use std::collections::{BTreeMap, BTreeSet};

use crate::bucket::BucketScheme;
use crate::config::UnresolvedPolicy;
use crate::model::{BucketCount, EnrichedRecord, PrepSummary, RejectReason};

/// Compute data-quality counts over every processed record, before any are
/// dropped, so the summary always reports how much was excluded.
pub fn compute_summary(
    rows: &[EnrichedRecord],
    scheme: &BucketScheme,
    policy: UnresolvedPolicy,
) -> PrepSummary {
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut per_label: BTreeMap<&str, usize> = BTreeMap::new();
    let mut unresolved: BTreeSet<&str> = BTreeSet::new();
    let mut accepted = 0;

    for row in rows {
        match row.reason {
            None => {
                accepted += 1;
                if let Some(label) = row.bucket.as_deref() {
                    *per_label.entry(label).or_insert(0) += 1;
                }
            }
            Some(reason) => {
                *reason_counts.entry(reason.to_string()).or_insert(0) += 1;
                if reason == RejectReason::UnresolvedCountry {
                    unresolved.insert(row.country.as_str());
                }
            }
        }
    }

    let rejected = rows.len() - accepted;
    PrepSummary {
        total: rows.len(),
        accepted,
        rejected,
        dropped: match policy {
            UnresolvedPolicy::Drop => rejected,
            UnresolvedPolicy::Flag => 0,
        },
        reason_counts,
        bucket_counts: scheme
            .labels()
            .iter()
            .map(|label| BucketCount {
                label: label.clone(),
                count: per_label.get(label.as_str()).copied().unwrap_or(0),
            })
            .collect(),
        unresolved_names: unresolved.into_iter().map(String::from).collect(),
    }
}
