// Property-based tests for the preparation pipeline.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::sync::Arc;

use covidscope_geo::CountryResolver;
use covidscope_prep::bucket::BucketScheme;
use covidscope_prep::config::{PrepConfig, UnresolvedPolicy};
use covidscope_prep::model::{NumericValue, Record};
use covidscope_prep::pipeline::Pipeline;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn prep_config(policy: UnresolvedPolicy, parallel_threshold: usize) -> PrepConfig {
    PrepConfig::new(
        "Confirmed",
        vec![-1.0, 50_000.0, 200_000.0, 1e9],
        vec!["U50K".into(), "50K-200K".into(), "200K+".into()],
    )
    .with_policy(policy)
    .with_parallel_threshold(parallel_threshold)
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_country() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(vec!["Germany", "US", "Korea, South", "Burma", "Taiwan*", "brazil"])
            .prop_map(String::from),
        1 => prop::sample::select(vec!["Narnia", "Diamond Princess", "Kosovo", ""])
            .prop_map(String::from),
        1 => "[A-Za-z ]{0,12}",
    ]
}

/// Mostly numeric, sometimes comma-grouped, missing, or garbage.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => (0u64..5_000_000).prop_map(|n| n.to_string()),
        2 => (0u64..5_000_000).prop_map(group_thousands),
        1 => prop::sample::select(vec!["nan", "N/A", "", "  "]).prop_map(String::from),
        1 => "[a-z]{1,5}",
        1 => Just("-5".to_string()),
    ]
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    proptest::collection::vec((arb_country(), arb_value()), 0..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(country, value)| Record::new(country).with_field("Confirmed", value))
            .collect()
    })
}

fn resolver() -> Arc<CountryResolver> {
    Arc::new(CountryResolver::embedded().unwrap())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    /// Drop: never longer than the input, and every survivor is complete.
    #[test]
    fn drop_output_is_complete(records in arb_records()) {
        let out = Pipeline::new(prep_config(UnresolvedPolicy::Drop, 1024), resolver())
            .unwrap()
            .process(&records)
            .unwrap();
        prop_assert!(out.accepted.len() <= records.len());
        prop_assert!(out.rejected.is_empty());
        prop_assert_eq!(out.summary.dropped, records.len() - out.accepted.len());
        for row in &out.accepted {
            prop_assert!(row.key.is_some());
            prop_assert!(!row.value.is_missing());
            prop_assert!(row.bucket.is_some());
        }
    }

    /// Flag: accepted + rejected == input, every rejection has a reason.
    #[test]
    fn flag_partitions_input(records in arb_records()) {
        let out = Pipeline::new(prep_config(UnresolvedPolicy::Flag, 1024), resolver())
            .unwrap()
            .process(&records)
            .unwrap();
        prop_assert_eq!(out.accepted.len() + out.rejected.len(), records.len());
        for row in &out.rejected {
            prop_assert!(row.reason.is_some());
        }
        let indices: Vec<usize> = out.table().iter().map(|r| r.index).collect();
        prop_assert_eq!(indices, (0..records.len()).collect::<Vec<_>>());
    }

    /// Parallel output matches serial output and follows input order,
    /// including after a shuffle and unshuffle of the input.
    #[test]
    fn order_is_stable_under_parallelism(
        records in arb_records(),
        seed in proptest::collection::vec(any::<u32>(), 60),
    ) {
        let serial = Pipeline::new(prep_config(UnresolvedPolicy::Flag, 1024), resolver())
            .unwrap()
            .process(&records)
            .unwrap();
        let parallel_pipeline =
            Pipeline::new(prep_config(UnresolvedPolicy::Flag, 1), resolver()).unwrap();
        let parallel = parallel_pipeline.process(&records).unwrap();
        prop_assert_eq!(&serial, &parallel);

        // Shuffle by sort key, then run and map results back to original positions.
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by_key(|&i| seed[i]);
        let shuffled: Vec<Record> = order.iter().map(|&i| records[i].clone()).collect();
        let out = parallel_pipeline.process(&shuffled).unwrap();
        let mut restored = vec![None; records.len()];
        for row in out.table() {
            restored[order[row.index]] = Some((row.country.clone(), row.bucket.clone(), row.reason));
        }
        let expected: Vec<_> = serial
            .table()
            .iter()
            .map(|r| Some((r.country.clone(), r.bucket.clone(), r.reason)))
            .collect();
        prop_assert_eq!(restored, expected);
    }

    /// Boundary values open their bucket; the value just below stays in the previous one.
    #[test]
    fn left_inclusive_boundaries(idx in 1usize..3) {
        let scheme = BucketScheme::new(
            vec![-1.0, 50_000.0, 200_000.0, 1e9],
            vec!["U50K".into(), "50K-200K".into(), "200K+".into()],
        ).unwrap();
        let b = scheme.boundaries()[idx];
        prop_assert_eq!(scheme.label_for(NumericValue::Value(b)), scheme.label(idx));
        prop_assert_eq!(scheme.label_for(NumericValue::Value(b - 0.01)), scheme.label(idx - 1));
        prop_assert_eq!(scheme.label_for(NumericValue::Missing), None);
    }

    /// Grouped and ungrouped spellings of a number coerce identically.
    #[test]
    fn grouping_does_not_change_value(n in 0u64..10_000_000_000) {
        prop_assert_eq!(
            covidscope_prep::coerce_str(&group_thousands(n)),
            covidscope_prep::coerce_str(&n.to_string())
        );
    }
}
