use serde::Serialize;

use crate::coerce::{coerce, MissingMarkers};
use crate::model::{NumericValue, Record};

/// One row of the top-countries ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCountry {
    pub country: String,
    pub value: f64,
    /// `deaths / confirmed`; `None` when either is missing or confirmed is 0.
    pub death_rate: Option<f64>,
}

pub fn death_rate(confirmed: NumericValue, deaths: NumericValue) -> Option<f64> {
    match (confirmed, deaths) {
        (NumericValue::Value(c), NumericValue::Value(d)) if c != 0.0 => Some(d / c),
        _ => None,
    }
}

/// Top `n` records by `by_field`, descending. Ties keep input order.
///
/// Records whose ranking value is missing are skipped rather than ranked as 0.
pub fn top_countries(
    records: &[Record],
    by_field: &str,
    deaths_field: &str,
    n: usize,
    markers: &MissingMarkers,
) -> Vec<RankedCountry> {
    let mut ranked: Vec<RankedCountry> = records
        .iter()
        .filter_map(|r| {
            let value = coerce(r.field(by_field), markers);
            let deaths = coerce(r.field(deaths_field), markers);
            Some(RankedCountry {
                country: r.country.clone(),
                value: value.as_option()?,
                death_rate: death_rate(value, deaths),
            })
        })
        .collect();

    // Stable sort keeps input order among equal values.
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(country: &str, confirmed: &str, deaths: &str) -> Record {
        Record::new(country)
            .with_field("Confirmed", confirmed)
            .with_field("Deaths", deaths)
    }

    #[test]
    fn death_rate_guards() {
        assert_eq!(death_rate(NumericValue::Value(200.0), NumericValue::Value(10.0)), Some(0.05));
        assert_eq!(death_rate(NumericValue::Value(0.0), NumericValue::Value(0.0)), None);
        assert_eq!(death_rate(NumericValue::Missing, NumericValue::Value(1.0)), None);
        assert_eq!(death_rate(NumericValue::Value(5.0), NumericValue::Missing), None);
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let records = vec![
            rec("Chile", "347,923", "9,187"),
            rec("US", "4,290,259", "148,011"),
            rec("Brazil", "2,442,375", "87,618"),
            rec("India", "1,480,073", "33,408"),
        ];
        let top = top_countries(&records, "Confirmed", "Deaths", 3, &MissingMarkers::default());
        let names: Vec<&str> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["US", "Brazil", "India"]);
        assert!((top[0].death_rate.unwrap() - 148_011.0 / 4_290_259.0).abs() < 1e-12);
    }

    #[test]
    fn missing_values_are_skipped_not_zeroed() {
        let records = vec![rec("A", "nan", "1"), rec("B", "5", "nan"), rec("C", "", "")];
        let top = top_countries(&records, "Confirmed", "Deaths", 10, &MissingMarkers::default());
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].country, "B");
        assert_eq!(top[0].death_rate, None);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = vec![rec("X", "10", "0"), rec("Y", "10", "0"), rec("Z", "20", "0")];
        let top = top_countries(&records, "Confirmed", "Deaths", 3, &MissingMarkers::default());
        let names: Vec<&str> = top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["Z", "X", "Y"]);
    }
}
