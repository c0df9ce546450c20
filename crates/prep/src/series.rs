use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::coerce::{coerce, MissingMarkers};
use crate::error::PrepError;
use crate::model::{RawValue, Record};

/// Date layouts seen across the source files.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"];

// ---------------------------------------------------------------------------
// Daily totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOutput {
    /// Ascending by date, one point per distinct date.
    pub points: Vec<SeriesPoint>,
    pub skipped_bad_date: usize,
    pub skipped_missing_value: usize,
}

pub fn parse_date(raw: &RawValue) -> Option<NaiveDate> {
    let RawValue::Text(text) = raw else {
        return None;
    };
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Sum `value_field` per calendar date. Missing values are skipped, never
/// summed as 0.
pub fn daily_totals(
    records: &[Record],
    date_field: &str,
    value_field: &str,
    markers: &MissingMarkers,
) -> SeriesOutput {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut skipped_bad_date = 0;
    let mut skipped_missing_value = 0;

    for record in records {
        let Some(date) = parse_date(record.field(date_field)) else {
            skipped_bad_date += 1;
            continue;
        };
        let Some(value) = coerce(record.field(value_field), markers).as_option() else {
            skipped_missing_value += 1;
            continue;
        };
        *totals.entry(date).or_insert(0.0) += value;
    }

    if skipped_bad_date + skipped_missing_value > 0 {
        log::debug!(
            "daily totals for '{value_field}': skipped {skipped_bad_date} bad date(s), \
             {skipped_missing_value} missing value(s)"
        );
    }

    SeriesOutput {
        points: totals
            .into_iter()
            .map(|(date, value)| SeriesPoint { date, value })
            .collect(),
        skipped_bad_date,
        skipped_missing_value,
    }
}

// ---------------------------------------------------------------------------
// Forecast seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// External forecasting model. Given observed points and a horizon in days,
/// returns one prediction with confidence bounds per future date.
pub trait Forecaster {
    type Error: std::fmt::Display;

    fn forecast(
        &self,
        series: &[SeriesPoint],
        horizon_days: u32,
    ) -> Result<Vec<ForecastPoint>, Self::Error>;
}

/// Call a forecaster and check its answer.
///
/// The result must hold exactly `horizon_days` points on consecutive days
/// starting the day after the last observation, each with
/// `lower <= predicted <= upper` and finite values.
pub fn run_forecast<F: Forecaster>(
    forecaster: &F,
    series: &[SeriesPoint],
    horizon_days: u32,
) -> Result<Vec<ForecastPoint>, PrepError> {
    let last = series
        .last()
        .ok_or_else(|| PrepError::Forecast("series is empty".into()))?;
    if horizon_days == 0 {
        return Err(PrepError::Forecast("horizon must be at least 1 day".into()));
    }
    if series.windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(PrepError::Forecast("series dates must be strictly ascending".into()));
    }

    let points = forecaster
        .forecast(series, horizon_days)
        .map_err(|e| PrepError::Forecast(e.to_string()))?;

    if points.len() != horizon_days as usize {
        return Err(PrepError::Forecast(format!(
            "expected {horizon_days} point(s), got {}",
            points.len()
        )));
    }

    for (offset, point) in points.iter().enumerate() {
        let expected = last
            .date
            .checked_add_days(Days::new(offset as u64 + 1))
            .ok_or_else(|| PrepError::Forecast("forecast date overflow".into()))?;
        if point.date != expected {
            return Err(PrepError::Forecast(format!(
                "point {offset} dated {}, expected {expected}",
                point.date
            )));
        }
        let finite = point.lower.is_finite() && point.predicted.is_finite() && point.upper.is_finite();
        if !finite || point.lower > point.predicted || point.predicted > point.upper {
            return Err(PrepError::Forecast(format!(
                "point {} has inconsistent bounds [{}, {}, {}]",
                point.date, point.lower, point.predicted, point.upper
            )));
        }
    }

    Ok(points)
}
