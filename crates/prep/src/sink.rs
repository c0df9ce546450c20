//! Hand-off to the rendering sink.
//!
//! The renderer receives rows plus the names of the geographic-key column and
//! the color column; nothing here draws anything.

use std::io::Write;

use serde::Serialize;

use crate::config::KeyForm;
use crate::error::PrepError;
use crate::model::{EnrichedRecord, PrepOutput};

pub const KEY_COLUMN: &str = "key";
pub const COLOR_COLUMN: &str = "bucket";

const CSV_HEADER: &[&str] = &["index", "country", "key", "value", "bucket", "reason"];

// ---------------------------------------------------------------------------
// Choropleth frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    pub key: String,
    pub country: String,
    pub value: f64,
    pub bucket: String,
}

/// Accepted rows in the shape a choropleth renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFrame {
    pub key_column: &'static str,
    pub color_column: &'static str,
    /// Bucket labels in scheme order, for a stable legend.
    pub categories: Vec<String>,
    pub rows: Vec<ChoroplethRow>,
}

impl ChoroplethFrame {
    pub fn from_output(output: &PrepOutput, key_form: KeyForm) -> Self {
        let rows = output
            .accepted
            .iter()
            .filter_map(|r| {
                Some(ChoroplethRow {
                    key: key_text(r, key_form)?,
                    country: r.country.clone(),
                    value: r.value.as_option()?,
                    bucket: r.bucket.clone()?,
                })
            })
            .collect();

        Self {
            key_column: KEY_COLUMN,
            color_column: COLOR_COLUMN,
            categories: output.summary.bucket_counts.iter().map(|b| b.label.clone()).collect(),
            rows,
        }
    }
}

fn key_text(record: &EnrichedRecord, key_form: KeyForm) -> Option<String> {
    let code = record.key.as_ref()?;
    Some(match key_form {
        KeyForm::Alpha3 => code.alpha3.clone(),
        KeyForm::Name => code.name.clone(),
    })
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write rows as CSV. Absent key/value/bucket/reason become empty cells.
pub fn write_csv<'a, I, W>(rows: I, key_form: KeyForm, writer: W) -> Result<(), PrepError>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER).map_err(|e| PrepError::Output(e.to_string()))?;

    for row in rows {
        let record = [
            row.index.to_string(),
            row.country.clone(),
            key_text(row, key_form).unwrap_or_default(),
            row.value.as_option().map(|x| x.to_string()).unwrap_or_default(),
            row.bucket.clone().unwrap_or_default(),
            row.reason.map(|r| r.to_string()).unwrap_or_default(),
        ];
        wtr.write_record(&record).map_err(|e| PrepError::Output(e.to_string()))?;
    }

    wtr.flush().map_err(|e| PrepError::Output(e.to_string()))
}

/// Full output (accepted, rejected, summary) as pretty JSON.
pub fn to_json(output: &PrepOutput) -> Result<String, PrepError> {
    serde_json::to_string_pretty(output).map_err(|e| PrepError::Output(e.to_string()))
}
