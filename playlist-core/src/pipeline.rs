//! Extraction pipeline
//!
//! `document text → plist tree → (track blocks, playlist order) → raw records
//! → typed records → result table`. Every stage is a pure function of its
//! input; nothing is cached between calls.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::library;
use crate::plist;
use crate::table::{self, ResultTable};
use crate::track::{
    TrackRecord, ARTIST, BPM, COMMENTS, ENERGY, GROUPING, NAME, RATING, RELEASE_DATE,
    SORT_ARTIST, TRACK_ID,
};

/// Which fields to read from each track and which columns to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    /// Fields read from every track block
    pub requested_fields: Vec<String>,
    /// Columns of the result table, in order
    pub output_columns: Vec<String>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            requested_fields: [
                TRACK_ID,
                NAME,
                ARTIST,
                GROUPING,
                BPM,
                COMMENTS,
                RATING,
                SORT_ARTIST,
                RELEASE_DATE,
            ]
            .map(String::from)
            .to_vec(),
            output_columns: [NAME, BPM, ENERGY, GROUPING, COMMENTS, ARTIST, RELEASE_DATE]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl FieldSelection {
    pub fn new(requested_fields: Vec<String>, output_columns: Vec<String>) -> Self {
        Self {
            requested_fields,
            output_columns,
        }
    }

    /// Requested fields plus the ones coercion always needs, without repeats
    pub fn extraction_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = Vec::with_capacity(self.requested_fields.len() + 3);
        for field in [TRACK_ID, BPM, RATING]
            .into_iter()
            .chain(self.requested_fields.iter().map(String::as_str))
        {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
        fields
    }

    /// Whether `column` can appear in the result table
    pub fn is_output_column(&self, column: &str) -> bool {
        match column {
            TRACK_ID | BPM | ENERGY => true,
            RATING => false,
            _ => self.requested_fields.iter().any(|f| f == column),
        }
    }

    /// Reject output columns that no record could provide
    pub fn validate(&self) -> Result<()> {
        match self
            .output_columns
            .iter()
            .find(|column| !self.is_output_column(column))
        {
            Some(column) => Err(Error::UnknownColumn(column.clone())),
            None => Ok(()),
        }
    }
}

/// Run the whole extraction over one document
///
/// Fails without a partial result on the first format, lookup or integrity
/// error.
pub fn extract(document: &str, selection: &FieldSelection) -> Result<ResultTable> {
    selection.validate()?;

    let tree = plist::parse(document)?;
    let blocks = library::track_blocks(&tree)?;
    let order = library::playlist_order(&tree)?;

    let raw = library::assemble_records(&blocks, &selection.extraction_fields());
    let records = raw
        .into_iter()
        .map(TrackRecord::coerce)
        .collect::<Result<Vec<_>>>()?;
    debug!("Coerced {} track records", records.len());

    let table = table::build_result_table(records, &order, &selection.output_columns)?;
    info!(
        "Extracted {} rows from {} playlist entries",
        table.len(),
        order.len()
    );
    Ok(table)
}
