//! Playlist-ordered result table
//!
//! Track records arrive in collection order. The table joins them against
//! the playlist order, labels each row with its 1-based playlist position,
//! drops tempo placeholders and keeps only the requested columns.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::track::{Cell, TrackRecord};

/// Rows with a tempo below this are placeholders, not songs
pub const MIN_BPM: i64 = 1;

/// One playlist entry that survived filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRow {
    /// 1-based position in the playlist, assigned before filtering
    pub position: usize,
    /// Values aligned with [`ResultTable::columns`]
    pub cells: Vec<Cell>,
}

/// Final table handed to exporters and chart preparation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::UnknownColumn(column.to_string()))
    }

    /// All values of one column, in row order
    pub fn column(&self, column: &str) -> Result<Vec<&Cell>> {
        let index = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| &row.cells[index]).collect())
    }
}

/// Index records by id, rejecting duplicates
pub fn index_records(records: Vec<TrackRecord>) -> Result<HashMap<i64, TrackRecord>> {
    let mut index = HashMap::with_capacity(records.len());
    for record in records {
        match index.entry(record.track_id) {
            Entry::Occupied(_) => {
                return Err(Error::DataIntegrity(format!(
                    "Track ID {} appears more than once",
                    record.track_id
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }
    Ok(index)
}

/// Join records against `order` and project onto `columns`
///
/// Every id in `order` must resolve; the first that does not fails the
/// whole build with [`Error::Lookup`].
pub fn build_result_table(
    records: Vec<TrackRecord>,
    order: &[i64],
    columns: &[String],
) -> Result<ResultTable> {
    let index = index_records(records)?;

    let projected = order
        .iter()
        .map(|id| index.get(id).ok_or(Error::Lookup(*id)))
        .collect::<Result<Vec<&TrackRecord>>>()?;

    let mut rows = Vec::with_capacity(projected.len());
    for (offset, record) in projected.into_iter().enumerate() {
        if record.bpm < MIN_BPM {
            continue;
        }
        let cells = columns
            .iter()
            .map(|column| {
                record
                    .cell(column)
                    .ok_or_else(|| Error::UnknownColumn(column.clone()))
            })
            .collect::<Result<Vec<Cell>>>()?;
        rows.push(ResultRow {
            position: offset + 1,
            cells,
        });
    }

    debug!(
        "Built table: {} of {} playlist entries kept",
        rows.len(),
        order.len()
    );

    Ok(ResultTable {
        columns: columns.to_vec(),
        rows,
    })
}
