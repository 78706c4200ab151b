//! Report file generation
//!
//! Writes the result table as a spreadsheet and the chart data as JSON:
//! - `<stem>.csv` (or `.json`): one row per track, 1-based playlist
//!   position in the first column
//! - `<stem>_flow.json`: tempo/energy flow series
//! - `<stem>_bpm_energy_count.json`: tempo range counts by energy

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use playlist_core::{Cell, ResultTable};

use crate::config::ExportFormat;

/// Header of the position column
const POSITION_HEADER: &str = "";

/// Write `table` to `path` in `format`
pub fn write_spreadsheet(
    table: &ResultTable,
    path: &Path,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let writer = create(path)?;
    match format {
        ExportFormat::Csv => write_csv(table, writer),
        ExportFormat::Json => write_json(table, writer),
    }
    .with_context(|| format!("Cannot write spreadsheet {:?}", path))?;

    debug!("Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}

pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let header = std::iter::once(POSITION_HEADER).chain(table.columns.iter().map(String::as_str));
    csv.write_record(header)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(row.position.to_string());
        record.extend(row.cells.iter().map(Cell::to_string));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Array of `{ "position": n, <column>: <value>, ... }` objects
pub fn write_json<W: Write>(table: &ResultTable, mut writer: W) -> anyhow::Result<()> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            object.insert("position".into(), Value::from(row.position));
            for (column, cell) in table.columns.iter().zip(&row.cells) {
                let value = match cell {
                    Cell::Integer(n) => Value::from(*n),
                    Cell::Text(s) => Value::from(s.as_str()),
                };
                object.insert(column.clone(), value);
            }
            Value::Object(object)
        })
        .collect();

    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.flush()?;
    Ok(())
}

/// Write any chart data as pretty JSON
pub fn write_chart<T: Serialize>(chart: &T, path: &Path) -> anyhow::Result<()> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, chart)
        .with_context(|| format!("Cannot write chart data {:?}", path))?;
    writer.flush()?;
    debug!("Wrote chart data to {:?}", path);
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Cannot create {:?}", path))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlist_core::ResultRow;
    use tempfile::TempDir;

    fn sample_table() -> ResultTable {
        ResultTable {
            columns: vec!["Name".into(), "BPM".into(), "Energy".into()],
            rows: vec![
                ResultRow {
                    position: 2,
                    cells: vec![
                        Cell::Text("Shiny Stockings".into()),
                        Cell::Integer(150),
                        Cell::Text("4/5".into()),
                    ],
                },
                ResultRow {
                    position: 3,
                    cells: vec![
                        Cell::Text("One O'Clock Jump, live".into()),
                        Cell::Integer(170),
                        Cell::Text(String::new()),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_csv(&sample_table(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ",Name,BPM,Energy");
        assert_eq!(lines[1], "2,Shiny Stockings,150,4/5");
        assert_eq!(lines[2], "3,\"One O'Clock Jump, live\",170,");
    }

    #[test]
    fn test_json_rows() {
        let mut out = Vec::new();
        write_json(&sample_table(), &mut out).unwrap();

        let rows: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["position"], 2);
        assert_eq!(rows[0]["BPM"], 150);
        assert_eq!(rows[0]["Energy"], "4/5");
        assert_eq!(rows[1]["Energy"], "");
    }

    #[test]
    fn test_write_spreadsheet_creates_parent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("reports").join("lindy.csv");

        write_spreadsheet(&sample_table(), &path, ExportFormat::Csv).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(",Name,BPM,Energy"));
    }

    #[test]
    fn test_write_chart() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("flow.json");
        let table = ResultTable {
            columns: vec!["Name".into(), "BPM".into(), "Energy".into(), "Comments".into()],
            rows: vec![ResultRow {
                position: 1,
                cells: vec![
                    Cell::Text("A".into()),
                    Cell::Integer(120),
                    Cell::Text("3/5".into()),
                    Cell::Text("bright".into()),
                ],
            }],
        };
        let chart = playlist_core::FlowChart::from_table(&table).unwrap();

        write_chart(&chart, &path).unwrap();

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["points"][0]["brightness"], "bright");
        assert_eq!(value["highest"]["bpm"], 120);
    }
}
