//! Report configuration

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use playlist_core::FieldSelection;

/// Spreadsheet output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Exported playlist document
    pub input: PathBuf,
    pub selection: FieldSelection,
    pub format: ExportFormat,
    /// Spreadsheet destination
    pub spreadsheet_path: PathBuf,
    /// Chart data destinations, `None` when charts are disabled
    pub charts: Option<ChartPaths>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub flow: PathBuf,
    pub tempo_ranges: PathBuf,
}

impl ChartPaths {
    /// `<stem>_flow.json` and `<stem>_bpm_energy_count.json` beside the input
    pub fn beside(input: &Path) -> Self {
        Self {
            flow: derived_path(input, "_flow", "json"),
            tempo_ranges: derived_path(input, "_bpm_energy_count", "json"),
        }
    }
}

/// Sibling of `input` named `<stem><suffix>.<extension>`
pub fn derived_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "playlist".to_string());
    input.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

/// Split a comma-separated field list, dropping blanks
pub fn parse_field_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect()
}
