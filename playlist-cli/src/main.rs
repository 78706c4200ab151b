//! Playlist report CLI
//!
//! Reads an exported music-library playlist, writes the ordered track table
//! as a spreadsheet and prepares tempo/energy chart data beside it.

mod config;
mod export;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use playlist_core::{Error as CoreError, FieldSelection, FlowChart, ResultTable, TempoRangeChart};

use config::{derived_path, parse_field_list, ChartPaths, Config, ExportFormat};

#[derive(Parser)]
#[command(name = "plx")]
#[command(about = "Turn a music-library playlist export into a tempo/energy report")]
#[command(version)]
struct Cli {
    /// Exported playlist document (plist XML)
    #[arg(default_value = "playlist.xml")]
    file: PathBuf,

    /// Comma-separated fields to read from each track
    #[arg(long)]
    fields: Option<String>,

    /// Comma-separated report columns, in order
    #[arg(long)]
    columns: Option<String>,

    /// Spreadsheet format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Spreadsheet path (defaults to the input path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip chart data
    #[arg(long)]
    no_charts: bool,

    /// Print the table to stdout
    #[arg(short, long)]
    list: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let defaults = FieldSelection::default();
        let selection = FieldSelection::new(
            cli.fields
                .as_deref()
                .map(parse_field_list)
                .unwrap_or(defaults.requested_fields),
            cli.columns
                .as_deref()
                .map(parse_field_list)
                .unwrap_or(defaults.output_columns),
        );
        let spreadsheet_path = cli
            .output
            .unwrap_or_else(|| derived_path(&cli.file, "", cli.format.extension()));
        let charts = (!cli.no_charts).then(|| ChartPaths::beside(&cli.file));

        Config {
            input: cli.file,
            selection,
            format: cli.format,
            spreadsheet_path,
            charts,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let list = cli.list;
    let config = Config::from(cli);
    let table = run(&config)?;

    if list {
        print_table(&table);
    }

    Ok(())
}

fn run(config: &Config) -> anyhow::Result<ResultTable> {
    info!("Reading playlist {:?}", config.input);
    let document = fs::read_to_string(&config.input)
        .with_context(|| format!("Cannot read {:?}", config.input))?;

    let table = playlist_core::extract(&document, &config.selection)
        .with_context(|| format!("Cannot extract playlist from {:?}", config.input))?;

    export::write_spreadsheet(&table, &config.spreadsheet_path, config.format)?;
    info!("Spreadsheet: {:?} ({} tracks)", config.spreadsheet_path, table.len());

    if let Some(charts) = &config.charts {
        write_charts(&table, charts)?;
    }

    Ok(table)
}

fn write_charts(table: &ResultTable, paths: &ChartPaths) -> anyhow::Result<()> {
    match FlowChart::from_table(table) {
        Ok(flow) => {
            export::write_chart(&flow, &paths.flow)?;
            info!("Flow chart data: {:?}", paths.flow);
        }
        Err(CoreError::UnknownColumn(column)) => {
            warn!("Skipping flow chart: report has no {:?} column", column);
        }
        Err(e) => return Err(e.into()),
    }

    match TempoRangeChart::from_table(table) {
        Ok(ranges) => {
            export::write_chart(&ranges, &paths.tempo_ranges)?;
            info!("Tempo range chart data: {:?}", paths.tempo_ranges);
        }
        Err(CoreError::UnknownColumn(column)) => {
            warn!("Skipping tempo range chart: report has no {:?} column", column);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_table(table: &ResultTable) {
    let lookup = |name: &str| table.column_index(name).ok();
    let (name, artist) = (lookup("Name"), lookup("Artist"));
    let (bpm, energy) = (lookup("BPM"), lookup("Energy"));

    println!("\nTracks:");
    for row in &table.rows {
        let cell = |index: Option<usize>, fallback: &str| {
            index
                .map(|i| row.cells[i].to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        println!(
            "  {:3}. {} - {} [{} BPM, {}]",
            row.position,
            cell(artist, "?"),
            cell(name, "?"),
            cell(bpm, "?"),
            cell(energy, "-"),
        );
    }
}
