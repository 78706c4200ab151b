//! Chart data preparation
//!
//! Two views of a result table, ready for any plotting front end:
//! - [`FlowChart`]: tempo and energy along the playlist, with
//!   brightness markers taken from the comments
//! - [`TempoRangeChart`]: track counts per 5-BPM range, stacked by energy

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::rescale::rescale;
use crate::table::ResultTable;
use crate::track::{energy_level, Cell, BPM, COMMENTS, ENERGY, NAME};

/// Axis range shared by scaled tempo and energy on the flow chart
pub const FLOW_AXIS_MIN: f64 = 1.0;
pub const FLOW_AXIS_MAX: f64 = 5.0;

/// Lower bound (exclusive) of the first tempo range
pub const TEMPO_RANGE_START: i64 = 105;
/// Upper bound (inclusive) of the last tempo range
pub const TEMPO_RANGE_END: i64 = 205;
pub const TEMPO_RANGE_STEP: i64 = 5;

/// Mood marker from the first comma-separated token of a track's comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Brightness {
    Bright,
    Dark,
}

impl Brightness {
    pub fn from_comments(comments: &str) -> Option<Self> {
        match comments.split(',').next().map(str::trim) {
            Some("bright") => Some(Brightness::Bright),
            Some("dark") => Some(Brightness::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPoint {
    pub position: usize,
    pub name: String,
    pub bpm: i64,
    /// Tempo relative to the playlist mean, mapped onto the energy axis
    pub bpm_scaled: f64,
    pub energy_level: u8,
    pub brightness: Option<Brightness>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BpmExtreme {
    pub position: usize,
    pub bpm: i64,
}

/// Tempo/energy line chart data
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowChart {
    pub points: Vec<FlowPoint>,
    pub lowest: Option<BpmExtreme>,
    pub highest: Option<BpmExtreme>,
}

impl FlowChart {
    /// Needs the `Name`, `BPM`, `Energy` and `Comments` columns
    pub fn from_table(table: &ResultTable) -> Result<Self> {
        let names = table.column(NAME)?;
        let bpms: Vec<i64> = table
            .column(BPM)?
            .into_iter()
            .map(|cell| cell.as_integer().unwrap_or(0))
            .collect();
        let energies = table.column(ENERGY)?;
        let comments = table.column(COMMENTS)?;

        if bpms.is_empty() {
            return Ok(Self::default());
        }

        let scaled = scale_tempo(&bpms)?;

        let points = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| FlowPoint {
                position: row.position,
                name: names[i].to_string(),
                bpm: bpms[i],
                bpm_scaled: scaled[i],
                energy_level: energy_level(&energies[i].to_string()),
                brightness: Brightness::from_comments(&comments[i].to_string()),
            })
            .collect::<Vec<_>>();

        let lowest = extreme(&points, |candidate, best| candidate < best);
        let highest = extreme(&points, |candidate, best| candidate > best);

        Ok(Self {
            points,
            lowest,
            highest,
        })
    }
}

/// Divide by the mean, then rescale onto the flow axis
///
/// A constant tempo has no range to rescale; every point is placed on the
/// middle of the axis instead.
fn scale_tempo(bpms: &[i64]) -> Result<Vec<f64>> {
    let mean = bpms.iter().map(|&bpm| bpm as f64).sum::<f64>() / bpms.len() as f64;
    let relative: Vec<f64> = bpms.iter().map(|&bpm| bpm as f64 / mean).collect();

    match rescale(&relative, FLOW_AXIS_MIN, FLOW_AXIS_MAX) {
        Ok(scaled) => Ok(scaled),
        Err(Error::Rescale(reason)) => {
            debug!("Tempo not rescaled ({}), centring points", reason);
            Ok(vec![(FLOW_AXIS_MIN + FLOW_AXIS_MAX) / 2.0; bpms.len()])
        }
        Err(e) => Err(e),
    }
}

/// First point whose tempo beats every earlier one under `better`
fn extreme(points: &[FlowPoint], better: impl Fn(i64, i64) -> bool) -> Option<BpmExtreme> {
    points
        .iter()
        .fold(None, |best: Option<BpmExtreme>, point| match best {
            Some(b) if !better(point.bpm, b.bpm) => Some(b),
            _ => Some(BpmExtreme {
                position: point.position,
                bpm: point.bpm,
            }),
        })
}

/// One right-closed tempo range `(lower, upper]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempoBucket {
    pub lower: i64,
    pub upper: i64,
    pub label: String,
    /// Track counts aligned with [`TempoRangeChart::energy_levels`]
    pub counts: Vec<usize>,
}

/// Stacked horizontal bar chart data: tempo ranges by energy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TempoRangeChart {
    /// Distinct non-empty energy values, sorted
    pub energy_levels: Vec<String>,
    pub buckets: Vec<TempoBucket>,
}

impl TempoRangeChart {
    /// Needs the `BPM` and `Energy` columns; rows without energy are left out
    pub fn from_table(table: &ResultTable) -> Result<Self> {
        let bpms = table.column(BPM)?;
        let energies = table.column(ENERGY)?;

        let rated: Vec<(i64, &str)> = bpms
            .iter()
            .zip(energies.iter())
            .filter_map(|(bpm, energy)| match (bpm, energy) {
                (Cell::Integer(bpm), Cell::Text(energy)) if !energy.is_empty() => {
                    Some((*bpm, energy.as_str()))
                }
                _ => None,
            })
            .collect();

        let energy_levels: Vec<String> = rated
            .iter()
            .map(|(_, energy)| *energy)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();

        let mut buckets: Vec<TempoBucket> = (TEMPO_RANGE_START..TEMPO_RANGE_END)
            .step_by(TEMPO_RANGE_STEP as usize)
            .map(|lower| {
                let upper = lower + TEMPO_RANGE_STEP;
                TempoBucket {
                    lower,
                    upper,
                    label: format!("({}, {}]", lower, upper),
                    counts: vec![0; energy_levels.len()],
                }
            })
            .collect();

        let mut out_of_range = 0;
        for (bpm, energy) in rated {
            let Some(bucket) = bucket_index(bpm) else {
                out_of_range += 1;
                continue;
            };
            if let Some(level) = energy_levels.iter().position(|e| e == energy) {
                buckets[bucket].counts[level] += 1;
            }
        }
        if out_of_range > 0 {
            debug!("{} rated tracks fall outside the tempo ranges", out_of_range);
        }

        Ok(Self {
            energy_levels,
            buckets,
        })
    }
}

/// Index of the range containing `bpm`, if any
fn bucket_index(bpm: i64) -> Option<usize> {
    if bpm <= TEMPO_RANGE_START || bpm > TEMPO_RANGE_END {
        return None;
    }
    Some(((bpm - TEMPO_RANGE_START - 1) / TEMPO_RANGE_STEP) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ResultRow;

    fn table(rows: &[(&str, i64, &str, &str)]) -> ResultTable {
        ResultTable {
            columns: [NAME, BPM, ENERGY, COMMENTS].map(String::from).to_vec(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (name, bpm, energy, comments))| ResultRow {
                    position: i + 1,
                    cells: vec![
                        Cell::Text(name.to_string()),
                        Cell::Integer(*bpm),
                        Cell::Text(energy.to_string()),
                        Cell::Text(comments.to_string()),
                    ],
                })
                .collect(),
        }
    }

    #[test]
    fn test_brightness_from_comments() {
        assert_eq!(Brightness::from_comments("bright, brassy"), Some(Brightness::Bright));
        assert_eq!(Brightness::from_comments("dark"), Some(Brightness::Dark));
        assert_eq!(Brightness::from_comments("brassy, bright"), None);
        assert_eq!(Brightness::from_comments(""), None);
    }

    #[test]
    fn test_brightness_token_is_trimmed() {
        assert_eq!(Brightness::from_comments(" bright , swing"), Some(Brightness::Bright));
        assert_eq!(Brightness::from_comments("\tdark"), Some(Brightness::Dark));
        assert_eq!(Brightness::from_comments("Bright"), None);
        assert_eq!(Brightness::from_comments("brightish"), None);
    }

    #[test]
    fn test_flow_chart() {
        let t = table(&[
            ("A", 100, "2/5", "dark"),
            ("B", 200, "", "bright, fast"),
            ("C", 150, "4/5", ""),
            ("D", 100, "3/5", ""),
        ]);
        let chart = FlowChart::from_table(&t).unwrap();

        let scaled: Vec<f64> = chart.points.iter().map(|p| p.bpm_scaled).collect();
        assert_eq!(scaled.len(), 4);
        assert!((scaled[0] - 1.0).abs() < 1e-9);
        assert!((scaled[1] - 5.0).abs() < 1e-9);
        assert!((scaled[2] - 3.0).abs() < 1e-9);

        let levels: Vec<u8> = chart.points.iter().map(|p| p.energy_level).collect();
        assert_eq!(levels, vec![2, 0, 4, 3]);

        assert_eq!(chart.points[0].brightness, Some(Brightness::Dark));
        assert_eq!(chart.points[1].brightness, Some(Brightness::Bright));
        assert_eq!(chart.points[2].brightness, None);

        assert_eq!(chart.lowest, Some(BpmExtreme { position: 1, bpm: 100 }));
        assert_eq!(chart.highest, Some(BpmExtreme { position: 2, bpm: 200 }));
    }

    #[test]
    fn test_flow_chart_constant_tempo() {
        let t = table(&[("A", 120, "1/5", ""), ("B", 120, "2/5", "")]);
        let chart = FlowChart::from_table(&t).unwrap();
        assert!(chart.points.iter().all(|p| p.bpm_scaled == 3.0));
    }

    #[test]
    fn test_flow_chart_huge_tempo() {
        let t = table(&[("A", i64::MAX, "1/5", ""), ("B", 120, "2/5", "")]);
        let chart = FlowChart::from_table(&t).unwrap();

        assert!((chart.points[0].bpm_scaled - 5.0).abs() < 1e-9);
        assert!((chart.points[1].bpm_scaled - 1.0).abs() < 1e-9);
        assert_eq!(chart.highest, Some(BpmExtreme { position: 1, bpm: i64::MAX }));
    }

    #[test]
    fn test_flow_chart_empty_table() {
        let chart = FlowChart::from_table(&table(&[])).unwrap();
        assert!(chart.points.is_empty());
        assert!(chart.lowest.is_none());
    }

    #[test]
    fn test_flow_chart_needs_columns() {
        let mut t = table(&[("A", 120, "1/5", "")]);
        t.columns[3] = "Grouping".into();
        assert!(matches!(FlowChart::from_table(&t), Err(Error::UnknownColumn(_))));
    }

    #[test]
    fn test_tempo_buckets() {
        assert_eq!(bucket_index(105), None);
        assert_eq!(bucket_index(106), Some(0));
        assert_eq!(bucket_index(110), Some(0));
        assert_eq!(bucket_index(111), Some(1));
        assert_eq!(bucket_index(205), Some(19));
        assert_eq!(bucket_index(206), None);
    }

    #[test]
    fn test_tempo_range_chart() {
        let t = table(&[
            ("A", 110, "3/5", ""),
            ("B", 108, "4/5", ""),
            ("C", 120, "3/5", ""),
            ("D", 119, "", ""),
            ("E", 250, "5/5", ""),
        ]);
        let chart = TempoRangeChart::from_table(&t).unwrap();

        assert_eq!(chart.energy_levels, vec!["3/5", "4/5", "5/5"]);
        assert_eq!(chart.buckets.len(), 20);
        assert_eq!(chart.buckets[0].label, "(105, 110]");
        assert_eq!(chart.buckets[0].counts, vec![1, 1, 0]);
        assert_eq!(chart.buckets[2].label, "(115, 120]");
        assert_eq!(chart.buckets[2].counts, vec![1, 0, 0]);

        let total: usize = chart.buckets.iter().flat_map(|b| &b.counts).sum();
        assert_eq!(total, 3);
    }
}
