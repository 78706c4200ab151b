//! Track record data structures
//!
//! A [`RawRecord`] is what extraction produces: every requested field as an
//! untyped string. [`TrackRecord::coerce`] turns it into the typed record the
//! reporting stages work with.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

pub const TRACK_ID: &str = "Track ID";
pub const NAME: &str = "Name";
pub const ARTIST: &str = "Artist";
pub const SORT_ARTIST: &str = "Sort Artist";
pub const GROUPING: &str = "Grouping";
pub const COMMENTS: &str = "Comments";
pub const BPM: &str = "BPM";
pub const RATING: &str = "Rating";
pub const RELEASE_DATE: &str = "Release Date";
/// Derived from [`RATING`]
pub const ENERGY: &str = "Energy";

/// Highest value of the source rating scale
const RATING_MAX: i64 = 100;
/// Highest value of the energy scale
const ENERGY_MAX: i64 = 5;

/// Untyped field map for one track, straight from the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    /// Field value, `""` when the field was not extracted
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Typed track record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    /// Unique key within the track collection
    pub track_id: i64,
    /// Tempo, 0 when the source has none
    pub bpm: i64,
    /// `"n/5"`, empty when the source has no rating
    pub energy: String,
    /// Every other requested field, verbatim
    pub attributes: HashMap<String, String>,
}

impl TrackRecord {
    /// Coerce a raw record, deriving [`ENERGY`] and dropping [`RATING`]
    pub fn coerce(raw: RawRecord) -> Result<Self> {
        let track_id = parse_track_id(raw.get(TRACK_ID))?;
        let bpm = parse_bpm(raw.get(BPM)).map_err(|e| annotate(track_id, e))?;
        let energy = derive_energy(raw.get(RATING)).map_err(|e| annotate(track_id, e))?;

        let mut attributes = raw.fields;
        for typed in [TRACK_ID, BPM, RATING] {
            attributes.remove(typed);
        }

        Ok(Self {
            track_id,
            bpm,
            energy,
            attributes,
        })
    }

    /// Pass-through attribute, `""` when absent
    pub fn attribute(&self, field: &str) -> &str {
        self.attributes.get(field).map(String::as_str).unwrap_or("")
    }

    /// Value of an output column, `None` if this record has no such column
    pub fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            TRACK_ID => Some(Cell::Integer(self.track_id)),
            BPM => Some(Cell::Integer(self.bpm)),
            ENERGY => Some(Cell::Text(self.energy.clone())),
            _ => self.attributes.get(column).cloned().map(Cell::Text),
        }
    }
}

fn annotate(track_id: i64, e: Error) -> Error {
    match e {
        Error::DataIntegrity(msg) => Error::DataIntegrity(format!("track {}: {}", track_id, msg)),
        other => other,
    }
}

/// Parse a required `Track ID`
pub fn parse_track_id(text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::DataIntegrity("record has no Track ID".into()));
    }
    text.parse()
        .map_err(|_| Error::DataIntegrity(format!("Track ID {:?} is not an integer", text)))
}

/// Parse an optional `BPM`, 0 when empty
pub fn parse_bpm(text: &str) -> Result<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| Error::DataIntegrity(format!("BPM {:?} is not an integer", text)))
}

/// Map a 0-100 rating onto the 0-5 energy scale as `"n/5"`
///
/// An empty rating yields an empty energy. The level is floored, so a
/// rating of 99 is still `"4/5"`.
pub fn derive_energy(rating: &str) -> Result<String> {
    let rating = rating.trim();
    if rating.is_empty() {
        return Ok(String::new());
    }

    let value: i64 = rating
        .parse()
        .map_err(|_| Error::DataIntegrity(format!("Rating {:?} is not an integer", rating)))?;
    if !(0..=RATING_MAX).contains(&value) {
        return Err(Error::DataIntegrity(format!(
            "Rating {} is outside 0..={}",
            value, RATING_MAX
        )));
    }

    Ok(format!("{}/{}", value * ENERGY_MAX / RATING_MAX, ENERGY_MAX))
}

/// Parse the level out of an `"n/5"` energy string, 0 when empty
pub fn energy_level(energy: &str) -> u8 {
    energy
        .split('/')
        .next()
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

/// One value of a result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Text(String),
}

impl Cell {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Integer(n) => Some(*n),
            Cell::Text(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_energy_derivation() {
        assert_eq!(derive_energy("80").unwrap(), "4/5");
        assert_eq!(derive_energy("100").unwrap(), "5/5");
        assert_eq!(derive_energy("0").unwrap(), "0/5");
        assert_eq!(derive_energy("99").unwrap(), "4/5");
        assert_eq!(derive_energy("").unwrap(), "");
    }

    #[test]
    fn test_energy_rejects_bad_rating() {
        assert!(matches!(derive_energy("high"), Err(Error::DataIntegrity(_))));
        assert!(matches!(derive_energy("120"), Err(Error::DataIntegrity(_))));
        assert!(matches!(derive_energy("-20"), Err(Error::DataIntegrity(_))));
    }

    #[test]
    fn test_bpm_coercion() {
        assert_eq!(parse_bpm("").unwrap(), 0);
        assert_eq!(parse_bpm("128").unwrap(), 128);
        assert!(matches!(parse_bpm("fast"), Err(Error::DataIntegrity(_))));
    }

    #[test]
    fn test_track_id_required() {
        assert_eq!(parse_track_id("42").unwrap(), 42);
        assert!(matches!(parse_track_id(""), Err(Error::DataIntegrity(_))));
        assert!(matches!(parse_track_id("4x"), Err(Error::DataIntegrity(_))));
    }

    #[test]
    fn test_coerce_drops_rating() {
        let record = TrackRecord::coerce(raw(&[
            (TRACK_ID, "7"),
            (NAME, "Jumpin' at the Woodside"),
            (BPM, "180"),
            (RATING, "60"),
            (COMMENTS, ""),
        ]))
        .unwrap();

        assert_eq!(record.track_id, 7);
        assert_eq!(record.bpm, 180);
        assert_eq!(record.energy, "3/5");
        assert_eq!(record.attribute(NAME), "Jumpin' at the Woodside");
        assert_eq!(record.attribute(COMMENTS), "");
        assert!(!record.attributes.contains_key(RATING));
        assert_eq!(record.cell(RATING), None);
    }

    #[test]
    fn test_coerce_error_names_track() {
        let err = TrackRecord::coerce(raw(&[(TRACK_ID, "9"), (RATING, "loud")])).unwrap_err();
        assert!(err.to_string().contains("track 9"));
    }

    #[test]
    fn test_cells() {
        let record = TrackRecord::coerce(raw(&[(TRACK_ID, "3"), (ARTIST, "Basie")])).unwrap();
        assert_eq!(record.cell(TRACK_ID), Some(Cell::Integer(3)));
        assert_eq!(record.cell(BPM), Some(Cell::Integer(0)));
        assert_eq!(record.cell(ENERGY), Some(Cell::Text(String::new())));
        assert_eq!(record.cell(ARTIST), Some(Cell::Text("Basie".into())));
        assert_eq!(record.cell(GROUPING), None);
    }

    #[test]
    fn test_energy_level() {
        assert_eq!(energy_level("4/5"), 4);
        assert_eq!(energy_level(""), 0);
    }
}
