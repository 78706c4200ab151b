//! Library document sections
//!
//! An export carries two sections this crate reads:
//! - `Tracks`: a dict of track dicts keyed by id, in declaration order
//! - `Playlists`: an array of playlist dicts, each with an ordered
//!   `Playlist Items` array of `{ Track ID }` dicts

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::field::extract_field;
use crate::plist::{Dict, Value};
use crate::track::{self, RawRecord};

pub const TRACKS_KEY: &str = "Tracks";
pub const PLAYLISTS_KEY: &str = "Playlists";
pub const PLAYLIST_ITEMS_KEY: &str = "Playlist Items";

/// Per-track dicts of the track collection, in document order
pub fn track_blocks(document: &Dict) -> Result<Vec<&Dict>> {
    let tracks = document
        .get(TRACKS_KEY)
        .ok_or_else(|| Error::Format(format!("missing `{}` section", TRACKS_KEY)))?
        .as_dict()
        .ok_or_else(|| Error::Format(format!("`{}` is not a dict", TRACKS_KEY)))?;

    if !document.contains_key(PLAYLISTS_KEY) {
        return Err(Error::Format(format!("missing `{}` section", PLAYLISTS_KEY)));
    }

    let blocks: Vec<&Dict> = tracks
        .iter()
        .filter_map(|(key, value)| match value.as_dict() {
            Some(block) => Some(block),
            None => {
                warn!("Skipping {} entry {:?} in `{}`", value.kind_name(), key, TRACKS_KEY);
                None
            }
        })
        .collect();

    debug!("Found {} track blocks", blocks.len());
    Ok(blocks)
}

/// Track ids of the playlist, in playlist order with repeats kept
///
/// Only the first playlist that has items is read.
pub fn playlist_order(document: &Dict) -> Result<Vec<i64>> {
    let items = document
        .get(PLAYLISTS_KEY)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_dict)
        .find_map(|playlist| playlist.get(PLAYLIST_ITEMS_KEY))
        .ok_or_else(|| Error::Format(format!("missing `{}` section", PLAYLIST_ITEMS_KEY)))?
        .as_array()
        .ok_or_else(|| Error::Format(format!("`{}` is not an array", PLAYLIST_ITEMS_KEY)))?;

    let order = items
        .iter()
        .filter_map(Value::as_dict)
        .enumerate()
        .map(|(index, item)| {
            track::parse_track_id(&extract_field(item, track::TRACK_ID)).map_err(|e| match e {
                Error::DataIntegrity(msg) => {
                    Error::DataIntegrity(format!("playlist item {}: {}", index + 1, msg))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<i64>>>()?;

    debug!("Playlist has {} items", order.len());
    Ok(order)
}

/// Extract `fields` from every block, one raw record per block
pub fn assemble_records(blocks: &[&Dict], fields: &[String]) -> Vec<RawRecord> {
    blocks
        .iter()
        .map(|block| {
            fields
                .iter()
                .map(|field| (field.as_str(), extract_field(block, field)))
                .collect()
        })
        .collect()
}
