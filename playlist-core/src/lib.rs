//! playlist-core: playlist extraction from music-library plist exports
//!
//! This crate provides:
//! - a plist XML parser producing an ordered key/value tree
//! - tolerant track field extraction and playlist order resolution
//! - typed track records with derived energy
//! - the playlist-ordered, tempo-filtered result table
//! - chart data (tempo/energy flow, tempo ranges) built on min-max rescaling

pub mod chart;
pub mod error;
pub mod field;
pub mod library;
pub mod pipeline;
pub mod plist;
pub mod rescale;
pub mod table;
pub mod track;

pub use chart::{FlowChart, TempoRangeChart};
pub use error::{Error, Result};
pub use pipeline::{extract, FieldSelection};
pub use rescale::rescale;
pub use table::{ResultRow, ResultTable};
pub use track::{Cell, TrackRecord};
