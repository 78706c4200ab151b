//! Error types for playlist-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required anchor (`Tracks`, `Playlists`, `Playlist Items`) is missing,
    /// or the document is not well-formed enough to reach it
    #[error("Format error: {0}")]
    Format(String),

    #[error("Lookup error: track {0} is in the playlist but not in the track collection")]
    Lookup(i64),

    #[error("Data integrity fault: {0}")]
    DataIntegrity(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Rescale error: {0}")]
    Rescale(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Format(format!("malformed document: {}", e))
    }
}
