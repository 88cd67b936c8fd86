//! Error types for tactile-midi

use thiserror::Error;

/// Result type alias for tactile-midi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tactile-midi
///
/// Grid lookups with out-of-range indices are deliberately absent: they are
/// logic bugs and panic in [`crate::grid::NoteGrid::note_at`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// MIDI backend error
    #[error("MIDI error: {0}")]
    Midi(String),

    /// A sensor frame or observation batch that does not fit the configured matrix
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
