// Error types for the fallible boundary of the crate.
//
// The engine itself does not return errors: misuse (invalid coordinates,
// door operations on non-doors, conflicting batch edits) panics, and
// "no path" is an ordinary value. Only the edges where outside data enters
// the crate (map text, config JSON, files) produce these errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to parse the map text format. Lines and columns are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapParseError {
    #[error("map text contains no cells")]
    Empty,

    #[error("unknown glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        line: usize,
        column: usize,
        glyph: char,
    },

    #[error("map {axis} count {count} exceeds {max}")]
    TooLarge {
        axis: &'static str,
        count: usize,
        max: usize,
    },

    #[error("layer {layer} has {found} rows, expected {expected}")]
    RaggedLayer {
        layer: usize,
        expected: usize,
        found: usize,
    },
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure to load a map into a cache.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] MapParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
