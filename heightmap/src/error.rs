//! Error types for the heightmap library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when querying elevation sources.
///
/// Missing data is not an error: a missing tile file, a coordinate outside a
/// dataset's extent or a failed projection all produce a NODATA result
/// instead. Errors are reserved for invalid input and broken deployments.
#[derive(Error, Debug)]
pub enum HeightError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Latitude or longitude outside the WGS84 range.
    #[error("Invalid coordinates: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A grid file whose size does not match its declared dimensions.
    #[error("Invalid file size for {path}: {size} bytes (expected {expected})")]
    InvalidFileSize {
        path: PathBuf,
        size: u64,
        expected: u64,
    },

    /// A tile the min/max cache knows about is absent on disk.
    #[error("Tile {name} is listed in the min/max cache but missing on disk: {path}")]
    MissingTile { name: String, path: PathBuf },

    /// The min/max cache is missing or disagrees with the tiles on disk.
    #[error("Min/max cache of {dataset} is inconsistent: {reason}")]
    CacheInconsistent { dataset: String, reason: String },

    /// The min/max cache file is not valid JSON of the expected shape.
    #[error("Failed to parse min/max cache {path}: {source}")]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A projection definition was rejected by the projection library.
    #[error("Projection {crs} could not be initialised: {message}")]
    Projection { crs: &'static str, message: String },

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using [`HeightError`].
pub type Result<T> = std::result::Result<T, HeightError>;
