//! Error types for the fallible edges of the crate.
//!
//! The routing, scoring and flow code never fails: an infeasible network is
//! just a zero flow. Errors only come from loading files and from snapshots
//! that describe an impossible world.

use std::path::PathBuf;

use thiserror::Error;

use crate::world::{CityId, Coord, UnitId};

/// Problems found while turning a snapshot into a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Width or height is zero.
    #[error("map dimensions must be non-zero, got {width}x{height}")]
    EmptyMap {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// A position lies outside the map.
    #[error("{what} at {coord} is outside the {width}x{height} map")]
    OutOfBounds {
        /// What was being placed.
        what: &'static str,
        /// Offending position.
        coord: Coord,
        /// Map width.
        width: u16,
        /// Map height.
        height: u16,
    },
    /// Two things claim the same cell.
    #[error("cell {coord} already holds {existing}, cannot place {placed}")]
    CellTaken {
        /// Contested position.
        coord: Coord,
        /// What was there first.
        existing: &'static str,
        /// What was being placed.
        placed: &'static str,
    },
    /// Two units share an id.
    #[error("duplicate unit id {0}")]
    DuplicateUnit(UnitId),
    /// Two cities share an id.
    #[error("duplicate city id {0}")]
    DuplicateCity(CityId),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A JSON document could not be decoded or encoded.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The snapshot describes an impossible world.
    #[error("invalid snapshot: {0}")]
    World(#[from] WorldError),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Read and decode a JSON file.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode a value as pretty JSON and write it to a file.
pub(crate) fn write_json<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
