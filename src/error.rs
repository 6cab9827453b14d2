// src/error.rs

use thiserror::Error;

use crate::engine_lib::polygon::PolygonId;

/// Failures of the durable key-value storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage rejected write for key `{key}`")]
    Rejected { key: String },
}

/// Why a vertex ring cannot become a polygon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RingDefect {
    #[error("a polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),
    #[error("vertex {0} has a non-finite coordinate")]
    NonFinite(usize),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid polygon: {0}")]
    InvalidGeometry(#[from] RingDefect),
    #[error("no polygon with id {0}")]
    NotFound(PolygonId),
    /// The in-memory change was applied; only the write failed.
    #[error("failed to persist polygons: {0}")]
    Persistence(#[from] StorageError),
    #[error("stored polygon data is malformed: {0}")]
    MalformedStoredData(#[source] serde_json::Error),
    #[error("could not encode polygons: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
