use thiserror::Error;

use crate::{Minutes, StationId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Geometry degenerated for station {station} at {duration} min: {reason}")]
    GeometricDegeneracy {
        station: StationId,
        duration: Minutes,
        reason: String,
    },
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Unknown station {0}")]
    UnknownStation(StationId),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}

impl Error {
    /// Whether retrying the same station later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::IoError(_))
    }
}
