use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::storage::GraphSource;
use crate::{DirectTime, EdgeSource, Error, Minutes, Station, StationId};

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: StationId,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct DirectTimeRecord {
    from_station_id: StationId,
    to_station_id: StationId,
    duration: Minutes,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    source: Option<String>,
}

fn deserialize_rows<R, T>(reader: R, table: &str) -> Vec<T>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .filter_map(|row| match row {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed {table} row: {e}");
                None
            }
        })
        .collect()
}

fn valid_coordinates(record: &StationRecord) -> bool {
    (-90.0..=90.0).contains(&record.latitude) && (-180.0..=180.0).contains(&record.longitude)
}

/// Reads `id,latitude,longitude` rows with coordinates in degrees
pub fn read_stations<R: Read>(reader: R) -> Vec<Station> {
    deserialize_rows::<_, StationRecord>(reader, "station")
        .into_iter()
        .filter(|record| {
            let valid = valid_coordinates(record);
            if !valid {
                warn!(
                    "Skipping station {} with out-of-range coordinates ({}, {})",
                    record.id, record.latitude, record.longitude
                );
            }
            valid
        })
        .map(|record| Station::from_degrees(record.id, record.latitude, record.longitude))
        .collect()
}

/// Reads `from_station_id,to_station_id,duration,distance_km,source` rows
///
/// Missing distances read as zero, missing or unknown sources as network edges.
pub fn read_direct_times<R: Read>(reader: R) -> Vec<DirectTime> {
    deserialize_rows::<_, DirectTimeRecord>(reader, "direct time")
        .into_iter()
        .map(|record| DirectTime {
            from_station_id: record.from_station_id,
            to_station_id: record.to_station_id,
            duration: record.duration,
            distance_km: record.distance_km.unwrap_or_default(),
            source: EdgeSource::from_tag(record.source.as_deref()),
        })
        .collect()
}

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        ))
    })
}

/// Graph inputs from a pair of CSV files
#[derive(Debug, Clone)]
pub struct CsvGraphSource {
    pub stations_path: PathBuf,
    pub direct_times_path: PathBuf,
}

impl CsvGraphSource {
    pub fn new(stations_path: impl Into<PathBuf>, direct_times_path: impl Into<PathBuf>) -> Self {
        Self {
            stations_path: stations_path.into(),
            direct_times_path: direct_times_path.into(),
        }
    }
}

impl GraphSource for CsvGraphSource {
    fn stations(&self) -> Result<Vec<Station>, Error> {
        Ok(read_stations(open(&self.stations_path)?))
    }

    fn direct_times(&self) -> Result<Vec<DirectTime>, Error> {
        Ok(read_direct_times(open(&self.direct_times_path)?))
    }
}
