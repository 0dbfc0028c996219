//! Static per-station files for the map client

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::FeatureCollection;
use log::{debug, info};
use serde_json::json;

use crate::{Error, Minutes, ShortestTimes, SqliteStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Writes `<station id>.json` into `out_dir` for every station with stored
/// isochrones
///
/// Each file holds `{"stationId": id, "geometry": FeatureCollection}` with
/// the features for `durations`, largest duration first. Files that already
/// exist are left alone.
///
/// # Errors
///
/// Returns an error if the store cannot be read or a file cannot be written
pub fn export_station_isochrones(
    store: &SqliteStore,
    durations: &[Minutes],
    out_dir: &Path,
) -> Result<ExportSummary, Error> {
    fs::create_dir_all(out_dir)?;
    let mut summary = ExportSummary::default();

    for station_id in store.stations_with_isochrones()? {
        let path = out_dir.join(format!("{station_id}.json"));
        if path.exists() {
            debug!("Skipping {}: file exists", path.display());
            summary.skipped += 1;
            continue;
        }

        let collection = FeatureCollection {
            bbox: None,
            features: store.isochrone_features(station_id, durations)?,
            foreign_members: None,
        };
        let document = json!({
            "stationId": station_id,
            "geometry": collection,
        });

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &document)
            .map_err(|e| Error::GeoJsonError(e.to_string()))?;
        writer.flush()?;
        summary.written += 1;
    }

    info!(
        "Exported isochrones to {}: {} files written, {} skipped",
        out_dir.display(),
        summary.written,
        summary.skipped
    );
    Ok(summary)
}

/// Writes `<station id>.bin` into `out_dir` for every origin with stored
/// shortest times
///
/// Each file is the packed little-endian `i32` buffer of alternating
/// destination ids and minutes, in insertion order. Files that already
/// exist are left alone.
///
/// # Errors
///
/// Returns an error if the store cannot be read or a file cannot be written
pub fn export_shortest_times(store: &SqliteStore, out_dir: &Path) -> Result<ExportSummary, Error> {
    fs::create_dir_all(out_dir)?;
    let mut summary = ExportSummary::default();

    for station_id in store.shortest_time_origins()? {
        let path = out_dir.join(format!("{station_id}.bin"));
        if path.exists() {
            debug!("Skipping {}: file exists", path.display());
            summary.skipped += 1;
            continue;
        }

        let table = ShortestTimes::new(station_id, store.shortest_times_from(station_id)?);
        fs::write(&path, table.to_le_bytes())?;
        summary.written += 1;
    }

    info!(
        "Exported shortest times to {}: {} files written, {} skipped",
        out_dir.display(),
        summary.written,
        summary.skipped
    );
    Ok(summary)
}
