//! `SQLite` backend holding both the network inputs and the results.

use std::path::Path;

use geojson::Feature;
use itertools::Itertools;
use log::debug;
use rusqlite::{Connection, OptionalExtension, params};

use super::{GraphSource, ResultStore};
use crate::{DirectTime, EdgeSource, Error, Isochrone, Minutes, ShortestTimes, Station, StationId};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stations (
        id           INTEGER PRIMARY KEY,
        latitude_e7  INTEGER NOT NULL,
        longitude_e7 INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS direct_times (
        from_station_id INTEGER NOT NULL,
        to_station_id   INTEGER NOT NULL,
        duration        INTEGER NOT NULL,
        distance_km     REAL    NOT NULL DEFAULT 0,
        source          TEXT,
        PRIMARY KEY (from_station_id, to_station_id)
    );
    CREATE INDEX IF NOT EXISTS direct_times_to_station
        ON direct_times (to_station_id);
    CREATE TABLE IF NOT EXISTS isochrones (
        station_id  INTEGER NOT NULL,
        duration    INTEGER NOT NULL,
        geometry    TEXT    NOT NULL,
        computed_at TEXT    NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (station_id, duration)
    );
    CREATE TABLE IF NOT EXISTS shortest_times (
        from_station_id INTEGER NOT NULL,
        to_station_id   INTEGER NOT NULL,
        duration        INTEGER NOT NULL,
        PRIMARY KEY (from_station_id, to_station_id)
    );
";

/// Stations with incoming edges, ordered by the fastest incoming edge.
/// Fast long-distance hubs come first so the most useful results land early.
const PRIORITISED_STATIONS: &str = "
    WITH s AS (
        SELECT stations.id AS id,
               MAX(1.0 * direct_times.distance_km / direct_times.duration) AS max_speed
        FROM stations
        JOIN direct_times ON stations.id = direct_times.to_station_id
        GROUP BY stations.id
    )";

/// Input and result tables in a single `SQLite` database
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts stations, keeping existing rows; returns the number of new rows
    pub fn insert_stations(&mut self, stations: &[Station]) -> Result<usize, Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO stations (id, latitude_e7, longitude_e7) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for station in stations {
                inserted += stmt.execute(params![
                    station.id,
                    station.latitude_e7,
                    station.longitude_e7
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Inserts direct times, keeping existing rows; returns the number of new rows
    pub fn insert_direct_times(&mut self, direct_times: &[DirectTime]) -> Result<usize, Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO direct_times \
                 (from_station_id, to_station_id, duration, distance_km, source) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for edge in direct_times {
                inserted += stmt.execute(params![
                    edge.from_station_id,
                    edge.to_station_id,
                    edge.duration,
                    edge.distance_km,
                    edge.source.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Stations that have at least one stored isochrone
    pub fn stations_with_isochrones(&self) -> Result<Vec<StationId>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT station_id FROM isochrones ORDER BY station_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<StationId>, _>>()?;
        Ok(ids)
    }

    /// Stored isochrone features of a station for `durations`, largest first
    pub fn isochrone_features(
        &self,
        station: StationId,
        durations: &[Minutes],
    ) -> Result<Vec<Feature>, Error> {
        let sql = format!(
            "SELECT geometry FROM isochrones \
             WHERE station_id = ?1 AND duration IN ({}) \
             ORDER BY duration DESC",
            durations.iter().join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([station], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|text| {
                serde_json::from_str::<Feature>(text)
                    .map_err(|e| Error::GeoJsonError(e.to_string()))
            })
            .collect()
    }

    /// Raw stored `GeoJSON` of one isochrone
    pub fn isochrone_geometry(
        &self,
        station: StationId,
        duration: Minutes,
    ) -> Result<Option<String>, Error> {
        let geometry = self
            .conn
            .query_row(
                "SELECT geometry FROM isochrones WHERE station_id = ?1 AND duration = ?2",
                params![station, duration],
                |row| row.get(0),
            )
            .optional()?;
        Ok(geometry)
    }

    pub fn isochrone_count(&self) -> Result<usize, Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM isochrones", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Shortest-time rows of an origin in insertion order
    pub fn shortest_times_from(
        &self,
        from: StationId,
    ) -> Result<Vec<(StationId, Minutes)>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT to_station_id, duration FROM shortest_times \
             WHERE from_station_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([from], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Origins that have shortest-time rows
    pub fn shortest_time_origins(&self) -> Result<Vec<StationId>, Error> {
        self.query_ids(
            "SELECT DISTINCT from_station_id FROM shortest_times ORDER BY from_station_id",
            params![],
        )
    }

    fn query_ids(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<StationId>, Error> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(params, |row| row.get(0))?
            .collect::<Result<Vec<StationId>, _>>()?;
        Ok(ids)
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl GraphSource for SqliteStore {
    fn stations(&self) -> Result<Vec<Station>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, latitude_e7, longitude_e7 FROM stations")?;
        let stations = stmt
            .query_map([], |row| Ok(Station::new(row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stations)
    }

    fn direct_times(&self) -> Result<Vec<DirectTime>, Error> {
        let mut stmt = self.conn.prepare(
            "SELECT from_station_id, to_station_id, duration, distance_km, source \
             FROM direct_times",
        )?;
        let direct_times = stmt
            .query_map([], |row| {
                Ok(DirectTime {
                    from_station_id: row.get(0)?,
                    to_station_id: row.get(1)?,
                    duration: row.get(2)?,
                    distance_km: row.get(3)?,
                    source: EdgeSource::from_tag(row.get::<_, Option<String>>(4)?.as_deref()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(direct_times)
    }
}

impl ResultStore for SqliteStore {
    fn pending_isochrone_stations(
        &self,
        thresholds: &[Minutes],
        limit: usize,
    ) -> Result<Vec<StationId>, Error> {
        let sql = format!(
            "{PRIORITISED_STATIONS}
            SELECT s.id FROM s
            WHERE (SELECT COUNT(*) FROM isochrones
                   WHERE isochrones.station_id = s.id
                     AND isochrones.duration IN ({})) < ?1
            ORDER BY s.max_speed DESC, s.id
            LIMIT ?2",
            thresholds.iter().join(", ")
        );
        let expected = i64::try_from(thresholds.len()).unwrap_or(i64::MAX);
        self.query_ids(&sql, params![expected, sql_limit(limit)])
    }

    fn pending_shortest_time_stations(&self, limit: usize) -> Result<Vec<StationId>, Error> {
        let sql = format!(
            "{PRIORITISED_STATIONS}
            SELECT s.id FROM s
            WHERE NOT EXISTS (SELECT 1 FROM shortest_times
                              WHERE shortest_times.from_station_id = s.id)
            ORDER BY s.max_speed DESC, s.id
            LIMIT ?1"
        );
        self.query_ids(&sql, params![sql_limit(limit)])
    }

    fn upsert_isochrones(&mut self, isochrones: &[Isochrone]) -> Result<(), Error> {
        if isochrones.is_empty() {
            return Ok(());
        }
        let documents = isochrones
            .iter()
            .map(Isochrone::to_geojson_string)
            .collect::<Result<Vec<_>, _>>()?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO isochrones (station_id, duration, geometry, computed_at) \
                 VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP) \
                 ON CONFLICT (station_id, duration) DO UPDATE SET \
                 geometry = excluded.geometry, computed_at = excluded.computed_at",
            )?;
            for (isochrone, document) in isochrones.iter().zip(&documents) {
                stmt.execute(params![isochrone.station_id, isochrone.duration, document])?;
            }
        }
        tx.commit()?;
        debug!("Stored {} isochrones", isochrones.len());
        Ok(())
    }

    fn insert_shortest_times(&mut self, table: &ShortestTimes) -> Result<usize, Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR IGNORE INTO shortest_times (from_station_id, to_station_id, duration) \
                 VALUES (?1, ?2, ?3)",
            )?;
            for &(to, minutes) in &table.rows {
                inserted += stmt.execute(params![table.from_station_id, to, minutes])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, polygon};

    use super::*;

    fn store_with_network() -> SqliteStore {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_stations(&[
                Station::from_degrees(1, 50.0, 8.0),
                Station::from_degrees(2, 50.5, 8.5),
                Station::from_degrees(3, 51.0, 9.0),
                Station::from_degrees(4, 51.5, 9.5),
            ])
            .unwrap();
        store
            .insert_direct_times(&[
                DirectTime {
                    from_station_id: 1,
                    to_station_id: 2,
                    duration: 60,
                    distance_km: 60.0,
                    source: EdgeSource::Network,
                },
                DirectTime {
                    from_station_id: 1,
                    to_station_id: 3,
                    duration: 30,
                    distance_km: 90.0,
                    source: EdgeSource::Network,
                },
                DirectTime {
                    from_station_id: 3,
                    to_station_id: 4,
                    duration: 10,
                    distance_km: 1.0,
                    source: EdgeSource::Walkable,
                },
            ])
            .unwrap();
        store
    }

    fn square_isochrone(station_id: StationId, duration: Minutes, size: f64) -> Isochrone {
        Isochrone {
            station_id,
            duration,
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: size, y: 0.0),
                (x: size, y: size),
                (x: 0.0, y: size),
            ]]),
        }
    }

    #[test]
    fn graph_round_trips() {
        let store = store_with_network();
        assert_eq!(store.stations().unwrap().len(), 4);

        let direct_times = store.direct_times().unwrap();
        assert_eq!(direct_times.len(), 3);
        let walk = direct_times
            .iter()
            .find(|e| e.from_station_id == 3)
            .unwrap();
        assert_eq!(walk.source, EdgeSource::Walkable);
        assert_eq!(walk.duration, 10);
    }

    #[test]
    fn duplicate_inputs_are_skipped() {
        let mut store = store_with_network();
        let again = store
            .insert_stations(&[Station::from_degrees(1, 0.0, 0.0)])
            .unwrap();
        assert_eq!(again, 0);
        let stations = store.stations().unwrap();
        let first = stations.iter().find(|s| s.id == 1).unwrap();
        assert_eq!(first.latitude_e7, 500_000_000);
    }

    #[test]
    fn backlog_is_ordered_by_fastest_incoming_edge() {
        let store = store_with_network();
        // Station 1 has no incoming edge and is never pending
        let pending = store.pending_isochrone_stations(&[60, 120], 10).unwrap();
        assert_eq!(pending, vec![3, 2, 4]);
        let pending = store.pending_shortest_time_stations(2).unwrap();
        assert_eq!(pending, vec![3, 2]);
    }

    #[test]
    fn upsert_keeps_one_row_with_latest_geometry() {
        let mut store = store_with_network();
        store.upsert_isochrones(&[square_isochrone(2, 60, 1.0)]).unwrap();
        store.upsert_isochrones(&[square_isochrone(2, 60, 2.0)]).unwrap();

        assert_eq!(store.isochrone_count().unwrap(), 1);
        let stored = store.isochrone_geometry(2, 60).unwrap().unwrap();
        let expected = square_isochrone(2, 60, 2.0).to_geojson_string().unwrap();
        assert_eq!(stored, expected);
    }

    #[test]
    fn partially_stored_stations_stay_pending() {
        let mut store = store_with_network();
        store
            .upsert_isochrones(&[square_isochrone(3, 60, 1.0)])
            .unwrap();
        assert_eq!(
            store.pending_isochrone_stations(&[60, 120], 10).unwrap(),
            vec![3, 2, 4]
        );

        store
            .upsert_isochrones(&[square_isochrone(3, 120, 1.0)])
            .unwrap();
        assert_eq!(
            store.pending_isochrone_stations(&[60, 120], 10).unwrap(),
            vec![2, 4]
        );
        assert_eq!(store.stations_with_isochrones().unwrap(), vec![3]);

        let features = store.isochrone_features(3, &[60, 120]).unwrap();
        let durations: Vec<_> = features
            .iter()
            .map(|f| f.property("duration").and_then(serde_json::Value::as_u64))
            .collect();
        assert_eq!(durations, vec![Some(120), Some(60)]);
    }

    #[test]
    fn shortest_times_skip_duplicates() {
        let mut store = store_with_network();
        let table = ShortestTimes::new(3, vec![(3, 0), (4, 10)]);
        assert_eq!(store.insert_shortest_times(&table).unwrap(), 2);

        let changed = ShortestTimes::new(3, vec![(3, 0), (4, 99), (1, 250)]);
        assert_eq!(store.insert_shortest_times(&changed).unwrap(), 1);

        assert_eq!(
            store.shortest_times_from(3).unwrap(),
            vec![(3, 0), (4, 10), (1, 250)]
        );
        assert_eq!(store.pending_shortest_time_stations(10).unwrap(), vec![2, 4]);
        assert_eq!(store.shortest_time_origins().unwrap(), vec![3]);
    }

    #[test]
    fn file_database_persists_between_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("railreach.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .insert_stations(&[Station::from_degrees(7, 1.0, 2.0)])
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.stations().unwrap(), vec![Station::from_degrees(7, 1.0, 2.0)]);
    }
}
