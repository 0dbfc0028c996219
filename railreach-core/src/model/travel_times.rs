use serde::{Deserialize, Serialize};

use crate::{Minutes, StationId};

/// Arrival times from one source station, in discovery order
///
/// The source itself is always the first entry with time 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTimes {
    source: StationId,
    entries: Vec<(StationId, Minutes)>,
}

impl TravelTimes {
    pub fn new(source: StationId, entries: Vec<(StationId, Minutes)>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> StationId {
        self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arrival time at `station`
    ///
    /// Scans the entries linearly; hot paths should walk [`TravelTimes::iter`]
    /// instead.
    pub fn get(&self, station: StationId) -> Option<Minutes> {
        self.entries
            .iter()
            .find(|(id, _)| *id == station)
            .map(|&(_, time)| time)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StationId, Minutes)> + '_ {
        self.entries.iter().copied()
    }

    /// Stations whose arrival time lies in `(after, up_to]`
    pub fn arriving_between(
        &self,
        after: Minutes,
        up_to: Minutes,
    ) -> impl Iterator<Item = (StationId, Minutes)> + '_ {
        self.iter()
            .filter(move |&(_, time)| time > after && time <= up_to)
    }
}

/// Flat shortest-time table from one origin station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortestTimes {
    pub from_station_id: StationId,
    pub rows: Vec<(StationId, Minutes)>,
}

impl ShortestTimes {
    pub fn new(from_station_id: StationId, rows: Vec<(StationId, Minutes)>) -> Self {
        Self {
            from_station_id,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Alternating `[destination, minutes, destination, minutes, ...]`
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn to_flat(&self) -> Vec<i32> {
        self.rows
            .iter()
            .flat_map(|&(to, minutes)| [to as i32, minutes as i32])
            .collect()
    }

    /// Packed little-endian `i32` buffer of [`ShortestTimes::to_flat`]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.to_flat()
            .into_iter()
            .flat_map(i32::to_le_bytes)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_selection_is_left_open() {
        let times = TravelTimes::new(1, vec![(1, 0), (2, 60), (3, 61), (4, 120)]);
        let first: Vec<_> = times.arriving_between(0, 60).map(|(id, _)| id).collect();
        let second: Vec<_> = times.arriving_between(60, 120).map(|(id, _)| id).collect();
        assert_eq!(first, vec![2]);
        assert_eq!(second, vec![3, 4]);
    }

    #[test]
    fn flat_table_alternates_ids_and_minutes() {
        let table = ShortestTimes::new(7, vec![(7, 0), (9, 45), (3, 120)]);
        assert_eq!(table.to_flat(), vec![7, 0, 9, 45, 3, 120]);

        let bytes = table.to_le_bytes();
        assert_eq!(bytes.len(), 6 * 4);
        assert_eq!(&bytes[8..12], &9i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &45i32.to_le_bytes());
    }
}
