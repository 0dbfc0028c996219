use geo::Point;
use serde::{Deserialize, Serialize};

use crate::StationId;

/// Scale of the fixed-point coordinate representation
pub const E7: f64 = 1e7;

/// Station with fixed-point WGS84 coordinates (degrees × 1e7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub latitude_e7: i32,
    pub longitude_e7: i32,
}

impl Station {
    pub fn new(id: StationId, latitude_e7: i32, longitude_e7: i32) -> Self {
        Self {
            id,
            latitude_e7,
            longitude_e7,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn from_degrees(id: StationId, latitude: f64, longitude: f64) -> Self {
        Self::new(
            id,
            (latitude * E7).round() as i32,
            (longitude * E7).round() as i32,
        )
    }

    pub fn latitude(&self) -> f64 {
        f64::from(self.latitude_e7) / E7
    }

    pub fn longitude(&self) -> f64 {
        f64::from(self.longitude_e7) / E7
    }

    /// Location as a `geo` point, `x` is longitude and `y` is latitude
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude(), self.latitude())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_are_stored_as_e7() {
        let station = Station::from_degrees(8_011_160, 52.525_592, 13.369_545);
        assert_eq!(station.latitude_e7, 525_255_920);
        assert_eq!(station.longitude_e7, 133_695_450);

        let point = station.point();
        assert!((point.x() - 13.369_545).abs() < 1e-9);
        assert!((point.y() - 52.525_592).abs() < 1e-9);
    }
}
