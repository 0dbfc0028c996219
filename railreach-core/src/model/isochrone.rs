use geo::MultiPolygon;
use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde_json::json;

use crate::{Error, Minutes, StationId};

/// Area reachable from a station within `duration` minutes
#[derive(Debug, Clone, PartialEq)]
pub struct Isochrone {
    pub station_id: StationId,
    pub duration: Minutes,
    pub geometry: MultiPolygon<f64>,
}

impl Isochrone {
    /// `GeoJSON` geometry, a `Polygon` when only one part remains
    pub fn to_geometry(&self) -> Geometry {
        match self.geometry.0.as_slice() {
            [single] => Geometry::new(GeoJsonValue::from(single)),
            _ => Geometry::new(GeoJsonValue::from(&self.geometry)),
        }
    }

    /// Converts the isochrone to a `GeoJSON` Feature carrying its duration
    pub fn to_feature(&self) -> Result<Feature, Error> {
        let value = json!({
            "type": "Feature",
            "geometry": self.to_geometry(),
            "properties": {
                "station_id": self.station_id,
                "duration": self.duration,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_feature()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use geo::{Polygon, polygon};

    use super::*;

    fn square(x: f64) -> Polygon<f64> {
        polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
    }

    #[test]
    fn single_part_is_written_as_polygon() {
        let iso = Isochrone {
            station_id: 5,
            duration: 60,
            geometry: MultiPolygon::new(vec![square(0.0)]),
        };
        let value: serde_json::Value = serde_json::from_str(&iso.to_geojson_string().unwrap()).unwrap();
        assert_eq!(value["geometry"]["type"], "Polygon");
        assert_eq!(value["properties"]["duration"], 60);
        assert_eq!(value["properties"]["station_id"], 5);
    }

    #[test]
    fn disjoint_parts_are_written_as_multipolygon() {
        let iso = Isochrone {
            station_id: 5,
            duration: 120,
            geometry: MultiPolygon::new(vec![square(0.0), square(3.0)]),
        };
        let value: serde_json::Value = serde_json::from_str(&iso.to_geojson_string().unwrap()).unwrap();
        assert_eq!(value["geometry"]["type"], "MultiPolygon");
    }
}
