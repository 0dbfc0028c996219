//! Geometric primitives for growing reachability areas
//!
//! Areas are kept in WGS84 degrees. Metric operations (disks and outward
//! buffering) go through a spherical approximation: disks are built directly
//! in degrees with a latitude-dependent longitude scale, buffering happens in
//! a local equirectangular projection in kilometres.

use std::f64::consts::PI;
use std::panic::{AssertUnwindSafe, catch_unwind};

use geo::{
    Area, BooleanOps, Buffer, Coord, LineString, MapCoords, MultiPolygon, Point, Polygon,
    Simplify, unary_union,
};

/// Kilometres per degree of latitude on a sphere of radius 6371 km
pub const KM_PER_DEGREE: f64 = 6371.0 * PI / 180.0;

/// Disk of `radius_km` around `center`, `steps` vertices per quarter circle
pub fn geodesic_disk(center: Point<f64>, radius_km: f64, steps: usize) -> Polygon<f64> {
    let vertex_count = steps.max(1) * 4;
    let lat_scale = radius_km / KM_PER_DEGREE;
    let lon_scale = lat_scale / center.y().to_radians().cos().max(1e-6);

    #[allow(clippy::cast_precision_loss)]
    let ring: Vec<Coord<f64>> = (0..=vertex_count)
        .map(|i| {
            let bearing = 2.0 * PI * (i % vertex_count) as f64 / vertex_count as f64;
            Coord {
                x: center.x() + lon_scale * bearing.sin(),
                y: center.y() + lat_scale * bearing.cos(),
            }
        })
        .collect();

    Polygon::new(LineString::new(ring), vec![])
}

/// Equirectangular projection to kilometres around a fixed origin
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: Point<f64>,
    cos_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: Point<f64>) -> Self {
        Self {
            origin,
            cos_lat: origin.y().to_radians().cos().max(1e-6),
        }
    }

    pub fn forward(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (c.x - self.origin.x()) * KM_PER_DEGREE * self.cos_lat,
            y: (c.y - self.origin.y()) * KM_PER_DEGREE,
        }
    }

    pub fn inverse(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: c.x / (KM_PER_DEGREE * self.cos_lat) + self.origin.x(),
            y: c.y / KM_PER_DEGREE + self.origin.y(),
        }
    }

    /// Grows `area` outwards by `distance_km`
    pub fn buffer(&self, area: &MultiPolygon<f64>, distance_km: f64) -> MultiPolygon<f64> {
        if distance_km <= 0.0 {
            return area.clone();
        }
        let projected = area.map_coords(|c| self.forward(c));
        projected
            .buffer(distance_km)
            .map_coords(|c| self.inverse(c))
    }
}

/// Rounds a coordinate value to `precision` decimal places
pub fn round_coordinate(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

pub fn round_coordinates(area: &MultiPolygon<f64>, precision: i32) -> MultiPolygon<f64> {
    area.map_coords(|c| Coord {
        x: round_coordinate(c.x, precision),
        y: round_coordinate(c.y, precision),
    })
}

/// Simplifies every part and drops parts that collapsed to nothing
pub fn simplify_area(area: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    let simplified = if tolerance > 0.0 {
        area.simplify(tolerance)
    } else {
        area.clone()
    };
    drop_degenerate(simplified)
}

/// Removes parts whose exterior cannot bound any area
pub fn drop_degenerate(area: MultiPolygon<f64>) -> MultiPolygon<f64> {
    MultiPolygon::new(
        area.into_iter()
            .filter(|part| part.exterior().0.len() >= 4 && part.unsigned_area() > 0.0)
            .collect(),
    )
}

/// Dissolves a collection of possibly overlapping polygons
pub fn dissolve(parts: &[Polygon<f64>]) -> MultiPolygon<f64> {
    unary_union(parts)
}

/// Union of two areas
pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.union(b)
}

/// Runs a geometric operation, turning a panic inside the clipping code into
/// an error message
pub fn guarded<T>(operation: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(operation)).map_err(|payload| {
        payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "geometry operation panicked".to_string())
    })
}

/// Checks that an area is non-empty with finite coordinates
pub fn check_area(area: &MultiPolygon<f64>) -> Result<(), String> {
    if area.0.is_empty() {
        return Err("area is empty".to_string());
    }
    let all_finite = area.iter().all(|part| {
        part.exterior()
            .coords()
            .chain(part.interiors().iter().flat_map(LineString::coords))
            .all(|c| c.x.is_finite() && c.y.is_finite())
    });
    if !all_finite {
        return Err("area has non-finite coordinates".to_string());
    }
    if area.unsigned_area() <= 0.0 {
        return Err("area has zero extent".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{BoundingRect, Contains};
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn disk_has_requested_radius() {
        let center = Point::new(13.4, 52.5);
        let disk = geodesic_disk(center, 10.0, 16);
        assert_eq!(disk.exterior().0.len(), 65);
        assert!(disk.exterior().is_closed());
        assert!(disk.contains(&center));

        let rect = disk.bounding_rect().unwrap();
        let height_km = rect.height() * KM_PER_DEGREE;
        let width_km = rect.width() * KM_PER_DEGREE * center.y().to_radians().cos();
        assert!((height_km - 20.0).abs() < 0.01);
        assert!((width_km - 20.0).abs() < 0.01);
    }

    #[test]
    fn projection_round_trips() {
        let projection = LocalProjection::new(Point::new(2.35, 48.85));
        let c = Coord { x: 2.9, y: 48.1 };
        let back = projection.inverse(projection.forward(c));
        assert!((back.x - c.x).abs() < 1e-12);
        assert!((back.y - c.y).abs() < 1e-12);
    }

    #[test]
    fn buffer_grows_area() {
        let center = Point::new(8.68, 50.11);
        let projection = LocalProjection::new(center);
        let disk = MultiPolygon::new(vec![geodesic_disk(center, 3.0, 20)]);
        let grown = projection.buffer(&disk, 9.0);

        assert!(grown.unsigned_area() > disk.unsigned_area());
        let rest = disk.difference(&grown);
        assert!(rest.unsigned_area() < 1e-12);

        let rect = grown.bounding_rect().unwrap();
        let half_height_km = rect.height() * KM_PER_DEGREE / 2.0;
        assert!(half_height_km > 11.5 && half_height_km < 12.1);
    }

    #[test]
    fn dissolve_merges_overlapping_disks() {
        let a = geodesic_disk(Point::new(10.0, 50.0), 5.0, 8);
        let b = geodesic_disk(Point::new(10.05, 50.0), 5.0, 8);
        let far = geodesic_disk(Point::new(12.0, 50.0), 5.0, 8);

        let merged = dissolve(&[a, b, far]);
        assert_eq!(merged.0.len(), 2);
    }

    #[test]
    fn guarded_reports_panics() {
        let result: Result<(), String> = guarded(|| panic!("boom"));
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(guarded(|| 3), Ok(3));
    }

    #[test]
    fn empty_area_fails_check() {
        assert!(check_area(&MultiPolygon::new(vec![])).is_err());
        let disk = MultiPolygon::new(vec![geodesic_disk(Point::new(0.0, 0.0), 1.0, 4)]);
        assert!(check_area(&disk).is_ok());
    }

    proptest! {
        #[test]
        fn rounding_is_idempotent(value in -180.0f64..180.0) {
            let once = round_coordinate(value, 4);
            prop_assert_eq!(round_coordinate(once, 4), once);
        }

        #[test]
        fn rounding_moves_at_most_half_a_unit(value in -180.0f64..180.0) {
            let rounded = round_coordinate(value, 4);
            prop_assert!((rounded - value).abs() <= 0.5e-4 + 1e-12);
        }
    }
}
