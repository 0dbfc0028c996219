//! Nested isochrones grown from propagated arrival times
//!
//! Every threshold starts from the previous snapshot, grows it by the
//! distance covered at `transit_speed` during the threshold gap and adds a
//! disk around each station reached within the gap. Stations reached early
//! get a larger disk. Snapshots therefore never shrink from one threshold
//! to the next.

use geo::{MultiPolygon, Point};
use log::{debug, trace, warn};
use rayon::prelude::*;

use super::geometry::{
    LocalProjection, check_area, dissolve, drop_degenerate, geodesic_disk, guarded,
    round_coordinates, simplify_area, union,
};
use crate::config::{IsochroneConfig, PipelineConfig};
use crate::routing::propagate;
use crate::{Error, Isochrone, Minutes, StationId, TransitGraph, TravelTimes};

/// Incremental builder producing one snapshot per threshold
#[derive(Debug)]
pub struct IsochroneBuilder<'a> {
    config: &'a IsochroneConfig,
    interchange_time: Minutes,
    station_id: StationId,
    projection: LocalProjection,
    /// Reached stations (excluding the source) with their arrival times
    reached: Vec<(Point<f64>, Minutes)>,
    current: MultiPolygon<f64>,
    previous: Minutes,
}

impl<'a> IsochroneBuilder<'a> {
    /// Prepares the seed disk around the source of `times`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataIntegrity`] if the source or any station reached
    /// within the largest threshold has no coordinates.
    pub fn new(
        graph: &TransitGraph,
        times: &TravelTimes,
        config: &'a IsochroneConfig,
        interchange_time: Minutes,
    ) -> Result<Self, Error> {
        let station_id = times.source();
        let origin = graph.station_point(station_id)?;
        let horizon = config.thresholds.last().copied().unwrap_or(0);

        let reached = times
            .arriving_between(0, horizon)
            .map(|(id, time)| graph.station_point(id).map(|point| (point, time)))
            .collect::<Result<Vec<_>, _>>()?;

        let seed = MultiPolygon::new(vec![geodesic_disk(
            origin,
            config.seed_radius_km(),
            config.buffer_steps,
        )]);

        Ok(Self {
            config,
            interchange_time,
            station_id,
            projection: LocalProjection::new(origin),
            reached,
            current: seed,
            previous: 0,
        })
    }

    pub fn station_id(&self) -> StationId {
        self.station_id
    }

    /// Computes the snapshot for `threshold`
    ///
    /// On failure the builder state is left untouched, so snapshots taken
    /// earlier stay valid.
    pub fn advance(&mut self, threshold: Minutes) -> Result<Isochrone, Error> {
        if threshold <= self.previous {
            return Err(Error::InvalidConfig(format!(
                "threshold {threshold} does not follow {}",
                self.previous
            )));
        }

        let station = self.station_id;
        let degenerate = move |reason: String| Error::GeometricDegeneracy {
            station,
            duration: threshold,
            reason,
        };

        let config = self.config;
        let speed = config.transit_speed;
        let steps = config.buffer_steps;
        let floor = self.interchange_time;

        let disks: Vec<_> = self
            .reached
            .iter()
            .filter(|&&(_, time)| time > self.previous && time <= threshold)
            .map(|&(point, time)| {
                let budget = (threshold - time).max(floor);
                geodesic_disk(point, speed * f64::from(budget), steps)
            })
            .collect();
        trace!(
            "Station {}: {} stations reached in ({}, {threshold}]",
            self.station_id,
            disks.len(),
            self.previous
        );

        let grown = guarded(|| {
            let expanded = self.projection.buffer(
                &self.current,
                config.expansion_km(self.previous, threshold),
            );
            if disks.is_empty() {
                return drop_degenerate(expanded);
            }
            let disks = simplify_area(&MultiPolygon::new(disks), config.simplify_tolerance);
            union(&expanded, &dissolve(&disks.0))
        })
        .map_err(degenerate)?;

        let snapshot = round_coordinates(
            &simplify_area(&grown, config.simplify_tolerance),
            config.coordinate_precision,
        );
        check_area(&snapshot).map_err(degenerate)?;

        self.current = snapshot.clone();
        self.previous = threshold;

        Ok(Isochrone {
            station_id: self.station_id,
            duration: threshold,
            geometry: snapshot,
        })
    }
}

/// Result of building all thresholds for one station
///
/// `isochrones` holds every snapshot computed before `error` stopped the
/// run, so partial results can still be persisted.
#[derive(Debug)]
pub struct IsochroneRun {
    pub station_id: StationId,
    pub isochrones: Vec<Isochrone>,
    pub error: Option<Error>,
}

impl IsochroneRun {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Builds the isochrones of `times.source()` for every configured threshold
pub fn calculate_isochrones(
    graph: &TransitGraph,
    times: &TravelTimes,
    config: &IsochroneConfig,
    interchange_time: Minutes,
) -> IsochroneRun {
    let station_id = times.source();
    let mut builder = match IsochroneBuilder::new(graph, times, config, interchange_time) {
        Ok(builder) => builder,
        Err(error) => {
            return IsochroneRun {
                station_id,
                isochrones: Vec::new(),
                error: Some(error),
            };
        }
    };

    let mut isochrones = Vec::with_capacity(config.thresholds.len());
    for &threshold in &config.thresholds {
        match builder.advance(threshold) {
            Ok(isochrone) => isochrones.push(isochrone),
            Err(error) => {
                warn!(
                    "Abandoning isochrones of station {station_id} from {threshold} min: {error}"
                );
                return IsochroneRun {
                    station_id,
                    isochrones,
                    error: Some(error),
                };
            }
        }
    }

    debug!(
        "Station {station_id}: built {} isochrones from {} reached stations",
        isochrones.len(),
        times.len()
    );

    IsochroneRun {
        station_id,
        isochrones,
        error: None,
    }
}

/// Propagates and builds isochrones for several stations in parallel
pub fn bulk_isochrones(
    graph: &TransitGraph,
    stations: &[StationId],
    config: &PipelineConfig,
) -> Vec<IsochroneRun> {
    stations
        .par_iter()
        .map(|&station_id| match propagate(graph, station_id, &config.propagation) {
            Ok(times) => calculate_isochrones(
                graph,
                &times,
                &config.isochrones,
                config.propagation.interchange_time,
            ),
            Err(error) => IsochroneRun {
                station_id,
                isochrones: Vec::new(),
                error: Some(error),
            },
        })
        .collect()
}
