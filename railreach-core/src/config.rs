//! Pipeline configuration
//!
//! Every tunable constant of the batch job lives here. All structs
//! deserialize with per-field defaults, so a configuration file only
//! needs to mention what it changes.

use std::path::PathBuf;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::algo::geometry::KM_PER_DEGREE;
use crate::model::EdgeSource;
use crate::{Error, Minutes};

/// How arrival times are relaxed over the direct-time graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationStrategy {
    /// Round-based expansion where a station is settled after its first
    /// frontier membership. A cheaper route reaching a settled station in a
    /// later round is not reconsidered.
    #[default]
    BoundedRounds,
    /// Minimum over all paths with at most `max_interchanges` edges
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Number of relaxation rounds, i.e. edges per path
    pub max_interchanges: usize,
    /// Arrival times above this are dropped and never expanded
    pub max_duration: Minutes,
    /// Penalty added for every edge after the first
    pub interchange_time: Minutes,
    /// Charge only half the interchange penalty on walkable edges
    pub halve_walkable_interchange: bool,
    pub strategy: PropagationStrategy,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_interchanges: 4,
            max_duration: 300,
            interchange_time: 20,
            halve_walkable_interchange: true,
            strategy: PropagationStrategy::BoundedRounds,
        }
    }
}

impl PropagationConfig {
    /// Looser settings used for the flat shortest-time table
    pub fn for_shortest_times() -> Self {
        Self {
            max_interchanges: 5,
            halve_walkable_interchange: false,
            ..Self::default()
        }
    }

    /// Penalty paid when taking an edge as the `hop`-th edge of a path (0-based)
    pub fn interchange_penalty(&self, hop: usize, source: EdgeSource) -> Minutes {
        if hop == 0 {
            0
        } else if self.halve_walkable_interchange && source.is_walkable() {
            self.interchange_time / 2
        } else {
            self.interchange_time
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_duration == 0 {
            return Err(Error::InvalidConfig(
                "max_duration must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsochroneConfig {
    /// Strictly ascending duration cutoffs, one isochrone each
    pub thresholds: Vec<Minutes>,
    /// Speed used to grow areas around reached stations, km per minute
    pub transit_speed: f64,
    /// Walkable distance around the source, km; the seed disk radius is
    /// `transit_speed * transitable_distance`
    pub transitable_distance: f64,
    /// Douglas-Peucker tolerance in degrees
    pub simplify_tolerance: f64,
    /// Vertices per quarter circle of a station disk
    pub buffer_steps: usize,
    /// Decimal places kept in stored coordinates
    pub coordinate_precision: i32,
}

impl Default for IsochroneConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![60, 120, 180, 240, 300],
            transit_speed: 0.15,
            transitable_distance: 20.0,
            simplify_tolerance: 0.005,
            buffer_steps: 20,
            coordinate_precision: 4,
        }
    }
}

impl IsochroneConfig {
    /// Radius of the disk every isochrone of a station starts from
    pub fn seed_radius_km(&self) -> f64 {
        self.transit_speed * self.transitable_distance
    }

    /// Continuous growth between two thresholds
    pub fn expansion_km(&self, from: Minutes, to: Minutes) -> f64 {
        self.transit_speed * f64::from(to.saturating_sub(from))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.thresholds.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one isochrone threshold is required".to_string(),
            ));
        }
        if self.thresholds[0] == 0 {
            return Err(Error::InvalidConfig(
                "isochrone thresholds must be positive".to_string(),
            ));
        }
        if let Some((a, b)) = self.thresholds.iter().tuple_windows().find(|(a, b)| a >= b) {
            return Err(Error::InvalidConfig(format!(
                "isochrone thresholds must be strictly ascending, got {a} before {b}"
            )));
        }
        if !(self.transit_speed.is_finite() && self.transit_speed > 0.0) {
            return Err(Error::InvalidConfig(
                "transit_speed must be a positive number".to_string(),
            ));
        }
        if !(self.transitable_distance.is_finite() && self.transitable_distance >= 0.0) {
            return Err(Error::InvalidConfig(
                "transitable_distance must not be negative".to_string(),
            ));
        }
        if !(self.simplify_tolerance.is_finite() && self.simplify_tolerance >= 0.0) {
            return Err(Error::InvalidConfig(
                "simplify_tolerance must not be negative".to_string(),
            ));
        }
        if self.buffer_steps < 2 {
            return Err(Error::InvalidConfig(
                "buffer_steps must be at least 2".to_string(),
            ));
        }
        if !(0..=7).contains(&self.coordinate_precision) {
            return Err(Error::InvalidConfig(
                "coordinate_precision must be between 0 and 7".to_string(),
            ));
        }

        // Simplification may pull a boundary inwards by up to the tolerance,
        // the growth between thresholds has to outrun it.
        let smallest_gap = std::iter::once(0)
            .chain(self.thresholds.iter().copied())
            .tuple_windows()
            .map(|(a, b)| b - a)
            .min()
            .unwrap_or(0);
        let tolerance_km = self.simplify_tolerance * KM_PER_DEGREE;
        if self.expansion_km(0, smallest_gap) <= tolerance_km {
            return Err(Error::InvalidConfig(format!(
                "threshold gap of {smallest_gap} min grows the area by less than the \
                 simplification tolerance ({tolerance_km:.3} km)"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Stations fetched from the backlog per pass
    pub page_size: usize,
    /// Worker threads for station fan-out, 0 lets rayon decide
    pub threads: usize,
    /// Failures after which a station is skipped for the rest of a run
    pub max_attempts: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: 64,
            threads: 0,
            max_attempts: 3,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig(
                "page_size must be positive".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidConfig(
                "max_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `SQLite` database holding inputs and results
    pub database: PathBuf,
    /// Propagation feeding the isochrone builder
    pub propagation: PropagationConfig,
    /// Propagation feeding the shortest-time table
    pub shortest_times: PropagationConfig,
    pub isochrones: IsochroneConfig,
    pub batch: BatchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("railreach.db"),
            propagation: PropagationConfig::default(),
            shortest_times: PropagationConfig::for_shortest_times(),
            isochrones: IsochroneConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        self.propagation.validate()?;
        self.shortest_times.validate()?;
        self.isochrones.validate()?;
        self.batch.validate()?;

        if let Some(&last) = self.isochrones.thresholds.last()
            && last > self.propagation.max_duration
        {
            log::warn!(
                "Largest isochrone threshold ({last} min) exceeds the propagation ceiling ({} min)",
                self.propagation.max_duration
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.propagation.max_interchanges, 4);
        assert_eq!(config.shortest_times.max_interchanges, 5);
        assert!(!config.shortest_times.halve_walkable_interchange);
        assert!((config.isochrones.seed_radius_km() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn finer_threshold_set_is_valid() {
        let config = IsochroneConfig {
            thresholds: vec![30, 60, 90, 120, 180, 240, 300],
            ..IsochroneConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn thresholds_must_ascend() {
        let config = IsochroneConfig {
            thresholds: vec![60, 60, 120],
            ..IsochroneConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn tiny_gaps_are_rejected() {
        let config = IsochroneConfig {
            thresholds: vec![60, 61],
            ..IsochroneConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn penalty_is_free_on_first_hop_and_halved_for_walkable_edges() {
        let config = PropagationConfig::default();
        assert_eq!(config.interchange_penalty(0, EdgeSource::Network), 0);
        assert_eq!(config.interchange_penalty(0, EdgeSource::Walkable), 0);
        assert_eq!(config.interchange_penalty(1, EdgeSource::Network), 20);
        assert_eq!(config.interchange_penalty(3, EdgeSource::Walkable), 10);

        let config = PropagationConfig::for_shortest_times();
        assert_eq!(config.interchange_penalty(2, EdgeSource::Walkable), 20);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"propagation": {"strategy": "exact"}}"#).unwrap();
        assert_eq!(config.propagation.strategy, PropagationStrategy::Exact);
        assert_eq!(config.propagation.interchange_time, 20);
        assert_eq!(config.isochrones.thresholds, vec![60, 120, 180, 240, 300]);
    }
}
