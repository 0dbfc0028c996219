use serde::{Deserialize, Serialize};

use crate::{Minutes, StationId};

/// Origin of a direct-time edge
///
/// Walkable edges are synthesised between nearby stations and only pay
/// a reduced interchange penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSource {
    #[default]
    Network,
    #[serde(rename = "computed", alias = "walkable")]
    Walkable,
}

impl EdgeSource {
    /// Tag as persisted in the `direct_times.source` column
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeSource::Network => "network",
            EdgeSource::Walkable => "computed",
        }
    }

    /// Parse a stored tag, anything unrecognised counts as a network edge
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some(tag) if tag.eq_ignore_ascii_case("computed") => EdgeSource::Walkable,
            Some(tag) if tag.eq_ignore_ascii_case("walkable") => EdgeSource::Walkable,
            _ => EdgeSource::Network,
        }
    }

    pub fn is_walkable(self) -> bool {
        self == EdgeSource::Walkable
    }
}

/// Directed edge with the minimal point-to-point duration between two stations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectTime {
    pub from_station_id: StationId,
    pub to_station_id: StationId,
    pub duration: Minutes,
    pub distance_km: f64,
    pub source: EdgeSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_through_storage_form() {
        for source in [EdgeSource::Network, EdgeSource::Walkable] {
            assert_eq!(EdgeSource::from_tag(Some(source.as_str())), source);
        }
        assert_eq!(EdgeSource::from_tag(None), EdgeSource::Network);
        assert_eq!(EdgeSource::from_tag(Some("bus")), EdgeSource::Network);
        assert_eq!(EdgeSource::from_tag(Some("Walkable")), EdgeSource::Walkable);
    }
}
