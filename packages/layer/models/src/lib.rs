#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layer identities and analysis dataset types for the ride map dashboard.
//!
//! Every map overlay the dashboard can show is one of the seven closed
//! [`LayerId`] variants. Each layer has a fixed [`GeometryKind`] that
//! decides the shape of its payload and, downstream, which renderer
//! family draws it. Static display metadata lives in the [`registry`];
//! the fetched data lives in an [`AnalysisDataset`].

pub mod dataset;
pub mod payload;
pub mod registry;
pub mod timestamp;

pub use dataset::{AnalysisDataset, DatasetError, DatasetMetadata, LayerInfo};
pub use payload::{
    HeatPoint, Hexagon, LayerEventRef, LayerEvents, LayerPayload, SpeedViolation, TrafficJam,
    TripAnomaly,
};
pub use registry::LayerMetadata;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Identity of one map layer.
///
/// This is a closed set: the dashboard never introduces layer ids at
/// runtime. Variant order is the display order used for listings and
/// dispatch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerId {
    /// Most frequently travelled paths (heatmap).
    Routes,
    /// High-demand areas (hex grid).
    Demand,
    /// Driver availability across regions (hex grid).
    Availability,
    /// Speed limit violations (point markers).
    Violations,
    /// Unusual trips (point markers).
    Anomalies,
    /// Congestion areas (circle overlays).
    TrafficJams,
    /// Speed patterns (heatmap).
    SpeedZones,
}

impl LayerId {
    /// All layer ids in display order.
    pub const ALL: [Self; 7] = [
        Self::Routes,
        Self::Demand,
        Self::Availability,
        Self::Violations,
        Self::Anomalies,
        Self::TrafficJams,
        Self::SpeedZones,
    ];

    /// Returns the geometry kind this layer's payload always has.
    #[must_use]
    pub const fn geometry(self) -> GeometryKind {
        match self {
            Self::Routes | Self::SpeedZones => GeometryKind::PointSeries,
            Self::Demand | Self::Availability => GeometryKind::HexagonSeries,
            Self::Violations | Self::Anomalies | Self::TrafficJams => GeometryKind::EventList,
        }
    }

    /// Returns the static display metadata for this layer.
    #[must_use]
    pub fn metadata(self) -> &'static LayerMetadata {
        registry::metadata(self)
    }
}

/// Shape family of a layer payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GeometryKind {
    /// Weighted lat/lng points.
    PointSeries,
    /// H3 hexagon cells with values.
    HexagonSeries,
    /// Discrete events with a per-layer shape.
    EventList,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_ids_parse_from_wire_names() {
        for id in LayerId::ALL {
            let parsed: LayerId = id.as_ref().parse().unwrap();
            assert_eq!(parsed, id);
        }
        assert_eq!("traffic_jams".parse::<LayerId>().unwrap(), LayerId::TrafficJams);
        assert!("heat".parse::<LayerId>().is_err());
    }

    #[test]
    fn all_is_sorted_and_unique() {
        for window in LayerId::ALL.windows(2) {
            assert!(window[0] < window[1], "{:?} >= {:?}", window[0], window[1]);
        }
    }

    #[test]
    fn geometry_assignment() {
        assert_eq!(LayerId::Routes.geometry(), GeometryKind::PointSeries);
        assert_eq!(LayerId::SpeedZones.geometry(), GeometryKind::PointSeries);
        assert_eq!(LayerId::Demand.geometry(), GeometryKind::HexagonSeries);
        assert_eq!(LayerId::Availability.geometry(), GeometryKind::HexagonSeries);
        assert_eq!(LayerId::Violations.geometry(), GeometryKind::EventList);
        assert_eq!(LayerId::Anomalies.geometry(), GeometryKind::EventList);
        assert_eq!(LayerId::TrafficJams.geometry(), GeometryKind::EventList);
    }
}
