//! Typed layer payloads.
//!
//! A [`LayerPayload`] is resolved once, when the dataset is decoded, into
//! the variant matching its layer's [`GeometryKind`]. Consumers match on
//! the variant instead of inspecting the shape of the data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::GeometryKind;

const fn default_weight() -> f64 {
    1.0
}

/// One weighted point of a heatmap layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Heat intensity.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// One H3 cell of a hex-grid layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hexagon {
    /// H3 cell index as a hex string (e.g. `"8928308280fffff"`).
    pub h3_index: String,
    /// Aggregated value for the cell.
    pub value: f64,
    /// Any additional per-cell attributes supplied by the data provider.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Hexagon {
    /// Parses [`Self::h3_index`] into an H3 cell.
    ///
    /// Returns `None` if the index is not a valid H3 cell.
    #[must_use]
    pub fn cell(&self) -> Option<h3o::CellIndex> {
        self.h3_index.parse().ok()
    }

    /// Returns the center of the cell, if the index is valid.
    #[must_use]
    pub fn center(&self) -> Option<h3o::LatLng> {
        self.cell().map(h3o::LatLng::from)
    }
}

/// A single speed limit violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedViolation {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Recorded speed in km/h.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Applicable limit in km/h.
    #[serde(default)]
    pub speed_limit: Option<f64>,
    /// When the violation was recorded.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Additional provider attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A trip flagged as anomalous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripAnomaly {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Detector classification (e.g. `"detour"`).
    #[serde(default)]
    pub anomaly_type: Option<String>,
    /// Anomaly score.
    #[serde(default)]
    pub score: Option<f64>,
    /// Free-text explanation.
    #[serde(default)]
    pub description: Option<String>,
    /// When the trip happened.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Additional provider attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A congestion area, drawn as a circle overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficJam {
    /// Latitude of the circle center (WGS84).
    pub lat: f64,
    /// Longitude of the circle center (WGS84).
    pub lng: f64,
    /// Circle radius in meters.
    #[serde(default)]
    pub radius: Option<f64>,
    /// Congestion severity label.
    #[serde(default)]
    pub severity: Option<String>,
    /// Average speed inside the area in km/h.
    #[serde(default)]
    pub average_speed: Option<f64>,
    /// Additional provider attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Event sequence of an event-list layer. Each layer has its own event
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvents {
    /// Events of the `violations` layer.
    Violations(Vec<SpeedViolation>),
    /// Events of the `anomalies` layer.
    Anomalies(Vec<TripAnomaly>),
    /// Events of the `traffic_jams` layer.
    TrafficJams(Vec<TrafficJam>),
}

impl LayerEvents {
    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Violations(v) => v.len(),
            Self::Anomalies(v) => v.len(),
            Self::TrafficJams(v) => v.len(),
        }
    }

    /// Whether there are no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the event at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<LayerEventRef<'_>> {
        match self {
            Self::Violations(v) => v.get(index).map(LayerEventRef::Violation),
            Self::Anomalies(v) => v.get(index).map(LayerEventRef::Anomaly),
            Self::TrafficJams(v) => v.get(index).map(LayerEventRef::TrafficJam),
        }
    }

    /// Iterates over the events in order.
    pub fn iter(&self) -> impl Iterator<Item = LayerEventRef<'_>> {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Borrowed view of a single event, whatever its layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerEventRef<'a> {
    /// A speed violation.
    Violation(&'a SpeedViolation),
    /// A trip anomaly.
    Anomaly(&'a TripAnomaly),
    /// A traffic jam.
    TrafficJam(&'a TrafficJam),
}

impl LayerEventRef<'_> {
    /// Event position as `(lat, lng)`.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        match self {
            Self::Violation(e) => (e.lat, e.lng),
            Self::Anomaly(e) => (e.lat, e.lng),
            Self::TrafficJam(e) => (e.lat, e.lng),
        }
    }
}

/// Data of one layer, tagged by geometry kind.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPayload {
    /// Heatmap points (`routes`, `speed_zones`).
    PointSeries {
        /// Points in provider order.
        points: Vec<HeatPoint>,
    },
    /// Hex-grid cells (`demand`, `availability`).
    HexagonSeries {
        /// Cells in provider order.
        hexagons: Vec<Hexagon>,
    },
    /// Discrete events (`violations`, `anomalies`, `traffic_jams`).
    EventList {
        /// Events in provider order.
        events: LayerEvents,
    },
}

impl LayerPayload {
    /// Geometry kind of this payload.
    #[must_use]
    pub const fn geometry(&self) -> GeometryKind {
        match self {
            Self::PointSeries { .. } => GeometryKind::PointSeries,
            Self::HexagonSeries { .. } => GeometryKind::HexagonSeries,
            Self::EventList { .. } => GeometryKind::EventList,
        }
    }

    /// Length of the underlying sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::PointSeries { points } => points.len(),
            Self::HexagonSeries { hexagons } => hexagons.len(),
            Self::EventList { events } => events.len(),
        }
    }

    /// Whether the underlying sequence is empty. An empty payload is never
    /// displayable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the points of a point-series payload.
    #[must_use]
    pub fn points(&self) -> Option<&[HeatPoint]> {
        match self {
            Self::PointSeries { points } => Some(points),
            _ => None,
        }
    }

    /// Returns the cells of a hexagon-series payload.
    #[must_use]
    pub fn hexagons(&self) -> Option<&[Hexagon]> {
        match self {
            Self::HexagonSeries { hexagons } => Some(hexagons),
            _ => None,
        }
    }

    /// Returns the events of an event-list payload.
    #[must_use]
    pub const fn events(&self) -> Option<&LayerEvents> {
        match self {
            Self::EventList { events } => Some(events),
            _ => None,
        }
    }
}
