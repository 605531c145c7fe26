//! The consolidated analysis dataset and its decoding boundary.
//!
//! The dashboard fetches one JSON document per session. It is decoded here,
//! once, into an [`AnalysisDataset`] whose layers are already typed
//! [`LayerPayload`]s. Nothing downstream looks at raw JSON again.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::payload::{
    HeatPoint, Hexagon, LayerEvents, LayerPayload, SpeedViolation, TrafficJam, TripAnomaly,
};
use crate::{GeometryKind, LayerId};

/// Errors from decoding or assembling a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The document is not valid JSON or lacks required fields.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// One layer's payload does not have the shape its geometry requires.
    #[error("Invalid '{layer}' layer: {source}")]
    Layer {
        /// Offending layer.
        layer: LayerId,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A payload was attached to a layer of a different geometry kind.
    #[error("Layer '{layer}' expects {expected} geometry, got {actual}")]
    GeometryMismatch {
        /// Layer the payload was attached to.
        layer: LayerId,
        /// The layer's geometry kind.
        expected: GeometryKind,
        /// The payload's geometry kind.
        actual: GeometryKind,
    },

    /// An event list of another layer's event shape was attached.
    #[error("Layer '{layer}' cannot hold these events")]
    EventShapeMismatch {
        /// Layer the events were attached to.
        layer: LayerId,
    },
}

/// Per-layer information supplied by the data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Description overriding the registry default.
    #[serde(default)]
    pub description: Option<String>,
    /// Any additional attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Dataset-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Number of source records the layers were computed from.
    pub total_records: u64,
    /// When the provider generated the dataset. Naive timestamps are UTC.
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub generated_at: DateTime<Utc>,
    /// Per-layer information keyed by layer wire name. Unknown keys are
    /// kept but never consulted.
    #[serde(default)]
    pub layers: BTreeMap<String, LayerInfo>,
    /// Any additional attributes.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DatasetMetadata {
    /// Creates metadata with no per-layer information.
    #[must_use]
    pub fn new(total_records: u64, generated_at: DateTime<Utc>) -> Self {
        Self {
            total_records,
            generated_at,
            layers: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// The single dataset fetched per session. Immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDataset {
    /// Dataset-level metadata.
    pub metadata: DatasetMetadata,
    layers: BTreeMap<LayerId, LayerPayload>,
}

#[derive(Deserialize)]
struct WireDataset {
    metadata: DatasetMetadata,
    #[serde(default)]
    layers: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct WirePoints {
    #[serde(default)]
    points: Option<Vec<HeatPoint>>,
}

#[derive(Deserialize)]
struct WireHexagons {
    #[serde(default)]
    hexagons: Option<Vec<Hexagon>>,
}

impl AnalysisDataset {
    /// Creates a dataset with no layers.
    #[must_use]
    pub const fn new(metadata: DatasetMetadata) -> Self {
        Self {
            metadata,
            layers: BTreeMap::new(),
        }
    }

    /// Builder form of [`Self::insert_layer`].
    ///
    /// # Errors
    ///
    /// See [`Self::insert_layer`].
    pub fn with_layer(mut self, id: LayerId, payload: LayerPayload) -> Result<Self, DatasetError> {
        self.insert_layer(id, payload)?;
        Ok(self)
    }

    /// Attaches `payload` to layer `id`, replacing any previous payload.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::GeometryMismatch`] if the payload's geometry
    /// kind differs from the layer's, or [`DatasetError::EventShapeMismatch`]
    /// if the events belong to another event layer.
    pub fn insert_layer(&mut self, id: LayerId, payload: LayerPayload) -> Result<(), DatasetError> {
        let expected = id.geometry();
        let actual = payload.geometry();
        if expected != actual {
            return Err(DatasetError::GeometryMismatch {
                layer: id,
                expected,
                actual,
            });
        }

        if let LayerPayload::EventList { events } = &payload {
            let matches = matches!(
                (id, events),
                (LayerId::Violations, LayerEvents::Violations(_))
                    | (LayerId::Anomalies, LayerEvents::Anomalies(_))
                    | (LayerId::TrafficJams, LayerEvents::TrafficJams(_))
            );
            if !matches {
                return Err(DatasetError::EventShapeMismatch { layer: id });
            }
        }

        self.layers.insert(id, payload);
        Ok(())
    }

    /// Returns the payload of layer `id`, if the dataset has one.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&LayerPayload> {
        self.layers.get(&id)
    }

    /// Layer ids with a payload (possibly empty), in display order.
    pub fn layer_ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    /// Provider-supplied description for layer `id`, if any.
    #[must_use]
    pub fn layer_description(&self, id: LayerId) -> Option<&str> {
        self.metadata
            .layers
            .get(id.as_ref())
            .and_then(|info| info.description.as_deref())
    }

    /// Decodes a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the text is not a valid dataset document.
    pub fn from_json_str(text: &str) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json_value(value)
    }

    /// Decodes a dataset from a parsed JSON document.
    ///
    /// Unknown layer keys are ignored. A `null` layer, or a `null` inner
    /// sequence, is treated as absent or empty respectively.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Json`] if the metadata is missing or
    /// malformed, or [`DatasetError::Layer`] if a layer payload has the
    /// wrong shape for its geometry.
    pub fn from_json_value(value: Value) -> Result<Self, DatasetError> {
        let wire: WireDataset = serde_json::from_value(value)?;
        let mut dataset = Self::new(wire.metadata);

        for (key, raw) in wire.layers {
            let Ok(id) = key.parse::<LayerId>() else {
                log::debug!("Ignoring unknown layer '{key}'");
                continue;
            };
            if raw.is_null() {
                log::debug!("Layer '{id}' is null, treating as absent");
                continue;
            }

            let payload = decode_payload(id, raw)
                .map_err(|source| DatasetError::Layer { layer: id, source })?;
            dataset.insert_layer(id, payload)?;
        }

        log::debug!(
            "Decoded dataset: {} records, {} layers",
            dataset.metadata.total_records,
            dataset.layers.len()
        );

        Ok(dataset)
    }
}

/// Point and hexagon layers are objects wrapping their sequence; event
/// layers are bare arrays. Anything else contradicts the layer's geometry.
fn check_shape(id: LayerId, raw: &Value) -> Result<(), serde_json::Error> {
    let (ok, expected) = match id.geometry() {
        GeometryKind::PointSeries => (raw.is_object(), "an object with a `points` array"),
        GeometryKind::HexagonSeries => (raw.is_object(), "an object with a `hexagons` array"),
        GeometryKind::EventList => (raw.is_array(), "an array of events"),
    };
    if ok {
        Ok(())
    } else {
        Err(serde::de::Error::custom(format!(
            "expected {expected}, found {}",
            json_kind(raw)
        )))
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn decode_payload(id: LayerId, raw: Value) -> Result<LayerPayload, serde_json::Error> {
    check_shape(id, &raw)?;
    Ok(match id {
        LayerId::Routes | LayerId::SpeedZones => {
            let wire: WirePoints = serde_json::from_value(raw)?;
            LayerPayload::PointSeries {
                points: wire.points.unwrap_or_default(),
            }
        }
        LayerId::Demand | LayerId::Availability => {
            let wire: WireHexagons = serde_json::from_value(raw)?;
            let hexagons = wire.hexagons.unwrap_or_default();
            let invalid = hexagons.iter().filter(|h| h.cell().is_none()).count();
            if invalid > 0 {
                log::warn!("Layer '{id}' has {invalid} hexagons with invalid H3 indices");
            }
            LayerPayload::HexagonSeries { hexagons }
        }
        LayerId::Violations => LayerPayload::EventList {
            events: LayerEvents::Violations(decode_events::<SpeedViolation>(raw)?),
        },
        LayerId::Anomalies => LayerPayload::EventList {
            events: LayerEvents::Anomalies(decode_events::<TripAnomaly>(raw)?),
        },
        LayerId::TrafficJams => LayerPayload::EventList {
            events: LayerEvents::TrafficJams(decode_events::<TrafficJam>(raw)?),
        },
    })
}

fn decode_events<T: serde::de::DeserializeOwned>(raw: Value) -> Result<Vec<T>, serde_json::Error> {
    let events: Option<Vec<T>> = serde_json::from_value(raw)?;
    Ok(events.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayerEventRef;
    use chrono::TimeZone;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "metadata": {
                "total_records": 1234,
                "generated_at": "2024-05-01T12:00:00Z",
                "layers": {
                    "routes": { "description": "Top corridors this week" }
                },
                "city": "Tallinn"
            },
            "layers": {
                "routes": { "points": [
                    { "lat": 59.43, "lng": 24.75, "weight": 3.0 },
                    { "lat": 59.44, "lng": 24.76 }
                ]},
                "demand": { "hexagons": [] },
                "availability": { "hexagons": null },
                "violations": [
                    { "lat": 59.42, "lng": 24.70, "speed": 84.0, "speed_limit": 50.0 }
                ],
                "anomalies": null,
                "traffic_jams": [],
                "heat_islands": { "points": [] }
            }
        })
    }

    #[test]
    fn decodes_each_geometry_once() {
        let dataset = AnalysisDataset::from_json_value(document()).unwrap();

        assert_eq!(dataset.metadata.total_records, 1234);
        assert_eq!(dataset.metadata.extra.get("city"), Some(&json!("Tallinn")));

        let routes = dataset.layer(LayerId::Routes).unwrap();
        assert_eq!(routes.points().unwrap().len(), 2);

        let demand = dataset.layer(LayerId::Demand).unwrap();
        assert!(demand.is_empty());

        let availability = dataset.layer(LayerId::Availability).unwrap();
        assert_eq!(availability.geometry(), GeometryKind::HexagonSeries);
        assert!(availability.is_empty());

        let violations = dataset.layer(LayerId::Violations).unwrap();
        assert_eq!(violations.len(), 1);

        assert!(dataset.layer(LayerId::Anomalies).is_none());
        assert!(dataset.layer(LayerId::SpeedZones).is_none());
        assert!(dataset.layer(LayerId::TrafficJams).unwrap().is_empty());
    }

    #[test]
    fn unknown_layers_are_ignored() {
        let dataset = AnalysisDataset::from_json_value(document()).unwrap();
        let ids: Vec<LayerId> = dataset.layer_ids().collect();
        assert_eq!(
            ids,
            vec![
                LayerId::Routes,
                LayerId::Demand,
                LayerId::Availability,
                LayerId::Violations,
                LayerId::TrafficJams,
            ]
        );
    }

    #[test]
    fn layer_description_comes_from_metadata() {
        let dataset = AnalysisDataset::from_json_value(document()).unwrap();
        assert_eq!(
            dataset.layer_description(LayerId::Routes),
            Some("Top corridors this week")
        );
        assert_eq!(dataset.layer_description(LayerId::Demand), None);
    }

    #[test]
    fn wrong_shape_fails_the_document() {
        let mut doc = document();
        doc["layers"]["routes"] = json!([{ "lat": 1.0, "lng": 2.0 }]);
        let err = AnalysisDataset::from_json_value(doc).unwrap_err();
        assert!(
            matches!(err, DatasetError::Layer { layer: LayerId::Routes, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn series_layer_given_as_array_fails() {
        for routes in [json!([]), json!([[{ "lat": 1.0, "lng": 2.0 }]])] {
            let mut doc = document();
            doc["layers"]["routes"] = routes;
            let err = AnalysisDataset::from_json_value(doc).unwrap_err();
            assert!(
                matches!(err, DatasetError::Layer { layer: LayerId::Routes, .. }),
                "unexpected error: {err}"
            );
            assert!(err.to_string().contains("found an array"), "{err}");
        }

        let mut doc = document();
        doc["layers"]["availability"] = json!([{ "h3_index": "8928308280fffff", "value": 1 }]);
        let err = AnalysisDataset::from_json_value(doc).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Layer {
                layer: LayerId::Availability,
                ..
            }
        ));
    }

    #[test]
    fn event_layer_given_as_object_fails() {
        let mut doc = document();
        doc["layers"]["traffic_jams"] = json!({ "events": [] });
        let err = AnalysisDataset::from_json_value(doc).unwrap_err();
        assert!(
            matches!(err, DatasetError::Layer { layer: LayerId::TrafficJams, .. }),
            "unexpected error: {err}"
        );
        assert!(err.to_string().contains("expected an array of events"), "{err}");
    }

    #[test]
    fn naive_generated_at_is_utc() {
        let mut doc = document();
        doc["metadata"]["generated_at"] = json!("2024-05-01T12:00:00");
        let dataset = AnalysisDataset::from_json_value(doc).unwrap();
        assert_eq!(
            dataset.metadata.generated_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn unparseable_generated_at_names_the_value() {
        let mut doc = document();
        doc["metadata"]["generated_at"] = json!("soon");
        let err = AnalysisDataset::from_json_value(doc).unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
        assert!(err.to_string().contains("invalid timestamp 'soon'"), "{err}");
    }

    #[test]
    fn violation_without_speed_decodes() {
        let mut doc = document();
        doc["layers"]["violations"] = json!([{ "lat": 59.42, "lng": 24.70 }]);
        let dataset = AnalysisDataset::from_json_value(doc).unwrap();
        let events = dataset.layer(LayerId::Violations).unwrap().events().unwrap();
        assert!(matches!(
            events.get(0),
            Some(LayerEventRef::Violation(SpeedViolation { speed: None, .. }))
        ));
    }

    #[test]
    fn missing_metadata_fails() {
        let err = AnalysisDataset::from_json_str(r#"{ "layers": {} }"#).unwrap_err();
        assert!(matches!(err, DatasetError::Json(_)));
    }

    #[test]
    fn missing_layers_object_is_an_empty_dataset() {
        let dataset = AnalysisDataset::from_json_str(
            r#"{ "metadata": { "total_records": 0, "generated_at": "2024-05-01T00:00:00Z" } }"#,
        )
        .unwrap();
        assert_eq!(dataset.layer_ids().count(), 0);
    }

    #[test]
    fn insert_rejects_geometry_mismatch() {
        let metadata = DatasetMetadata::new(0, Utc::now());
        let err = AnalysisDataset::new(metadata)
            .with_layer(
                LayerId::Demand,
                LayerPayload::PointSeries { points: Vec::new() },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::GeometryMismatch {
                layer: LayerId::Demand,
                expected: GeometryKind::HexagonSeries,
                actual: GeometryKind::PointSeries,
            }
        ));
    }

    #[test]
    fn insert_rejects_foreign_event_shape() {
        let metadata = DatasetMetadata::new(0, Utc::now());
        let err = AnalysisDataset::new(metadata)
            .with_layer(
                LayerId::Anomalies,
                LayerPayload::EventList {
                    events: LayerEvents::TrafficJams(Vec::new()),
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::EventShapeMismatch {
                layer: LayerId::Anomalies
            }
        ));
    }
}
