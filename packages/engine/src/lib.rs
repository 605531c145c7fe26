#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics layer engine for the ride map dashboard.
//!
//! Sits between the [`AnalysisDataStore`] and whatever draws the map:
//!
//! 1. [`availability`] decides which layers have data worth showing.
//! 2. [`activation`] holds the user's set of visible layers.
//! 3. [`selector`] hands each consumer the slice of data for one layer.
//! 4. [`dispatch`] maps every active, available layer to a renderer family.
//! 5. [`composition`] applies successive dispatch plans to a renderer host,
//!    tearing down layers that left the plan.
//!
//! [`DashboardSession`] bundles all of it with the session lifecycle.
//!
//! [`AnalysisDataStore`]: ride_map_store::AnalysisDataStore

pub mod activation;
pub mod availability;
pub mod composition;
pub mod dispatch;
pub mod listing;
pub mod selector;
pub mod session;

pub use activation::ActiveLayerSet;
pub use availability::{availability_map, available_layers, is_available};
pub use composition::{CompositionChange, MapComposition, RendererHost};
pub use dispatch::{
    LayerClickHandler, LayerRender, MapCompositionDispatcher, MarkerShape, NoopClickHandler,
    RendererFamily,
};
pub use listing::{LayerListing, LegendEntry, SessionSummary, layer_listing, legend, summary};
pub use selector::{LayerSelection, select};
pub use session::{DashboardSession, ViewStatus};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use ride_map_layer_models::AnalysisDataset;
    use serde_json::json;

    /// Routes with 3 points, one violation, two jams. Demand, speed zones
    /// and anomalies are present but empty; availability is absent.
    pub fn dataset() -> AnalysisDataset {
        AnalysisDataset::from_json_value(json!({
            "metadata": {
                "total_records": 48_213,
                "generated_at": Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
                "layers": {
                    "violations": { "description": "Trips above 60 km/h in the last 24h" }
                }
            },
            "layers": {
                "routes": { "points": [
                    { "lat": 59.437, "lng": 24.745, "weight": 5.0 },
                    { "lat": 59.436, "lng": 24.753, "weight": 3.0 },
                    { "lat": 59.433, "lng": 24.760 }
                ]},
                "demand": { "hexagons": [] },
                "speed_zones": { "points": [] },
                "anomalies": [],
                "violations": [
                    { "lat": 59.420, "lng": 24.700, "speed": 84.0, "speed_limit": 50.0 }
                ],
                "traffic_jams": [
                    { "lat": 59.430, "lng": 24.740, "radius": 250.0, "severity": "high" },
                    { "lat": 59.441, "lng": 24.731, "radius": 120.0 }
                ]
            }
        }))
        .unwrap()
    }

    /// Every layer populated.
    pub fn full_dataset() -> AnalysisDataset {
        AnalysisDataset::from_json_value(json!({
            "metadata": { "total_records": 10, "generated_at": "2024-05-01T00:00:00Z" },
            "layers": {
                "routes": { "points": [{ "lat": 1.0, "lng": 1.0 }] },
                "speed_zones": { "points": [{ "lat": 2.0, "lng": 2.0, "weight": 0.4 }] },
                "demand": { "hexagons": [{ "h3_index": "8928308280fffff", "value": 9.0 }] },
                "availability": { "hexagons": [
                    { "h3_index": "8928308280fffff", "value": 2.0 },
                    { "h3_index": "89283082807ffff", "value": 5.0 }
                ]},
                "violations": [{ "lat": 3.0, "lng": 3.0, "speed": 90.0 }],
                "anomalies": [{ "lat": 4.0, "lng": 4.0, "anomaly_type": "detour" }],
                "traffic_jams": [{ "lat": 5.0, "lng": 5.0 }]
            }
        }))
        .unwrap()
    }
}
