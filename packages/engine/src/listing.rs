//! Presentation-facing views: the toggleable layer list, the legend of
//! active layers, and the session summary.

use ride_map_layer_models::{AnalysisDataset, LayerId};
use serde::Serialize;

use crate::activation::ActiveLayerSet;
use crate::availability::{available_layers, is_available};

/// One row of the layer picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerListing<'a> {
    /// Layer id.
    pub id: LayerId,
    /// Display name.
    pub name: &'static str,
    /// Dataset-supplied description, or the registry default.
    pub description: &'a str,
    /// Display icon.
    pub icon: &'static str,
    /// Display color.
    pub color: &'static str,
    /// Whether the layer is currently active.
    pub active: bool,
}

/// One entry of the legend shown while layers are active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Layer id.
    pub id: LayerId,
    /// Display name.
    pub name: &'static str,
    /// Renderer-aware caption.
    pub caption: &'static str,
    /// Swatch color.
    pub color: &'static str,
}

/// Headline numbers for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Records the dataset was computed from.
    pub total_records: u64,
    /// Active layer count.
    pub active_layers: usize,
    /// Available layer count.
    pub available_layers: usize,
}

/// Layers the user may toggle, in display order. Unavailable layers are
/// never listed.
#[must_use]
pub fn layer_listing<'a>(
    dataset: Option<&'a AnalysisDataset>,
    active: &ActiveLayerSet,
) -> Vec<LayerListing<'a>> {
    let Some(dataset) = dataset else {
        return Vec::new();
    };

    available_layers(Some(dataset))
        .into_iter()
        .map(|id| {
            let meta = id.metadata();
            LayerListing {
                id,
                name: &meta.name,
                description: meta.resolve_description(dataset.layer_description(id)),
                icon: &meta.icon,
                color: &meta.color,
                active: active.contains(id),
            }
        })
        .collect()
}

/// Legend entries for every active, available layer.
#[must_use]
pub fn legend(dataset: Option<&AnalysisDataset>, active: &ActiveLayerSet) -> Vec<LegendEntry> {
    active
        .iter()
        .filter(|id| is_available(dataset, *id))
        .map(|id| {
            let meta = id.metadata();
            LegendEntry {
                id,
                name: &meta.name,
                caption: &meta.legend,
                color: &meta.color,
            }
        })
        .collect()
}

/// Session summary, or `None` until the dataset is loaded.
#[must_use]
pub fn summary(dataset: Option<&AnalysisDataset>, active: &ActiveLayerSet) -> Option<SessionSummary> {
    dataset.map(|d| SessionSummary {
        total_records: d.metadata.total_records,
        active_layers: active.iter().filter(|id| is_available(dataset, *id)).count(),
        available_layers: available_layers(dataset).len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn listing_shows_only_available_layers() {
        let dataset = fixtures::dataset();
        let mut active = ActiveLayerSet::new();
        active.toggle(LayerId::TrafficJams, Some(&dataset));

        let listing = layer_listing(Some(&dataset), &active);
        let ids: Vec<LayerId> = listing.iter().map(|l| l.id).collect();
        assert_eq!(
            ids,
            vec![LayerId::Routes, LayerId::Violations, LayerId::TrafficJams]
        );
        assert!(listing[2].active);
        assert!(!listing[0].active);
        assert_eq!(listing[0].name, "Popular Routes");
        assert_eq!(listing[0].color, "#3B82F6");
    }

    #[test]
    fn dataset_description_wins() {
        let dataset = fixtures::dataset();
        let listing = layer_listing(Some(&dataset), &ActiveLayerSet::new());

        let violations = listing.iter().find(|l| l.id == LayerId::Violations).unwrap();
        assert_eq!(violations.description, "Trips above 60 km/h in the last 24h");

        let routes = listing.iter().find(|l| l.id == LayerId::Routes).unwrap();
        assert_eq!(routes.description, "Most frequently used transportation paths");
    }

    #[test]
    fn nothing_listed_before_load() {
        assert!(layer_listing(None, &ActiveLayerSet::new()).is_empty());
        assert!(summary(None, &ActiveLayerSet::new()).is_none());
    }

    #[test]
    fn legend_follows_active_set() {
        let dataset = fixtures::dataset();
        let mut active = ActiveLayerSet::new();
        active.toggle(LayerId::Violations, Some(&dataset));

        let entries = legend(Some(&dataset), &active);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].caption, "Speed limit violations (>60 km/h)");

        assert!(legend(None, &active).is_empty());
    }

    #[test]
    fn summary_counts() {
        let dataset = fixtures::dataset();
        let mut active = ActiveLayerSet::new();
        active.toggle(LayerId::Routes, Some(&dataset));

        assert_eq!(
            summary(Some(&dataset), &active),
            Some(SessionSummary {
                total_records: 48_213,
                active_layers: 1,
                available_layers: 3,
            })
        );
    }
}
