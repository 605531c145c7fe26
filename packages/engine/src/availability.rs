//! Layer availability.
//!
//! A layer is available when the store is `Ready` and the layer's payload
//! is present and non-empty. This is the only place that decides it; the
//! listing, the activation set and the dispatcher all defer to
//! [`is_available`].

use std::collections::BTreeMap;

use ride_map_layer_models::{AnalysisDataset, LayerId};

/// Whether layer `id` may be listed, toggled on, or rendered.
///
/// `dataset` is `None` whenever the store is not `Ready`, in which case
/// every layer is unavailable.
#[must_use]
pub fn is_available(dataset: Option<&AnalysisDataset>, id: LayerId) -> bool {
    dataset
        .and_then(|d| d.layer(id))
        .is_some_and(|payload| !payload.is_empty())
}

/// Every available layer, in display order.
#[must_use]
pub fn available_layers(dataset: Option<&AnalysisDataset>) -> Vec<LayerId> {
    LayerId::ALL
        .into_iter()
        .filter(|id| is_available(dataset, *id))
        .collect()
}

/// Availability of every layer, keyed by id.
#[must_use]
pub fn availability_map(dataset: Option<&AnalysisDataset>) -> BTreeMap<LayerId, bool> {
    LayerId::ALL
        .into_iter()
        .map(|id| (id, is_available(dataset, id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn nothing_is_available_without_a_dataset() {
        for id in LayerId::ALL {
            assert!(!is_available(None, id), "{id}");
        }
        assert!(available_layers(None).is_empty());
    }

    #[test]
    fn absent_layers_are_unavailable() {
        let dataset = fixtures::dataset();
        for id in LayerId::ALL {
            if dataset.layer(id).is_none() {
                assert!(!is_available(Some(&dataset), id), "{id}");
            }
        }
    }

    #[test]
    fn empty_sequences_are_unavailable() {
        let dataset = fixtures::dataset();
        // One empty payload per geometry kind.
        for id in [LayerId::SpeedZones, LayerId::Demand, LayerId::Anomalies] {
            let payload = dataset.layer(id).unwrap();
            assert!(payload.is_empty(), "{id}");
            assert!(!is_available(Some(&dataset), id), "{id}");
        }

        let mut active = crate::ActiveLayerSet::new();
        active.enable_all(Some(&dataset));
        for id in [LayerId::SpeedZones, LayerId::Demand, LayerId::Anomalies] {
            assert!(!active.contains(id), "{id}");
        }
    }

    #[test]
    fn non_empty_sequences_are_available() {
        let dataset = fixtures::dataset();
        assert_eq!(
            available_layers(Some(&dataset)),
            vec![LayerId::Routes, LayerId::Violations, LayerId::TrafficJams]
        );
    }

    #[test]
    fn map_covers_every_layer() {
        let dataset = fixtures::full_dataset();
        let map = availability_map(Some(&dataset));
        assert_eq!(map.len(), LayerId::ALL.len());
        assert!(map.values().all(|available| *available));
    }
}
