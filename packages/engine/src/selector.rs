//! Per-layer read access to the store.

use ride_map_layer_models::{LayerId, LayerPayload};
use ride_map_store::{AnalysisDataStore, FetchPhase};

use crate::availability::is_available;

/// One layer's view of the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSelection<'a> {
    /// The layer's payload, only while the store is `Ready`. May be empty.
    pub data: Option<&'a LayerPayload>,
    /// Whether the layer may be shown.
    pub is_available: bool,
    /// The store's fetch phase at selection time.
    pub phase: FetchPhase,
}

impl LayerSelection<'_> {
    /// Whether the store is still fetching.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }
}

/// Selects layer `id` from `store`.
///
/// Derived from the store's current state on every call; nothing is
/// cached, so a store that left `Ready` never yields old data.
#[must_use]
pub fn select(store: &AnalysisDataStore, id: LayerId) -> LayerSelection<'_> {
    let dataset = store.dataset();
    LayerSelection {
        data: dataset.and_then(|d| d.layer(id)),
        is_available: is_available(dataset, id),
        phase: store.phase(),
    }
}
