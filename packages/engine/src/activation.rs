//! The set of layers the user has switched on.

use std::collections::BTreeSet;

use ride_map_layer_models::{AnalysisDataset, LayerId};

use crate::availability::{available_layers, is_available};

/// Currently visible layers. Empty at session start, never persisted.
///
/// Every mutation checks availability against the dataset it is given, so
/// an unavailable layer never enters the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveLayerSet {
    layers: BTreeSet<LayerId>,
}

impl ActiveLayerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present.
    ///
    /// Toggling an unavailable layer is silently rejected. Returns whether
    /// the set changed.
    pub fn toggle(&mut self, id: LayerId, dataset: Option<&AnalysisDataset>) -> bool {
        if !is_available(dataset, id) {
            log::debug!("Rejecting toggle of unavailable layer '{id}'");
            return false;
        }

        if !self.layers.remove(&id) {
            self.layers.insert(id);
        }
        log::debug!("Toggled layer '{id}' (active: {})", self.contains(id));
        true
    }

    /// Sets membership to exactly the available layers.
    pub fn enable_all(&mut self, dataset: Option<&AnalysisDataset>) {
        self.layers = available_layers(dataset).into_iter().collect();
        log::debug!("Enabled all {} available layers", self.layers.len());
    }

    /// Empties the set.
    pub fn clear_all(&mut self) {
        self.layers.clear();
    }

    /// Whether `id` is active.
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains(&id)
    }

    /// Active layers in display order.
    pub fn iter(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().copied()
    }

    /// Number of active layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
