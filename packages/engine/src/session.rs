//! One dashboard session: the store, the user's active layers, the
//! dispatcher and what is currently mounted on the map.

use std::collections::BTreeMap;
use std::sync::Arc;

use ride_map_layer_models::{AnalysisDataset, LayerId};
use ride_map_store::{AnalysisDataStore, DatasetFetcher, FetchError, FetchState, FetchTicket};

use crate::activation::ActiveLayerSet;
use crate::availability::{availability_map, is_available};
use crate::composition::{CompositionChange, MapComposition, RendererHost};
use crate::dispatch::{LayerClickHandler, LayerRender, MapCompositionDispatcher};
use crate::listing::{self, LayerListing, LegendEntry, SessionSummary};
use crate::selector::{self, LayerSelection};

/// What the dashboard should show instead of (or as) the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing fetched yet.
    Empty,
    /// Spinner.
    Loading,
    /// Error panel with a reload affordance.
    Failed {
        /// Human-readable failure.
        message: String,
    },
    /// The map with the active layers.
    Map,
}

impl ViewStatus {
    /// Derives the view status from a fetch state.
    #[must_use]
    pub fn from_state(state: &FetchState) -> Self {
        match state {
            FetchState::Idle => Self::Empty,
            FetchState::Loading => Self::Loading,
            FetchState::Failed(message) => Self::Failed {
                message: message.clone(),
            },
            FetchState::Ready(_) => Self::Map,
        }
    }
}

impl std::fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Loading => write!(f, "loading"),
            Self::Failed { message } => write!(f, "failed: {message}"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// A dashboard session from mount to unmount.
#[derive(Debug, Default)]
pub struct DashboardSession {
    store: AnalysisDataStore,
    active: ActiveLayerSet,
    dispatcher: MapCompositionDispatcher,
    composition: MapComposition,
}

impl DashboardSession {
    /// Creates a session whose clicks go nowhere.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session routing hexagon and event clicks to
    /// `click_handler`.
    #[must_use]
    pub fn with_click_handler(click_handler: Arc<dyn LayerClickHandler>) -> Self {
        Self {
            dispatcher: MapCompositionDispatcher::new(click_handler),
            ..Self::default()
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &AnalysisDataStore {
        &self.store
    }

    /// The user's active layers.
    #[must_use]
    pub const fn active(&self) -> &ActiveLayerSet {
        &self.active
    }

    /// The loaded dataset, only while `Ready`.
    #[must_use]
    pub const fn dataset(&self) -> Option<&AnalysisDataset> {
        self.store.dataset()
    }

    /// Starts the session's fetch. See [`AnalysisDataStore::begin_fetch`].
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        self.store.begin_fetch()
    }

    /// Applies a fetch outcome. See [`AnalysisDataStore::complete_fetch`].
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<AnalysisDataset, FetchError>,
    ) -> bool {
        self.store.complete_fetch(ticket, result)
    }

    /// Dashboard mount: runs the session's single fetch with `fetcher`.
    ///
    /// Returns whether a fetch ran to completion and was applied.
    pub async fn mount(&mut self, fetcher: &dyn DatasetFetcher) -> bool {
        self.store.activate(fetcher).await
    }

    /// Dashboard unmount: tears down every renderer and disposes the store.
    /// A fetch still in flight is dropped when it completes.
    pub fn unmount(&mut self, host: &mut dyn RendererHost) {
        self.composition.clear(host);
        self.active.clear_all();
        self.store.unmount();
    }

    /// Full reload: clears the map and the active set, forgets the dataset
    /// or failure, and fetches once more with `fetcher`.
    pub async fn reload(
        &mut self,
        host: &mut dyn RendererHost,
        fetcher: &dyn DatasetFetcher,
    ) -> bool {
        self.composition.clear(host);
        self.active.clear_all();
        self.store.reload();
        self.store.activate(fetcher).await
    }

    /// Toggles layer `id`. Unavailable layers are rejected.
    pub fn toggle(&mut self, id: LayerId) -> bool {
        self.active.toggle(id, self.store.dataset())
    }

    /// Activates exactly the available layers.
    pub fn enable_all(&mut self) {
        self.active.enable_all(self.store.dataset());
    }

    /// Deactivates every layer.
    pub fn clear_all(&mut self) {
        self.active.clear_all();
    }

    /// Whether layer `id` may be shown right now.
    #[must_use]
    pub fn is_available(&self, id: LayerId) -> bool {
        is_available(self.store.dataset(), id)
    }

    /// Availability of every layer.
    #[must_use]
    pub fn availability(&self) -> BTreeMap<LayerId, bool> {
        availability_map(self.store.dataset())
    }

    /// Layer `id`'s slice of the store.
    #[must_use]
    pub fn select(&self, id: LayerId) -> LayerSelection<'_> {
        selector::select(&self.store, id)
    }

    /// Current render plan.
    #[must_use]
    pub fn plan(&self) -> Vec<LayerRender<'_>> {
        self.dispatcher.dispatch(&self.active, self.store.dataset())
    }

    /// Brings `host` in line with the current render plan.
    pub fn compose(&mut self, host: &mut dyn RendererHost) -> CompositionChange {
        let plan = self.dispatcher.dispatch(&self.active, self.store.dataset());
        self.composition.apply(self.store.generation(), &plan, host)
    }

    /// Whether `layer` currently has a renderer mounted.
    #[must_use]
    pub fn is_mounted(&self, layer: LayerId) -> bool {
        self.composition.is_mounted(layer)
    }

    /// Clicks item `index` of `layer`. Returns whether a handler ran.
    pub fn click(&self, layer: LayerId, index: usize) -> bool {
        self.plan()
            .iter()
            .find(|render| render.layer == layer)
            .is_some_and(|render| self.dispatcher.click(render, index))
    }

    /// Toggleable layers in display order.
    #[must_use]
    pub fn listing(&self) -> Vec<LayerListing<'_>> {
        listing::layer_listing(self.store.dataset(), &self.active)
    }

    /// Legend for the active layers.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        listing::legend(self.store.dataset(), &self.active)
    }

    /// Session summary, once the dataset is loaded.
    #[must_use]
    pub fn summary(&self) -> Option<SessionSummary> {
        listing::summary(self.store.dataset(), &self.active)
    }

    /// What the dashboard should display.
    #[must_use]
    pub fn view_status(&self) -> ViewStatus {
        ViewStatus::from_state(self.store.state())
    }
}
