//! Mapping active layers to renderer families.
//!
//! [`MapCompositionDispatcher::dispatch`] is a pure function of the active
//! set and the dataset: the same inputs always produce the same plan, in
//! display order. Click wiring goes through a [`LayerClickHandler`]
//! supplied at construction; the default handler ignores every click.

use std::sync::Arc;

use ride_map_layer_models::{AnalysisDataset, Hexagon, LayerEventRef, LayerId, LayerPayload};
use serde::Serialize;
use strum_macros::Display;

use crate::activation::ActiveLayerSet;
use crate::availability::is_available;

/// Shape used to draw each event of an event layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarkerShape {
    /// A point marker (`violations`, `anomalies`).
    Point,
    /// A circle overlay (`traffic_jams`).
    Circle,
}

/// Family of renderer that draws a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererFamily {
    /// Weighted heatmap of points.
    Heatmap,
    /// H3 hexagon grid. Supports hexagon clicks.
    HexGrid,
    /// One marker per event. Supports event clicks.
    Markers(MarkerShape),
}

impl std::fmt::Display for RendererFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heatmap => write!(f, "heatmap"),
            Self::HexGrid => write!(f, "hex_grid"),
            Self::Markers(shape) => write!(f, "markers({shape})"),
        }
    }
}

impl RendererFamily {
    /// Renderer family for `payload` on layer `layer`.
    #[must_use]
    pub const fn for_payload(layer: LayerId, payload: &LayerPayload) -> Self {
        match payload {
            LayerPayload::PointSeries { .. } => Self::Heatmap,
            LayerPayload::HexagonSeries { .. } => Self::HexGrid,
            LayerPayload::EventList { .. } => match layer {
                LayerId::TrafficJams => Self::Markers(MarkerShape::Circle),
                _ => Self::Markers(MarkerShape::Point),
            },
        }
    }
}

/// Receives clicks on hexagons and events.
///
/// Both methods default to doing nothing, so implementors only override
/// what they care about.
pub trait LayerClickHandler: Send + Sync {
    /// A hexagon of a hex-grid layer was clicked.
    fn on_hexagon_click(&self, _layer: LayerId, _hexagon: &Hexagon) {}

    /// An event of an event layer was clicked.
    fn on_event_click(&self, _layer: LayerId, _event: LayerEventRef<'_>) {}
}

/// A [`LayerClickHandler`] that ignores every click.
pub struct NoopClickHandler;

impl LayerClickHandler for NoopClickHandler {}

/// One renderer to instantiate: a layer, its renderer family, and the
/// borrowed data to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerRender<'a> {
    /// Layer being drawn.
    pub layer: LayerId,
    /// Renderer family drawing it.
    pub family: RendererFamily,
    /// Non-empty payload of the layer.
    pub payload: &'a LayerPayload,
}

impl LayerRender<'_> {
    /// `(layer, family)` identity of this render.
    #[must_use]
    pub const fn key(&self) -> (LayerId, RendererFamily) {
        (self.layer, self.family)
    }
}

/// Chooses a renderer for every active, available layer and routes clicks
/// to the configured handler.
#[derive(Clone)]
pub struct MapCompositionDispatcher {
    click_handler: Arc<dyn LayerClickHandler>,
}

impl Default for MapCompositionDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(NoopClickHandler))
    }
}

impl std::fmt::Debug for MapCompositionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapCompositionDispatcher").finish_non_exhaustive()
    }
}

impl MapCompositionDispatcher {
    /// Creates a dispatcher routing clicks to `click_handler`.
    #[must_use]
    pub fn new(click_handler: Arc<dyn LayerClickHandler>) -> Self {
        Self { click_handler }
    }

    /// Builds the render plan for `active` over `dataset`.
    ///
    /// Layers that are inactive or unavailable produce nothing. The plan is
    /// in display order.
    #[must_use]
    pub fn dispatch<'a>(
        &self,
        active: &ActiveLayerSet,
        dataset: Option<&'a AnalysisDataset>,
    ) -> Vec<LayerRender<'a>> {
        let Some(dataset) = dataset else {
            return Vec::new();
        };

        active
            .iter()
            .filter(|id| is_available(Some(dataset), *id))
            .filter_map(|id| {
                dataset.layer(id).map(|payload| LayerRender {
                    layer: id,
                    family: RendererFamily::for_payload(id, payload),
                    payload,
                })
            })
            .collect()
    }

    /// Delivers a click on item `index` of `render` to the click handler.
    ///
    /// Heatmaps are not clickable. Returns whether a handler was invoked.
    pub fn click(&self, render: &LayerRender<'_>, index: usize) -> bool {
        match render.payload {
            LayerPayload::PointSeries { .. } => false,
            LayerPayload::HexagonSeries { hexagons } => {
                hexagons.get(index).is_some_and(|hexagon| {
                    log::debug!("Hexagon {} clicked on '{}'", hexagon.h3_index, render.layer);
                    self.click_handler.on_hexagon_click(render.layer, hexagon);
                    true
                })
            }
            LayerPayload::EventList { events } => events.get(index).is_some_and(|event| {
                log::debug!("Event {index} clicked on '{}'", render.layer);
                self.click_handler.on_event_click(render.layer, event);
                true
            }),
        }
    }
}
