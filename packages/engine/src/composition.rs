//! Applying render plans to a renderer host.
//!
//! The dispatcher only says what should be on the map. [`MapComposition`]
//! remembers what the host currently has mounted and turns each new plan
//! into the minimal set of mounts and unmounts. A layer that leaves the
//! plan is unmounted, never just hidden.
//!
//! Every plan is applied together with the generation of the dataset it was
//! built from (see [`ride_map_store::AnalysisDataStore::generation`]). When
//! the generation changes, every mounted renderer is remounted even if its
//! layer and family are unchanged, so no renderer keeps drawing old data.

use std::collections::BTreeMap;

use ride_map_layer_models::LayerId;

use crate::dispatch::{LayerRender, RendererFamily};

/// Something that can instantiate and tear down layer renderers (a map
/// widget, a test recorder, a terminal printer).
pub trait RendererHost {
    /// Instantiates a renderer for `render`.
    fn mount(&mut self, render: &LayerRender<'_>);

    /// Tears down the renderer of `layer`.
    fn unmount(&mut self, layer: LayerId, family: RendererFamily);
}

/// What one [`MapComposition::apply`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionChange {
    /// Layers newly mounted, in display order.
    pub mounted: Vec<LayerId>,
    /// Layers torn down, in display order.
    pub unmounted: Vec<LayerId>,
}

impl CompositionChange {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty() && self.unmounted.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mounted {
    family: RendererFamily,
    generation: u64,
}

/// Tracks the renderers currently mounted on a host.
#[derive(Debug, Clone, Default)]
pub struct MapComposition {
    mounted: BTreeMap<LayerId, Mounted>,
}

impl MapComposition {
    /// Creates a composition with nothing mounted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings `host` in line with `plan`, built from the dataset of
    /// `generation`.
    ///
    /// Renderers whose layer is missing from the plan, whose family
    /// changed, or that were mounted for another generation are unmounted
    /// first; then every planned layer not yet mounted is mounted.
    pub fn apply(
        &mut self,
        generation: u64,
        plan: &[LayerRender<'_>],
        host: &mut dyn RendererHost,
    ) -> CompositionChange {
        let mut change = CompositionChange::default();

        let stale: Vec<(LayerId, RendererFamily)> = self
            .mounted
            .iter()
            .filter(|(layer, mounted)| {
                mounted.generation != generation
                    || !plan
                        .iter()
                        .any(|render| render.key() == (**layer, mounted.family))
            })
            .map(|(layer, mounted)| (*layer, mounted.family))
            .collect();

        for (layer, family) in stale {
            log::debug!("Unmounting {family} renderer for '{layer}'");
            host.unmount(layer, family);
            self.mounted.remove(&layer);
            change.unmounted.push(layer);
        }

        for render in plan {
            if self.mounted.contains_key(&render.layer) {
                continue;
            }
            log::debug!(
                "Mounting {} renderer for '{}' ({} items, generation {generation})",
                render.family,
                render.layer,
                render.payload.len()
            );
            host.mount(render);
            self.mounted.insert(
                render.layer,
                Mounted {
                    family: render.family,
                    generation,
                },
            );
            change.mounted.push(render.layer);
        }

        change
    }

    /// Tears down every mounted renderer.
    pub fn clear(&mut self, host: &mut dyn RendererHost) -> CompositionChange {
        let mut change = CompositionChange::default();
        for (layer, mounted) in std::mem::take(&mut self.mounted) {
            log::debug!("Unmounting {} renderer for '{layer}'", mounted.family);
            host.unmount(layer, mounted.family);
            change.unmounted.push(layer);
        }
        change
    }

    /// Currently mounted renderers, in display order.
    pub fn mounted(&self) -> impl Iterator<Item = (LayerId, RendererFamily)> + '_ {
        self.mounted
            .iter()
            .map(|(layer, mounted)| (*layer, mounted.family))
    }

    /// Whether `layer` has a mounted renderer.
    #[must_use]
    pub fn is_mounted(&self, layer: LayerId) -> bool {
        self.mounted.contains_key(&layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActiveLayerSet;
    use crate::dispatch::MapCompositionDispatcher;
    use crate::fixtures;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
    }

    impl RendererHost for Recorder {
        fn mount(&mut self, render: &LayerRender<'_>) {
            self.log.push(format!("+{}:{}", render.layer, render.family));
        }

        fn unmount(&mut self, layer: LayerId, family: RendererFamily) {
            self.log.push(format!("-{layer}:{family}"));
        }
    }

    #[test]
    fn removing_a_layer_tears_down_its_renderer() {
        let dataset = fixtures::dataset();
        let dispatcher = MapCompositionDispatcher::default();
        let mut active = ActiveLayerSet::new();
        let mut composition = MapComposition::new();
        let mut host = Recorder::default();

        active.enable_all(Some(&dataset));
        let change = composition.apply(0, &dispatcher.dispatch(&active, Some(&dataset)), &mut host);
        assert_eq!(
            change.mounted,
            vec![LayerId::Routes, LayerId::Violations, LayerId::TrafficJams]
        );

        active.toggle(LayerId::Violations, Some(&dataset));
        let change = composition.apply(0, &dispatcher.dispatch(&active, Some(&dataset)), &mut host);
        assert_eq!(change.unmounted, vec![LayerId::Violations]);
        assert!(change.mounted.is_empty());
        assert!(!composition.is_mounted(LayerId::Violations));

        assert_eq!(
            host.log,
            vec![
                "+routes:heatmap",
                "+violations:markers(point)",
                "+traffic_jams:markers(circle)",
                "-violations:markers(point)",
            ]
        );
    }

    #[test]
    fn unchanged_plan_changes_nothing() {
        let dataset = fixtures::dataset();
        let dispatcher = MapCompositionDispatcher::default();
        let mut active = ActiveLayerSet::new();
        active.enable_all(Some(&dataset));
        let mut composition = MapComposition::new();
        let mut host = Recorder::default();

        composition.apply(0, &dispatcher.dispatch(&active, Some(&dataset)), &mut host);
        let change = composition.apply(0, &dispatcher.dispatch(&active, Some(&dataset)), &mut host);
        assert!(change.is_empty());
        assert_eq!(host.log.len(), 3);
    }

    #[test]
    fn new_generation_remounts_unchanged_layers() {
        let first = fixtures::dataset();
        let second = fixtures::dataset();
        let dispatcher = MapCompositionDispatcher::default();
        let mut active = ActiveLayerSet::new();
        active.toggle(LayerId::Routes, Some(&first));
        let mut composition = MapComposition::new();
        let mut host = Recorder::default();

        composition.apply(0, &dispatcher.dispatch(&active, Some(&first)), &mut host);
        let change = composition.apply(1, &dispatcher.dispatch(&active, Some(&second)), &mut host);

        assert_eq!(change.unmounted, vec![LayerId::Routes]);
        assert_eq!(change.mounted, vec![LayerId::Routes]);
        assert_eq!(
            host.log,
            vec!["+routes:heatmap", "-routes:heatmap", "+routes:heatmap"]
        );

        let change = composition.apply(1, &dispatcher.dispatch(&active, Some(&second)), &mut host);
        assert!(change.is_empty());
    }

    #[test]
    fn clear_unmounts_everything() {
        let dataset = fixtures::full_dataset();
        let dispatcher = MapCompositionDispatcher::default();
        let mut active = ActiveLayerSet::new();
        active.enable_all(Some(&dataset));
        let mut composition = MapComposition::new();
        let mut host = Recorder::default();

        composition.apply(0, &dispatcher.dispatch(&active, Some(&dataset)), &mut host);
        let change = composition.clear(&mut host);
        assert_eq!(change.unmounted.len(), LayerId::ALL.len());
        assert_eq!(composition.mounted().count(), 0);
    }
}
