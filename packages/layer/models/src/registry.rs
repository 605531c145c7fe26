//! Compile-time registry of layer display metadata.
//!
//! The metadata for all seven layers is defined in `layers.toml`, embedded
//! at compile time and parsed once on first use. Lookups never fail: every
//! [`LayerId`] is guaranteed an entry (enforced by the tests below).

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::LayerId;

/// Static display metadata for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// Layer this entry describes.
    pub id: LayerId,
    /// Human-readable name.
    pub name: String,
    /// Default description, used when the dataset does not supply one.
    pub description: String,
    /// Caption shown in the legend while the layer is active.
    pub legend: String,
    /// Display icon.
    pub icon: String,
    /// Display color as a `#RRGGBB` hex string.
    pub color: String,
}

impl LayerMetadata {
    /// Resolves the description to display: a non-blank dataset-supplied
    /// description wins, otherwise the static default.
    #[must_use]
    pub fn resolve_description<'a>(&'a self, supplied: Option<&'a str>) -> &'a str {
        supplied
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.description.as_str())
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    layer: Vec<LayerMetadata>,
}

const LAYERS_TOML: &str = include_str!("../layers.toml");

/// Entries indexed by position in [`LayerId::ALL`].
static REGISTRY: LazyLock<Vec<LayerMetadata>> = LazyLock::new(|| {
    let file: RegistryFile = toml::de::from_str(LAYERS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse layers.toml: {e}"));

    LayerId::ALL
        .iter()
        .map(|id| {
            file.layer
                .iter()
                .find(|m| m.id == *id)
                .cloned()
                .unwrap_or_else(|| panic!("layers.toml has no entry for '{id}'"))
        })
        .collect()
});

/// Returns the metadata for `id`.
///
/// # Panics
///
/// Panics if the embedded `layers.toml` is malformed or is missing an
/// entry (this is a compile-time guarantee since the file is embedded).
#[must_use]
pub fn metadata(id: LayerId) -> &'static LayerMetadata {
    // `LayerId::ALL` is in declaration order.
    &REGISTRY[id as usize]
}

/// Returns the metadata for every layer, in display order.
#[must_use]
pub fn all() -> &'static [LayerMetadata] {
    &REGISTRY
}
