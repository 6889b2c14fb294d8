use std::collections::HashSet;

use thiserror::Error;

use super::overlay_asset::OverlayAsset;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("catalog must contain at least one asset")]
    Empty,
    #[error("duplicate asset id: {0}")]
    DuplicateId(String),
    #[error("unknown asset: {0}")]
    UnknownAsset(String),
}

/// Ordered, immutable list of selectable overlay assets.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayCatalog {
    assets: Vec<OverlayAsset>,
}

impl OverlayCatalog {
    pub fn new(assets: Vec<OverlayAsset>) -> Result<Self, CatalogError> {
        if assets.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for asset in &assets {
            if !seen.insert(asset.id.as_str()) {
                return Err(CatalogError::DuplicateId(asset.id.clone()));
            }
        }
        Ok(Self { assets })
    }

    /// The four built-in eyewear styles, aviator first.
    pub fn builtin() -> Self {
        Self {
            assets: vec![
                OverlayAsset::new(
                    "aviator",
                    "Aviator Elite",
                    "Timeless teardrop silhouette",
                    "#1c1c1c",
                    145.0,
                    55.0,
                    20.0,
                    145.0,
                ),
                OverlayAsset::new(
                    "rectangular",
                    "Executive",
                    "Sharp modern frames",
                    "#252525",
                    140.0,
                    48.0,
                    18.0,
                    140.0,
                ),
                OverlayAsset::new(
                    "round",
                    "Visionary",
                    "Bold circular design",
                    "#1a1a1a",
                    130.0,
                    52.0,
                    22.0,
                    135.0,
                ),
                OverlayAsset::new(
                    "oversized",
                    "Square Luxe",
                    "Dramatic luxury frames",
                    "#0f0f0f",
                    135.0,
                    52.0,
                    22.0,
                    135.0,
                ),
            ],
        }
    }

    pub fn assets(&self) -> &[OverlayAsset] {
        &self.assets
    }

    pub fn get(&self, id: &str) -> Option<&OverlayAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Falls back to the first asset for unknown ids.
    pub fn get_or_default(&self, id: &str) -> &OverlayAsset {
        self.get(id).unwrap_or_else(|| self.default_asset())
    }

    pub fn default_asset(&self) -> &OverlayAsset {
        &self.assets[0]
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for OverlayCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
