use super::domain::overlay_asset::OverlayAsset;
use super::domain::overlay_catalog::{CatalogError, OverlayCatalog};
use super::domain::overlay_renderer::{OverlayDraw, OverlayRenderer};
use super::domain::placement_transform::PlacementTransform;
use crate::shared::viewport::Viewport;
use crate::tracking::domain::landmark_record::LandmarkRecord;

/// Turns landmark records into draws for the currently selected asset.
///
/// Holds no per-frame state: every draw is recomputed from the record,
/// the selection and the viewport, so a style switch applies on the very
/// next frame. Switching styles does not touch tracker smoothing.
pub struct OverlayPresenter {
    catalog: OverlayCatalog,
    selected: usize,
}

impl OverlayPresenter {
    pub fn new(catalog: OverlayCatalog) -> Self {
        Self {
            catalog,
            selected: 0,
        }
    }

    pub fn catalog(&self) -> &OverlayCatalog {
        &self.catalog
    }

    pub fn selected(&self) -> &OverlayAsset {
        &self.catalog.assets()[self.selected]
    }

    pub fn select(&mut self, id: &str) -> Result<&OverlayAsset, CatalogError> {
        let index = self
            .catalog
            .assets()
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| CatalogError::UnknownAsset(id.to_string()))?;
        if index != self.selected {
            log::info!("Overlay style: {} -> {}", self.selected().id, id);
        }
        self.selected = index;
        Ok(self.selected())
    }

    /// Draw for this frame, or `None` when there is no usable face.
    pub fn present(
        &self,
        record: Option<&LandmarkRecord>,
        viewport: Viewport,
    ) -> Option<OverlayDraw> {
        let record = record?;
        let asset = self.selected();
        match PlacementTransform::compute(record, asset, viewport) {
            Ok(placement) => Some(OverlayDraw {
                asset_id: asset.id.clone(),
                color: asset.color.clone(),
                base_width: asset.base_width,
                placement,
                pointer_passthrough: true,
            }),
            Err(e) => {
                log::warn!("Skipping overlay: {e}");
                None
            }
        }
    }

    /// Computes this frame's draw and hands it to `renderer`.
    pub fn present_to(
        &self,
        record: Option<&LandmarkRecord>,
        viewport: Viewport,
        renderer: &mut dyn OverlayRenderer,
    ) -> Option<OverlayDraw> {
        let draw = self.present(record, viewport);
        renderer.render(draw.as_ref());
        draw
    }
}

impl Default for OverlayPresenter {
    fn default() -> Self {
        Self::new(OverlayCatalog::builtin())
    }
}
