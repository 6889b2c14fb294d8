use serde::Serialize;

use super::placement_transform::PlacementTransform;

/// Everything a renderer needs to draw one frame's overlay.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayDraw {
    pub asset_id: String,
    pub color: String,
    pub base_width: f64,
    pub placement: PlacementTransform,
    /// The overlay never intercepts input meant for the UI beneath it.
    pub pointer_passthrough: bool,
}

/// Domain interface for drawing the overlay.
///
/// `None` means nothing is drawn this frame. A draw for a different
/// `asset_id` than the previous one replaces it outright.
pub trait OverlayRenderer {
    fn render(&mut self, draw: Option<&OverlayDraw>);
}
