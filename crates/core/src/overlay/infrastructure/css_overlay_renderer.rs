use std::fmt::Write;

use crate::overlay::domain::overlay_renderer::{OverlayDraw, OverlayRenderer};

/// One rendered overlay element: which asset, and its inline style.
#[derive(Clone, Debug, PartialEq)]
pub struct CssOverlay {
    pub asset_id: String,
    pub style: String,
}

/// Renders draws as absolutely positioned inline CSS for a web overlay layer.
///
/// Keeps the element currently on screen. When the asset changes, the old
/// element is retired and a new one introduced, never blended.
#[derive(Default)]
pub struct CssOverlayRenderer {
    current: Option<CssOverlay>,
    retired: Option<String>,
}

impl CssOverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CssOverlay> {
        self.current.as_ref()
    }

    /// Asset id of the element most recently replaced by a style switch.
    pub fn retired(&self) -> Option<&str> {
        self.retired.as_deref()
    }
}

impl OverlayRenderer for CssOverlayRenderer {
    fn render(&mut self, draw: Option<&OverlayDraw>) {
        let Some(draw) = draw else {
            self.current = None;
            return;
        };

        if let Some(prev) = self.current.take() {
            if prev.asset_id != draw.asset_id {
                self.retired = Some(prev.asset_id);
            }
        }

        self.current = Some(CssOverlay {
            asset_id: draw.asset_id.clone(),
            style: style_for(draw),
        });
    }
}

/// Inline style placing the artwork's center on the anchor.
///
/// The element's top-left corner sits on the anchor and `translate(-50%, -50%)`
/// pulls its center back onto it, so rotation and scale about
/// `center center` pivot on the anchor itself.
pub fn style_for(draw: &OverlayDraw) -> String {
    let p = &draw.placement;
    let mut style = String::new();
    let _ = write!(
        style,
        "position: absolute; left: {:.2}px; top: {:.2}px; width: {:.2}px; \
         transform: translate(-50%, -50%) rotate({:.3}deg) scale({:.4}); \
         transform-origin: center center;",
        p.x,
        p.y,
        draw.base_width,
        p.rotation_degrees,
        p.scale,
    );
    if draw.pointer_passthrough {
        style.push_str(" pointer-events: none;");
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::domain::placement_transform::PlacementTransform;

    fn draw(asset_id: &str) -> OverlayDraw {
        OverlayDraw {
            asset_id: asset_id.into(),
            color: "#1c1c1c".into(),
            base_width: 290.0,
            placement: PlacementTransform {
                x: 500.0,
                y: 392.0,
                rotation_degrees: -5.729_577_951,
                scale: 0.9655,
                eye_distance_px: 100.0,
            },
            pointer_passthrough: true,
        }
    }

    #[test]
    fn test_style_positions_and_transforms() {
        let style = style_for(&draw("aviator"));
        assert!(style.contains("left: 500.00px"));
        assert!(style.contains("top: 392.00px"));
        assert!(style.contains("width: 290.00px"));
        assert!(style.contains("rotate(-5.730deg)"));
        assert!(style.contains("scale(0.9655)"));
        assert!(style.contains("transform-origin: center center"));
        assert!(style.ends_with("pointer-events: none;"));
    }

    #[test]
    fn test_artwork_center_sits_on_anchor() {
        let style = style_for(&draw("aviator"));
        assert!(style.contains("transform: translate(-50%, -50%) rotate("));
        // no margin offsets that would shift the pivot off the anchor
        assert!(!style.contains("margin"));
        let translate = style.find("translate(").unwrap();
        assert!(translate < style.find("rotate(").unwrap());
        assert!(translate < style.find("scale(").unwrap());
    }

    #[test]
    fn test_none_clears_overlay() {
        let mut renderer = CssOverlayRenderer::new();
        renderer.render(Some(&draw("aviator")));
        assert!(renderer.current().is_some());
        renderer.render(None);
        assert!(renderer.current().is_none());
    }

    #[test]
    fn test_switch_retires_previous_element() {
        let mut renderer = CssOverlayRenderer::new();
        renderer.render(Some(&draw("aviator")));
        renderer.render(Some(&draw("aviator")));
        assert!(renderer.retired().is_none());

        renderer.render(Some(&draw("round")));
        assert_eq!(renderer.current().unwrap().asset_id, "round");
        assert_eq!(renderer.retired(), Some("aviator"));
    }
}
