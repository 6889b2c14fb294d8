use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;

use crate::overlay::domain::overlay_renderer::{OverlayDraw, OverlayRenderer};
use crate::shared::frame::Frame;

/// Composites per-asset RGBA sprites onto RGB frames.
///
/// A sprite is drawn `base_width * scale` pixels wide, centered on the
/// anchor and rotated about its own center. Uses inverse mapping with
/// nearest-neighbour sampling and straight alpha blending.
#[derive(Default)]
pub struct RasterOverlayRenderer {
    sprites: HashMap<String, RgbaImage>,
    canvas: Option<Frame>,
}

impl RasterOverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sprite(mut self, asset_id: &str, sprite: RgbaImage) -> Self {
        self.sprites.insert(asset_id.to_string(), sprite);
        self
    }

    pub fn load_sprite(
        &mut self,
        asset_id: &str,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let sprite = image::open(path)
            .map_err(|e| format!("failed to load sprite {}: {e}", path.display()))?
            .to_rgba8();
        self.sprites.insert(asset_id.to_string(), sprite);
        Ok(())
    }

    pub fn has_sprite(&self, asset_id: &str) -> bool {
        self.sprites.contains_key(asset_id)
    }

    /// Sets the frame the next [`OverlayRenderer::render`] call draws on.
    pub fn set_canvas(&mut self, frame: Frame) {
        self.canvas = Some(frame);
    }

    pub fn take_canvas(&mut self) -> Option<Frame> {
        self.canvas.take()
    }

    /// Draws `draw` onto `frame`. Returns false when the asset has no sprite.
    pub fn composite(&self, frame: &mut Frame, draw: &OverlayDraw) -> bool {
        let Some(sprite) = self.sprites.get(&draw.asset_id) else {
            log::debug!("No sprite for asset '{}'", draw.asset_id);
            return false;
        };
        let (sw, sh) = sprite.dimensions();
        if sw == 0 || sh == 0 {
            return false;
        }

        let p = &draw.placement;
        let k = draw.base_width * p.scale / sw as f64;
        if !(k > 0.0) {
            return false;
        }
        let (sin, cos) = p.rotation_degrees.to_radians().sin_cos();
        let (half_w, half_h) = (sw as f64 / 2.0, sh as f64 / 2.0);

        let radius = k * half_w.hypot(half_h);
        let fw = frame.width() as f64;
        let fh = frame.height() as f64;
        let x0 = (p.x - radius).floor().clamp(0.0, fw) as usize;
        let x1 = (p.x + radius).ceil().clamp(0.0, fw) as usize;
        let y0 = (p.y - radius).floor().clamp(0.0, fh) as usize;
        let y1 = (p.y + radius).ceil().clamp(0.0, fh) as usize;

        let mut pixels = frame.as_ndarray_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - p.x;
                let dy = y as f64 + 0.5 - p.y;
                // undo the clockwise rotation, then the scale
                let u = (cos * dx + sin * dy) / k + half_w;
                let v = (-sin * dx + cos * dy) / k + half_h;
                if u < 0.0 || v < 0.0 || u >= sw as f64 || v >= sh as f64 {
                    continue;
                }
                let src = sprite.get_pixel(u as u32, v as u32).0;
                let alpha = src[3] as f64 / 255.0;
                if alpha == 0.0 {
                    continue;
                }
                for c in 0..3 {
                    let dst = pixels[[y, x, c]] as f64;
                    let out = src[c] as f64 * alpha + dst * (1.0 - alpha);
                    pixels[[y, x, c]] = out.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        true
    }
}

impl OverlayRenderer for RasterOverlayRenderer {
    fn render(&mut self, draw: Option<&OverlayDraw>) {
        let Some(draw) = draw else {
            return;
        };
        if let Some(mut canvas) = self.canvas.take() {
            self.composite(&mut canvas, draw);
            self.canvas = Some(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::domain::placement_transform::PlacementTransform;
    use image::Rgba;

    fn draw(x: f64, y: f64, rotation_degrees: f64, scale: f64) -> OverlayDraw {
        OverlayDraw {
            asset_id: "bar".into(),
            color: "#000000".into(),
            base_width: 20.0,
            placement: PlacementTransform {
                x,
                y,
                rotation_degrees,
                scale,
                eye_distance_px: 0.0,
            },
            pointer_passthrough: true,
        }
    }

    /// 20x4 opaque red bar.
    fn bar() -> RgbaImage {
        RgbaImage::from_pixel(20, 4, Rgba([255, 0, 0, 255]))
    }

    fn red(frame: &Frame, x: usize, y: usize) -> u8 {
        frame.as_ndarray()[[y, x, 0]]
    }

    #[test]
    fn test_unrotated_sprite_covers_expected_box() {
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", bar());
        let mut frame = Frame::blank(50, 50, 0);
        assert!(renderer.composite(&mut frame, &draw(25.0, 25.0, 0.0, 1.0)));

        // x in [15, 35), y in [23, 27)
        assert_eq!(red(&frame, 15, 23), 255);
        assert_eq!(red(&frame, 34, 26), 255);
        assert_eq!(red(&frame, 14, 25), 0);
        assert_eq!(red(&frame, 35, 25), 0);
        assert_eq!(red(&frame, 25, 22), 0);
        assert_eq!(red(&frame, 25, 27), 0);
    }

    #[test]
    fn test_scale_doubles_extent() {
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", bar());
        let mut frame = Frame::blank(60, 60, 0);
        renderer.composite(&mut frame, &draw(30.0, 30.0, 0.0, 2.0));
        // 40 px wide: x in [10, 50)
        assert_eq!(red(&frame, 10, 30), 255);
        assert_eq!(red(&frame, 49, 30), 255);
        assert_eq!(red(&frame, 9, 30), 0);
        assert_eq!(red(&frame, 50, 30), 0);
    }

    #[test]
    fn test_quarter_turn_makes_bar_vertical() {
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", bar());
        let mut frame = Frame::blank(50, 50, 0);
        renderer.composite(&mut frame, &draw(25.0, 25.0, 90.0, 1.0));
        assert_eq!(red(&frame, 25, 16), 255);
        assert_eq!(red(&frame, 25, 33), 255);
        assert_eq!(red(&frame, 16, 25), 0);
        assert_eq!(red(&frame, 33, 25), 0);
    }

    #[test]
    fn test_alpha_blends_with_background() {
        let sprite = RgbaImage::from_pixel(20, 4, Rgba([200, 0, 0, 128]));
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", sprite);
        let mut frame = Frame::blank(50, 50, 0);
        renderer.composite(&mut frame, &draw(25.0, 25.0, 0.0, 1.0));
        // 200 * 128/255 ~= 100.4
        assert_eq!(red(&frame, 25, 25), 100);
    }

    #[test]
    fn test_transparent_pixels_leave_frame_untouched() {
        let sprite = RgbaImage::from_pixel(20, 4, Rgba([255, 255, 255, 0]));
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", sprite);
        let mut frame = Frame::blank(50, 50, 0);
        renderer.composite(&mut frame, &draw(25.0, 25.0, 0.0, 1.0));
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sprite_partially_off_frame_is_clipped() {
        let renderer = RasterOverlayRenderer::new().with_sprite("bar", bar());
        let mut frame = Frame::blank(10, 10, 0);
        assert!(renderer.composite(&mut frame, &draw(0.0, 5.0, 0.0, 1.0)));
        assert_eq!(red(&frame, 0, 5), 255);
        assert_eq!(red(&frame, 9, 5), 255);
    }

    #[test]
    fn test_missing_sprite_is_skipped() {
        let renderer = RasterOverlayRenderer::new();
        let mut frame = Frame::blank(10, 10, 0);
        assert!(!renderer.composite(&mut frame, &draw(5.0, 5.0, 0.0, 1.0)));
    }

    #[test]
    fn test_render_draws_on_canvas() {
        let mut renderer = RasterOverlayRenderer::new().with_sprite("bar", bar());
        renderer.set_canvas(Frame::blank(50, 50, 3));
        renderer.render(Some(&draw(25.0, 25.0, 0.0, 1.0)));
        renderer.render(None);

        let canvas = renderer.take_canvas().unwrap();
        assert_eq!(canvas.index(), 3);
        assert_eq!(red(&canvas, 25, 25), 255);
    }

    #[test]
    fn test_load_sprite_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.png");
        bar().save(&path).unwrap();

        let mut renderer = RasterOverlayRenderer::new();
        renderer.load_sprite("bar", &path).unwrap();
        assert!(renderer.has_sprite("bar"));
        assert!(renderer.load_sprite("x", &dir.path().join("absent.png")).is_err());
    }
}
