use serde::{Deserialize, Serialize};

/// A selectable eyewear style. Geometry is in asset-space units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayAsset {
    pub id: String,
    pub name: String,
    pub description: String,
    /// CSS color of the frame, e.g. `#1c1c1c`.
    pub color: String,
    pub frame_width: f64,
    pub frame_height: f64,
    pub bridge_width: f64,
    pub temple_length: f64,
    /// Width in pixels the artwork is drawn at when the placement scale is 1.
    pub base_width: f64,
}

impl OverlayAsset {
    /// Builds an asset whose artwork is drawn at twice its frame width.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        color: &str,
        frame_width: f64,
        frame_height: f64,
        bridge_width: f64,
        temple_length: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            color: color.to_string(),
            frame_width,
            frame_height,
            bridge_width,
            temple_length,
            base_width: frame_width * 2.0,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.frame_height > 0.0 {
            self.frame_width / self.frame_height
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_base_width_is_twice_frame_width() {
        let asset = OverlayAsset::new("a", "A", "", "#000", 145.0, 55.0, 20.0, 145.0);
        assert_relative_eq!(asset.base_width, 290.0);
    }

    #[test]
    fn test_aspect_ratio() {
        let asset = OverlayAsset::new("a", "A", "", "#000", 140.0, 48.0, 18.0, 140.0);
        assert_relative_eq!(asset.aspect_ratio(), 140.0 / 48.0);
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        let asset = OverlayAsset::new("a", "A", "", "#000", 140.0, 0.0, 18.0, 140.0);
        assert_relative_eq!(asset.aspect_ratio(), 0.0);
    }
}
