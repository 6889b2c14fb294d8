use serde::Serialize;
use thiserror::Error;

use super::overlay_asset::OverlayAsset;
use crate::shared::constants::{
    FRAME_TO_EYE_DISTANCE_RATIO, MAX_OVERLAY_SCALE, MIN_OVERLAY_SCALE, NOSE_BRIDGE_LIFT_RATIO,
};
use crate::shared::point::Point2;
use crate::shared::viewport::Viewport;
use crate::tracking::domain::landmark_record::LandmarkRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("landmark record has non-finite fields")]
    InvalidLandmarks,
    #[error("viewport {width}x{height} is empty")]
    EmptyViewport { width: u32, height: u32 },
    #[error("asset '{0}' has a non-positive base width")]
    InvalidAsset(String),
}

/// Where and how to draw an overlay for one frame, in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlacementTransform {
    /// Anchor: midpoint of the eyes, lifted onto the nose bridge.
    pub x: f64,
    pub y: f64,
    /// Clockwise rotation about the artwork's center, in degrees.
    pub rotation_degrees: f64,
    /// Clamped to [`MIN_OVERLAY_SCALE`, `MAX_OVERLAY_SCALE`].
    pub scale: f64,
    pub eye_distance_px: f64,
}

impl PlacementTransform {
    /// Places `asset` on the face described by `record`.
    ///
    /// The view is mirrored like a front camera preview: x is flipped, and
    /// so is the sign of the roll angle.
    pub fn compute(
        record: &LandmarkRecord,
        asset: &OverlayAsset,
        viewport: Viewport,
    ) -> Result<Self, PlacementError> {
        if !record.is_finite() {
            return Err(PlacementError::InvalidLandmarks);
        }
        if viewport.is_empty() {
            return Err(PlacementError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if !(asset.base_width > 0.0) {
            return Err(PlacementError::InvalidAsset(asset.id.clone()));
        }

        let left = to_mirrored_pixels(record.left_eye, viewport);
        let right = to_mirrored_pixels(record.right_eye, viewport);
        let eye_distance_px = left.distance(right);
        let center = left.midpoint(right);

        let target_width = eye_distance_px * FRAME_TO_EYE_DISTANCE_RATIO;

        Ok(Self {
            x: center.x,
            y: center.y - eye_distance_px * NOSE_BRIDGE_LIFT_RATIO,
            rotation_degrees: -record.face_angle.to_degrees(),
            scale: clamp_scale(target_width / asset.base_width),
            eye_distance_px,
        })
    }

    /// Rendered artwork width in pixels.
    pub fn rendered_width(&self, asset: &OverlayAsset) -> f64 {
        asset.base_width * self.scale
    }
}

/// Normalized point to viewport pixels, flipping x.
pub fn to_mirrored_pixels(p: Point2, viewport: Viewport) -> Point2 {
    Point2::new(
        (1.0 - p.x) * viewport.width as f64,
        p.y * viewport.height as f64,
    )
}

pub fn clamp_scale(raw: f64) -> f64 {
    raw.clamp(MIN_OVERLAY_SCALE, MAX_OVERLAY_SCALE)
}
