use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::landmark_index_map::FaceAnchors;
use crate::shared::constants::NEUTRAL_FACE_WIDTH;
use crate::shared::point::Point2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("landmark record has non-finite fields")]
    NonFinite,
    #[error("face width {width:.4} is below the minimum {min:.4}")]
    DegenerateFaceWidth { width: f64, min: f64 },
}

/// Geometric summary of one face detection, in normalized image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    pub left_eye: Point2,
    pub right_eye: Point2,
    pub nose_bridge: Point2,
    pub left_temple: Point2,
    pub right_temple: Point2,
    /// Temple-to-temple distance.
    pub face_width: f64,
    /// In-plane head roll in radians: angle of the left-to-right eye line.
    pub face_angle: f64,
    pub scale: f64,
}

impl LandmarkRecord {
    pub fn from_anchors(anchors: FaceAnchors) -> Self {
        let face_width = anchors.left_temple.distance(anchors.right_temple);
        let face_angle = (anchors.right_eye.y - anchors.left_eye.y)
            .atan2(anchors.right_eye.x - anchors.left_eye.x);
        Self {
            left_eye: anchors.left_eye,
            right_eye: anchors.right_eye,
            nose_bridge: anchors.nose_bridge,
            left_temple: anchors.left_temple,
            right_temple: anchors.right_temple,
            face_width,
            face_angle,
            scale: face_width / NEUTRAL_FACE_WIDTH,
        }
    }

    pub fn points(&self) -> [Point2; 5] {
        [
            self.left_eye,
            self.right_eye,
            self.nose_bridge,
            self.left_temple,
            self.right_temple,
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.points().iter().all(|p| p.is_finite())
            && self.face_width.is_finite()
            && self.face_angle.is_finite()
            && self.scale.is_finite()
    }

    pub fn validate(&self, min_face_width: f64) -> Result<(), RecordError> {
        if !self.is_finite() {
            return Err(RecordError::NonFinite);
        }
        if self.face_width < min_face_width {
            return Err(RecordError::DegenerateFaceWidth {
                width: self.face_width,
                min: min_face_width,
            });
        }
        Ok(())
    }
}
