use crate::shared::constants::{DEFAULT_ANGLE_SMOOTHING, DEFAULT_POSITION_SMOOTHING};
use crate::shared::point::blend;

use super::landmark_record::LandmarkRecord;

/// Per-field blend factors: 1.0 follows the detector, smaller lags more.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothingFactors {
    /// Points, face width and scale.
    pub position: f64,
    /// Face angle. Lower than `position` to damp rotational jitter.
    pub angle: f64,
}

impl Default for SmoothingFactors {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION_SMOOTHING,
            angle: DEFAULT_ANGLE_SMOOTHING,
        }
    }
}

/// Domain interface for temporal smoothing of landmark records.
pub trait LandmarkSmootherInterface: Send {
    fn smooth(&mut self, record: LandmarkRecord) -> LandmarkRecord;
    fn reset(&mut self);
    fn previous(&self) -> Option<&LandmarkRecord>;
}

/// Exponential smoother holding the single previous smoothed record.
///
/// Formula: `smoothed = previous + (current - previous) * factor`.
/// The first record passes through unchanged.
pub struct LandmarkSmoother {
    factors: SmoothingFactors,
    previous: Option<LandmarkRecord>,
}

impl LandmarkSmoother {
    pub fn new(factors: SmoothingFactors) -> Self {
        Self {
            factors,
            previous: None,
        }
    }

    pub fn factors(&self) -> SmoothingFactors {
        self.factors
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        Self::new(SmoothingFactors::default())
    }
}

impl LandmarkSmootherInterface for LandmarkSmoother {
    fn smooth(&mut self, record: LandmarkRecord) -> LandmarkRecord {
        let smoothed = match self.previous {
            None => record,
            Some(prev) => {
                let k = self.factors.position;
                LandmarkRecord {
                    left_eye: prev.left_eye.blend(record.left_eye, k),
                    right_eye: prev.right_eye.blend(record.right_eye, k),
                    nose_bridge: prev.nose_bridge.blend(record.nose_bridge, k),
                    left_temple: prev.left_temple.blend(record.left_temple, k),
                    right_temple: prev.right_temple.blend(record.right_temple, k),
                    face_width: blend(prev.face_width, record.face_width, k),
                    face_angle: blend(prev.face_angle, record.face_angle, self.factors.angle),
                    scale: blend(prev.scale, record.scale, k),
                }
            }
        };

        self.previous = Some(smoothed);
        smoothed
    }

    fn reset(&mut self) {
        self.previous = None;
    }

    fn previous(&self) -> Option<&LandmarkRecord> {
        self.previous.as_ref()
    }
}
