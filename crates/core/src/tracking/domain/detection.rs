use serde::{Deserialize, Serialize};

use crate::shared::point::Point2;

/// Which space a detector reports its points in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum CoordinateSpace {
    /// Already in [0,1] image coordinates.
    Normalized,
    /// Pixel coordinates of a `width` x `height` image.
    Pixels { width: u32, height: u32 },
}

/// One face's worth of labeled points, in the detector's own index order.
#[derive(Clone, Debug, PartialEq)]
pub struct RawLandmarks {
    points: Vec<Point2>,
    space: CoordinateSpace,
}

impl RawLandmarks {
    pub fn new(points: Vec<Point2>, space: CoordinateSpace) -> Self {
        Self { points, space }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Point `index` in [0,1] space, clamped. `None` when out of range or
    /// not finite.
    pub fn normalized_point(&self, index: usize) -> Option<Point2> {
        let p = *self.points.get(index)?;
        let normalized = match self.space {
            CoordinateSpace::Normalized => p,
            CoordinateSpace::Pixels { width, height } => {
                if width == 0 || height == 0 {
                    return None;
                }
                Point2::new(p.x / width as f64, p.y / height as f64)
            }
        };
        // checked before clamping, which would turn infinities into edges
        if !normalized.is_finite() {
            return None;
        }
        Some(normalized.clamp_unit())
    }
}

/// Result of running a detector on one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    NoFace,
    Face(RawLandmarks),
}

impl Detection {
    pub fn is_face(&self) -> bool {
        matches!(self, Detection::Face(_))
    }
}
