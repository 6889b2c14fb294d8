use serde::{Deserialize, Serialize};

/// A 2D point. Normalized image coordinates unless stated otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point2) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Exponential blend toward `current`: `self + (current - self) * factor`.
    pub fn blend(self, current: Point2, factor: f64) -> Point2 {
        Point2::new(
            blend(self.x, current.x, factor),
            blend(self.y, current.y, factor),
        )
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn clamp_unit(self) -> Point2 {
        Point2::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }

    /// Arithmetic mean of `points`, or `None` for an empty slice.
    pub fn centroid(points: &[Point2]) -> Option<Point2> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point2::new(sx / n, sy / n))
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// `previous + (current - previous) * factor`
pub fn blend(previous: f64, current: f64, factor: f64) -> f64 {
    previous + (current - previous) * factor
}
