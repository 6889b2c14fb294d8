//! Per-backend mapping from detector point indices to the face anchors the
//! tracker needs. One tracker serves every backend; only the map differs.

use super::detection::RawLandmarks;
use crate::shared::point::Point2;

/// Face anchors extracted from one detection, in normalized coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceAnchors {
    pub left_eye: Point2,
    pub right_eye: Point2,
    pub nose_bridge: Point2,
    pub left_temple: Point2,
    pub right_temple: Point2,
}

#[derive(Debug, PartialEq, Eq)]
pub struct LandmarkIndexMap {
    pub name: &'static str,
    /// Eye landmark cluster; the eye center is its centroid.
    pub left_eye: &'static [usize],
    pub right_eye: &'static [usize],
    pub nose_bridge: usize,
    pub left_temple: usize,
    pub right_temple: usize,
    /// Detections with fewer points are rejected as partial.
    pub min_points: usize,
}

/// Dense face mesh (468 points, 478 with refined irises).
///
/// Eyes use the outer/inner corners: 33/133 on the image-left eye,
/// 263/362 on the image-right eye. 6 sits on the nose bridge between the
/// eyes; 127/356 are on the face outline at ear level.
pub static FACE_MESH: LandmarkIndexMap = LandmarkIndexMap {
    name: "face_mesh",
    left_eye: &[33, 133],
    right_eye: &[263, 362],
    nose_bridge: 6,
    left_temple: 127,
    right_temple: 356,
    min_points: 468,
};

/// iBUG 68-point layout used by cascade/regression-tree shape predictors.
///
/// 36-41 and 42-47 ring the eyes, 27 is the top of the nose bridge, and
/// the jaw line starts at 0 and ends at 16 next to the ears.
pub static IBUG_68: LandmarkIndexMap = LandmarkIndexMap {
    name: "ibug_68",
    left_eye: &[36, 37, 38, 39, 40, 41],
    right_eye: &[42, 43, 44, 45, 46, 47],
    nose_bridge: 27,
    left_temple: 0,
    right_temple: 16,
    min_points: 68,
};

static ALL: [&LandmarkIndexMap; 2] = [&FACE_MESH, &IBUG_68];

impl LandmarkIndexMap {
    pub fn by_name(name: &str) -> Option<&'static LandmarkIndexMap> {
        ALL.iter().copied().find(|m| m.name == name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        ALL.iter().map(|m| m.name)
    }

    /// `None` when the detection is too sparse for this layout or an anchor
    /// point is not finite.
    pub fn extract(&self, raw: &RawLandmarks) -> Option<FaceAnchors> {
        if raw.len() < self.min_points {
            return None;
        }
        Some(FaceAnchors {
            left_eye: cluster_center(raw, self.left_eye)?,
            right_eye: cluster_center(raw, self.right_eye)?,
            nose_bridge: raw.normalized_point(self.nose_bridge)?,
            left_temple: raw.normalized_point(self.left_temple)?,
            right_temple: raw.normalized_point(self.right_temple)?,
        })
    }
}

fn cluster_center(raw: &RawLandmarks, indices: &[usize]) -> Option<Point2> {
    let points = indices
        .iter()
        .map(|&i| raw.normalized_point(i))
        .collect::<Option<Vec<_>>>()?;
    Point2::centroid(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::domain::detection::CoordinateSpace;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn mesh_with(overrides: &[(usize, (f64, f64))]) -> RawLandmarks {
        let mut points = vec![Point2::new(0.5, 0.5); 478];
        for &(i, (x, y)) in overrides {
            points[i] = Point2::new(x, y);
        }
        RawLandmarks::new(points, CoordinateSpace::Normalized)
    }

    #[test]
    fn test_face_mesh_eye_is_corner_midpoint() {
        let raw = mesh_with(&[
            (33, (0.30, 0.40)),
            (133, (0.40, 0.42)),
            (263, (0.70, 0.40)),
            (362, (0.60, 0.42)),
        ]);
        let anchors = FACE_MESH.extract(&raw).unwrap();
        assert_relative_eq!(anchors.left_eye.x, 0.35);
        assert_relative_eq!(anchors.left_eye.y, 0.41);
        assert_relative_eq!(anchors.right_eye.x, 0.65);
        assert_relative_eq!(anchors.right_eye.y, 0.41);
    }

    #[test]
    fn test_face_mesh_single_point_anchors() {
        let raw = mesh_with(&[
            (6, (0.5, 0.38)),
            (127, (0.25, 0.45)),
            (356, (0.75, 0.45)),
        ]);
        let anchors = FACE_MESH.extract(&raw).unwrap();
        assert_eq!(anchors.nose_bridge, Point2::new(0.5, 0.38));
        assert_eq!(anchors.left_temple, Point2::new(0.25, 0.45));
        assert_eq!(anchors.right_temple, Point2::new(0.75, 0.45));
    }

    #[test]
    fn test_ibug_eye_is_ring_centroid() {
        let mut points = vec![Point2::new(0.0, 0.0); 68];
        for (k, i) in (36..42).enumerate() {
            points[i] = Point2::new(0.30 + 0.02 * k as f64, 0.40);
        }
        let raw = RawLandmarks::new(points, CoordinateSpace::Normalized);
        let anchors = IBUG_68.extract(&raw).unwrap();
        // mean of 0.30, 0.32, ..., 0.40
        assert_relative_eq!(anchors.left_eye.x, 0.35, epsilon = 1e-12);
        assert_relative_eq!(anchors.left_eye.y, 0.40);
    }

    #[test]
    fn test_ibug_pixel_space() {
        let mut points = vec![Point2::new(0.0, 0.0); 68];
        points[0] = Point2::new(160.0, 360.0);
        points[16] = Point2::new(1120.0, 360.0);
        let raw = RawLandmarks::new(
            points,
            CoordinateSpace::Pixels {
                width: 1280,
                height: 720,
            },
        );
        let anchors = IBUG_68.extract(&raw).unwrap();
        assert_relative_eq!(anchors.left_temple.x, 0.125);
        assert_relative_eq!(anchors.right_temple.x, 0.875);
        assert_relative_eq!(anchors.right_temple.y, 0.5);
    }

    #[rstest]
    #[case::mesh(&FACE_MESH, 467)]
    #[case::ibug(&IBUG_68, 67)]
    #[case::empty(&IBUG_68, 0)]
    fn test_too_few_points_is_none(#[case] map: &LandmarkIndexMap, #[case] n: usize) {
        let raw = RawLandmarks::new(vec![Point2::new(0.5, 0.5); n], CoordinateSpace::Normalized);
        assert!(map.extract(&raw).is_none());
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(LandmarkIndexMap::by_name("face_mesh"), Some(&FACE_MESH));
        assert_eq!(LandmarkIndexMap::by_name("ibug_68"), Some(&IBUG_68));
        assert!(LandmarkIndexMap::by_name("haar").is_none());
        assert_eq!(LandmarkIndexMap::names().count(), 2);
    }

    #[test]
    fn test_indices_fit_within_min_points() {
        for map in [&FACE_MESH, &IBUG_68] {
            let max = map
                .left_eye
                .iter()
                .chain(map.right_eye)
                .chain([&map.nose_bridge, &map.left_temple, &map.right_temple])
                .max()
                .copied()
                .unwrap();
            assert!(max < map.min_points, "{} index {max} out of range", map.name);
        }
    }
}
