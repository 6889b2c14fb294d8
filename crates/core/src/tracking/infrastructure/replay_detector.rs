use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;
use crate::shared::point::Point2;
use crate::tracking::domain::detection::{CoordinateSpace, Detection, RawLandmarks};
use crate::tracking::domain::landmark_detector::{DetectorError, LandmarkDetector};
use crate::tracking::domain::landmark_index_map::{LandmarkIndexMap, FACE_MESH};

/// Recorded detector output, one entry per frame (`null` = no face).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkTrace {
    pub backend: String,
    pub coordinate_space: CoordinateSpace,
    pub frames: Vec<Option<Vec<[f64; 2]>>>,
}

impl LandmarkTrace {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("failed to read trace {}: {e}", path.display()))?;
        let trace = serde_json::from_str(&json)
            .map_err(|e| format!("failed to parse trace {}: {e}", path.display()))?;
        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Detection recorded for `index`; past the end there is no face.
    pub fn detection(&self, index: usize) -> Detection {
        match self.frames.get(index) {
            Some(Some(points)) => Detection::Face(RawLandmarks::new(
                points.iter().copied().map(Point2::from).collect(),
                self.coordinate_space,
            )),
            _ => Detection::NoFace,
        }
    }
}

/// Replays a [`LandmarkTrace`] keyed by frame index.
///
/// Stands in for a live model when driving the pipeline from recordings,
/// so runs are reproducible frame for frame.
pub struct ReplayDetector {
    trace: LandmarkTrace,
    index_map: &'static LandmarkIndexMap,
    ready: bool,
    closed: bool,
}

impl ReplayDetector {
    pub fn new(trace: LandmarkTrace) -> Self {
        let index_map = LandmarkIndexMap::by_name(&trace.backend).unwrap_or(&FACE_MESH);
        Self {
            trace,
            index_map,
            ready: false,
            closed: false,
        }
    }
}

impl LandmarkDetector for ReplayDetector {
    fn initialize(&mut self) -> Result<(), DetectorError> {
        if LandmarkIndexMap::by_name(&self.trace.backend).is_none() {
            let known: Vec<_> = LandmarkIndexMap::names().collect();
            return Err(DetectorError::ModelLoad(format!(
                "unknown landmark backend '{}' (expected one of: {})",
                self.trace.backend,
                known.join(", ")
            )));
        }
        self.ready = true;
        log::info!(
            "Replay detector ready: {} frames of {}",
            self.trace.len(),
            self.index_map.name
        );
        Ok(())
    }

    fn detect(&mut self, frame: &Frame) -> Result<Detection, DetectorError> {
        if self.closed {
            return Err(DetectorError::Closed);
        }
        if !self.ready {
            return Err(DetectorError::Inference("detector not initialized".into()));
        }
        Ok(self.trace.detection(frame.index()))
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn index_map(&self) -> &'static LandmarkIndexMap {
        self.index_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::domain::landmark_index_map::IBUG_68;

    fn frame(index: usize) -> Frame {
        Frame::blank(4, 4, index)
    }

    fn trace(backend: &str) -> LandmarkTrace {
        LandmarkTrace {
            backend: backend.into(),
            coordinate_space: CoordinateSpace::Normalized,
            frames: vec![Some(vec![[0.1, 0.2], [0.3, 0.4]]), None],
        }
    }

    #[test]
    fn test_replays_recorded_face() {
        let mut detector = ReplayDetector::new(trace("face_mesh"));
        detector.initialize().unwrap();

        let Detection::Face(raw) = detector.detect(&frame(0)).unwrap() else {
            panic!("expected a face");
        };
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.normalized_point(1), Some(Point2::new(0.3, 0.4)));
    }

    #[test]
    fn test_recorded_gap_is_no_face() {
        let mut detector = ReplayDetector::new(trace("face_mesh"));
        detector.initialize().unwrap();
        assert_eq!(detector.detect(&frame(1)).unwrap(), Detection::NoFace);
    }

    #[test]
    fn test_past_end_is_no_face() {
        let mut detector = ReplayDetector::new(trace("face_mesh"));
        detector.initialize().unwrap();
        assert_eq!(detector.detect(&frame(99)).unwrap(), Detection::NoFace);
    }

    #[test]
    fn test_unknown_backend_fails_to_initialize() {
        let mut detector = ReplayDetector::new(trace("haar"));
        assert!(matches!(
            detector.initialize(),
            Err(DetectorError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_backend_selects_index_map() {
        assert_eq!(ReplayDetector::new(trace("ibug_68")).index_map(), &IBUG_68);
    }

    #[test]
    fn test_detect_before_initialize_fails() {
        let mut detector = ReplayDetector::new(trace("face_mesh"));
        assert!(matches!(
            detector.detect(&frame(0)),
            Err(DetectorError::Inference(_))
        ));
    }

    #[test]
    fn test_detect_after_close_fails() {
        let mut detector = ReplayDetector::new(trace("face_mesh"));
        detector.initialize().unwrap();
        detector.close();
        assert_eq!(detector.detect(&frame(0)), Err(DetectorError::Closed));
    }

    #[test]
    fn test_trace_json_format() {
        let json = r#"{
            "backend": "ibug_68",
            "coordinate_space": {"kind": "pixels", "width": 640, "height": 480},
            "frames": [null, [[320.0, 240.0]]]
        }"#;
        let trace: LandmarkTrace = serde_json::from_str(json).unwrap();
        assert_eq!(
            trace.coordinate_space,
            CoordinateSpace::Pixels {
                width: 640,
                height: 480
            }
        );
        assert_eq!(trace.detection(0), Detection::NoFace);
        let Detection::Face(raw) = trace.detection(1) else {
            panic!("expected a face");
        };
        assert_eq!(raw.normalized_point(0), Some(Point2::new(0.5, 0.5)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        fs::write(&path, serde_json::to_string(&trace("face_mesh")).unwrap()).unwrap();
        assert_eq!(LandmarkTrace::load(&path).unwrap(), trace("face_mesh"));
    }
}
