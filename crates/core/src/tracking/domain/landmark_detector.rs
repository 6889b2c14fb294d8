use thiserror::Error;

use super::detection::Detection;
use super::landmark_index_map::LandmarkIndexMap;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("failed to load landmark model: {0}")]
    ModelLoad(String),
    #[error("landmark inference failed: {0}")]
    Inference(String),
    #[error("detector is closed")]
    Closed,
}

/// Domain interface for an external face-landmark detector.
///
/// Detectors are stateful (model handles, internal tracking), hence `&mut self`.
pub trait LandmarkDetector: Send {
    /// Loads the model. May be slow; may fail.
    fn initialize(&mut self) -> Result<(), DetectorError>;

    /// Detects zero or one face in `frame`.
    fn detect(&mut self, frame: &Frame) -> Result<Detection, DetectorError>;

    /// Releases the model. Further `detect` calls return `Closed`.
    fn close(&mut self);

    /// Point layout of this backend's detections.
    fn index_map(&self) -> &'static LandmarkIndexMap;
}
