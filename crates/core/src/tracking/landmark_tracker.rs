use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::detection::{Detection, RawLandmarks};
use super::domain::landmark_index_map::LandmarkIndexMap;
use super::domain::landmark_record::{LandmarkRecord, RecordError};
use super::domain::landmark_smoother::{
    LandmarkSmoother, LandmarkSmootherInterface, SmoothingFactors,
};
use crate::shared::constants::DEFAULT_MIN_FACE_WIDTH;

/// What happens to the smoothing state when a frame has no face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossPolicy {
    /// Keep the last smoothed record, so tracking resumes warm.
    #[default]
    Retain,
    /// Forget it; the next detection is treated as a first sample.
    Reset,
}

impl fmt::Display for LossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossPolicy::Retain => write!(f, "retain"),
            LossPolicy::Reset => write!(f, "reset"),
        }
    }
}

impl FromStr for LossPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retain" => Ok(LossPolicy::Retain),
            "reset" => Ok(LossPolicy::Reset),
            other => Err(format!(
                "loss policy must be 'retain' or 'reset', got '{other}'"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    pub smoothing: SmoothingFactors,
    pub min_face_width: f64,
    pub loss_policy: LossPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingFactors::default(),
            min_face_width: DEFAULT_MIN_FACE_WIDTH,
            loss_policy: LossPolicy::Retain,
        }
    }
}

/// Output of one processed frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackerUpdate {
    pub landmarks: Option<LandmarkRecord>,
    pub face_detected: bool,
}

impl TrackerUpdate {
    fn no_face() -> Self {
        Self {
            landmarks: None,
            face_detected: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub frames: usize,
    pub faces: usize,
    pub rejected: usize,
}

/// Receives every update synchronously, from inside [`LandmarkTracker::process`].
pub type LandmarkConsumer = Box<dyn FnMut(Option<&LandmarkRecord>, bool) + Send>;

/// Turns raw detections into stable landmark records.
///
/// Owns the only mutable state of the pipeline: the previous smoothed
/// record. Each instance is independent, so concurrent sessions never
/// share smoothing state.
pub struct LandmarkTracker {
    index_map: &'static LandmarkIndexMap,
    smoother: Box<dyn LandmarkSmootherInterface>,
    config: TrackerConfig,
    consumer: Option<LandmarkConsumer>,
    stats: TrackerStats,
}

impl LandmarkTracker {
    pub fn new(index_map: &'static LandmarkIndexMap, config: TrackerConfig) -> Self {
        let smoother = LandmarkSmoother::new(config.smoothing);
        Self::with_smoother(index_map, config, Box::new(smoother))
    }

    pub fn with_smoother(
        index_map: &'static LandmarkIndexMap,
        config: TrackerConfig,
        smoother: Box<dyn LandmarkSmootherInterface>,
    ) -> Self {
        Self {
            index_map,
            smoother,
            config,
            consumer: None,
            stats: TrackerStats::default(),
        }
    }

    /// Registers the single consumer, replacing any previous one.
    pub fn on_update(&mut self, consumer: LandmarkConsumer) {
        self.consumer = Some(consumer);
    }

    pub fn process(&mut self, detection: &Detection) -> TrackerUpdate {
        self.stats.frames += 1;

        let update = match detection {
            Detection::NoFace => {
                if self.config.loss_policy == LossPolicy::Reset {
                    self.smoother.reset();
                }
                TrackerUpdate::no_face()
            }
            Detection::Face(raw) => match self.measure(raw) {
                Ok(record) => {
                    self.stats.faces += 1;
                    TrackerUpdate {
                        landmarks: Some(self.smoother.smooth(record)),
                        face_detected: true,
                    }
                }
                Err(reason) => {
                    // Rejected frames leave the smoother alone under either policy.
                    self.stats.rejected += 1;
                    log::debug!("Rejected frame {}: {reason}", self.stats.frames);
                    TrackerUpdate::no_face()
                }
            },
        };

        if let Some(consumer) = self.consumer.as_mut() {
            consumer(update.landmarks.as_ref(), update.face_detected);
        }
        update
    }

    fn measure(&self, raw: &RawLandmarks) -> Result<LandmarkRecord, RejectReason> {
        let anchors = self
            .index_map
            .extract(raw)
            .ok_or(RejectReason::MissingAnchors {
                got: raw.len(),
                layout: self.index_map.name,
            })?;
        let record = LandmarkRecord::from_anchors(anchors);
        record
            .validate(self.config.min_face_width)
            .map_err(RejectReason::Invalid)?;
        Ok(record)
    }

    /// Clears the smoothing state; the next detection is a first sample.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }

    pub fn previous(&self) -> Option<&LandmarkRecord> {
        self.smoother.previous()
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    pub fn index_map(&self) -> &'static LandmarkIndexMap {
        self.index_map
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

enum RejectReason {
    /// Too few points, or an anchor point that is not finite.
    MissingAnchors { got: usize, layout: &'static str },
    Invalid(RecordError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingAnchors { got, layout } => {
                write!(f, "no usable {layout} anchors in {got} points")
            }
            RejectReason::Invalid(e) => write!(f, "{e}"),
        }
    }
}
