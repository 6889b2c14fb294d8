use crossbeam_channel::Receiver;
use thiserror::Error;

use super::detection_loop::{DetectionLoop, FrameUpdate, LoopOutputs, LoopParts};
use super::domain::camera::{CameraConstraints, CameraError, CameraSource, MediaStream};
use super::domain::session_state::{SessionState, TrackingStatus};
use super::session_logger::{NullSessionLogger, SessionLogger};
use crate::shared::config::TryOnConfig;
use crate::shared::frame::Frame;
use crate::tracking::domain::landmark_detector::LandmarkDetector;
use crate::tracking::domain::landmark_index_map::FACE_MESH;
use crate::tracking::landmark_tracker::LandmarkTracker;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("camera not open; request permission first")]
    NoCamera,
    #[error("session already running")]
    AlreadyRunning,
}

/// Owns the camera stream, detector and detection loop for one try-on view.
///
/// Lifecycle: [`request_permission`](Self::request_permission), then
/// [`start`](Self::start), then [`stop`](Self::stop) (also run on drop).
/// Teardown halts the loop before closing the detector and stops the
/// stream last, so no frame is read or detected after release begins.
pub struct TryOnSession {
    camera: Box<dyn CameraSource>,
    constraints: CameraConstraints,
    config: TryOnConfig,
    state: SessionState,
    stream: Option<Box<dyn MediaStream>>,
    running: Option<DetectionLoop>,
    logger: Option<Box<dyn SessionLogger>>,
    frame_buffer: Option<usize>,
    updates_rx: Option<Receiver<FrameUpdate>>,
    frames_rx: Option<Receiver<Frame>>,
}

impl TryOnSession {
    pub fn new(camera: Box<dyn CameraSource>, config: TryOnConfig) -> Self {
        Self {
            camera,
            constraints: CameraConstraints::default(),
            config,
            state: SessionState::default(),
            stream: None,
            running: None,
            logger: None,
            frame_buffer: Some(1),
            updates_rx: None,
            frames_rx: None,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn SessionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Capacity of the display frame channel. `None` keeps every frame,
    /// for offline consumers that must see the whole sequence.
    pub fn with_frame_buffer(mut self, capacity: Option<usize>) -> Self {
        self.frame_buffer = capacity;
        self
    }

    pub fn with_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &TryOnConfig {
        &self.config
    }

    /// Opens the camera. Safe to call again after a refusal.
    pub fn request_permission(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() || self.running.is_some() {
            return Ok(());
        }
        match self.camera.open(&self.constraints) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state.has_permission = Some(true);
                self.state.error = None;
                log::info!("Camera opened");
                Ok(())
            }
            Err(e) => {
                log::warn!("Camera request failed: {e}");
                self.state.has_permission = Some(false);
                self.state.error = Some(e.user_message().to_string());
                self.state.is_loading = false;
                Err(e)
            }
        }
    }

    /// Initializes `detector` and starts the detection loop.
    ///
    /// A detector that fails to load (or none at all) does not fail the
    /// session: frames still flow, tracking is marked unavailable.
    pub fn start(
        &mut self,
        detector: Option<Box<dyn LandmarkDetector>>,
    ) -> Result<(), SessionError> {
        if self.running.is_some() {
            return Err(SessionError::AlreadyRunning);
        }
        let stream = self.stream.take().ok_or(SessionError::NoCamera)?;

        let detector = match detector {
            Some(mut detector) => match detector.initialize() {
                Ok(()) => {
                    self.state.tracking = TrackingStatus::Active;
                    Some(detector)
                }
                Err(e) => {
                    log::warn!("Landmark detector unavailable: {e}");
                    detector.close();
                    self.state.tracking = TrackingStatus::Unavailable(e.to_string());
                    None
                }
            },
            None => {
                self.state.tracking =
                    TrackingStatus::Unavailable("no landmark detector".to_string());
                None
            }
        };

        let index_map = detector.as_ref().map_or(&FACE_MESH, |d| d.index_map());
        let tracker = LandmarkTracker::new(index_map, self.config.tracker_config());
        let mut logger: Box<dyn SessionLogger> = match self.logger.take() {
            Some(logger) => logger,
            None => Box::new(NullSessionLogger),
        };
        logger.info(&format!("Tracking with {} landmarks", index_map.name));

        let (updates_tx, updates_rx) = crossbeam_channel::unbounded();
        let (frames_tx, frames_rx) = match self.frame_buffer {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };

        let parts = LoopParts {
            stream,
            detector,
            tracker,
            logger,
        };
        self.running = Some(DetectionLoop::spawn(
            parts,
            self.config.frame_interval(),
            LoopOutputs {
                updates: updates_tx,
                frames: Some(frames_tx),
            },
        ));
        self.updates_rx = Some(updates_rx);
        self.frames_rx = Some(frames_rx);
        self.state.is_loading = false;
        Ok(())
    }

    /// Tracker updates, one per processed frame.
    pub fn updates(&self) -> Option<Receiver<FrameUpdate>> {
        self.updates_rx.clone()
    }

    /// Camera frames for display. Disconnects when the loop ends.
    pub fn frames(&self) -> Option<Receiver<Frame>> {
        self.frames_rx.clone()
    }

    /// Drains pending updates into the session state and returns the newest.
    pub fn poll(&mut self) -> Option<FrameUpdate> {
        let latest = self.updates_rx.as_ref()?.try_iter().last();
        if let Some(update) = latest {
            self.state.is_face_detected = update.update.face_detected;
        }
        latest
    }

    /// True while the detection loop is alive.
    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|l| l.is_running())
    }

    /// Releases every resource the session holds. Idempotent.
    pub fn stop(&mut self) {
        let mut released = false;

        if let Some(detection_loop) = self.running.take() {
            if let Some(mut parts) = detection_loop.stop() {
                parts.release();
                parts.logger.summary();
                self.logger = Some(parts.logger);
            }
            released = true;
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            released = true;
        }

        if released {
            self.state.is_face_detected = false;
            self.state.has_permission = None;
            log::info!("Camera released");
        }
    }
}

impl Drop for TryOnSession {
    fn drop(&mut self) {
        self.stop();
    }
}
