use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::Serialize;

use super::domain::camera::MediaStream;
use super::session_logger::SessionLogger;
use crate::shared::frame::Frame;
use crate::tracking::domain::detection::Detection;
use crate::tracking::domain::landmark_detector::{DetectorError, LandmarkDetector};
use crate::tracking::landmark_tracker::{LandmarkTracker, TrackerUpdate};

/// Tracker output tagged with the frame it came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameUpdate {
    pub frame_index: usize,
    pub update: TrackerUpdate,
}

/// Everything the loop owns while it runs, handed back by [`DetectionLoop::stop`].
pub struct LoopParts {
    pub stream: Box<dyn MediaStream>,
    /// `None` when the detector failed to load: frames still flow to the display.
    pub detector: Option<Box<dyn LandmarkDetector>>,
    pub tracker: LandmarkTracker,
    pub logger: Box<dyn SessionLogger>,
}

impl LoopParts {
    /// Closes the detector, then stops the stream. Both are idempotent.
    pub fn release(&mut self) {
        if let Some(detector) = self.detector.as_mut() {
            detector.close();
        }
        self.stream.stop();
    }
}

/// Releases the parts if the worker unwinds mid-frame.
struct ReleaseOnUnwind<'a> {
    parts: &'a mut LoopParts,
}

impl ReleaseOnUnwind<'_> {
    fn parts_mut(&mut self) -> &mut LoopParts {
        self.parts
    }
}

impl Drop for ReleaseOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            log::error!("Detection loop panicked; releasing camera and detector");
            self.parts.release();
        }
    }
}

/// Output channels of the loop.
pub struct LoopOutputs {
    pub updates: Sender<FrameUpdate>,
    /// Raw frames for display. Sent with `try_send`: a full channel drops the frame.
    pub frames: Option<Sender<Frame>>,
}

/// The read → detect → track cycle as an explicit, cancellable task.
///
/// Runs on one worker thread and processes one frame at a time. Between
/// frames it waits on a stop channel, so [`stop`](Self::stop) wakes it
/// immediately instead of waiting out the tick.
pub struct DetectionLoop {
    handle: Option<JoinHandle<LoopParts>>,
    cancelled: Arc<AtomicBool>,
    stop_tx: Sender<()>,
}

impl DetectionLoop {
    pub fn spawn(parts: LoopParts, frame_interval: Duration, outputs: LoopOutputs) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let cancelled_clone = cancelled.clone();

        let handle = thread::spawn(move || {
            run_loop(parts, frame_interval, &outputs, &stop_rx, &cancelled_clone)
        });

        Self {
            handle: Some(handle),
            cancelled,
            stop_tx,
        }
    }

    /// False once the loop has exited, by cancellation or end of stream.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the loop and waits for the in-flight frame to finish.
    ///
    /// Returns the parts so the caller can release them in order. `None`
    /// if the worker panicked, in which case they were released during
    /// unwinding.
    pub fn stop(mut self) -> Option<LoopParts> {
        self.halt()
    }

    fn halt(&mut self) -> Option<LoopParts> {
        let handle = self.handle.take()?;
        self.cancelled.store(true, Ordering::Relaxed);
        let _ = self.stop_tx.try_send(());
        match handle.join() {
            Ok(parts) => Some(parts),
            Err(_) => None,
        }
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        if let Some(mut parts) = self.halt() {
            parts.release();
        }
    }
}

fn run_loop(
    mut parts: LoopParts,
    frame_interval: Duration,
    outputs: &LoopOutputs,
    stop_rx: &Receiver<()>,
    cancelled: &AtomicBool,
) -> LoopParts {
    let mut guard = ReleaseOnUnwind { parts: &mut parts };
    drive(guard.parts_mut(), frame_interval, outputs, stop_rx, cancelled);
    drop(guard);
    parts
}

fn drive(
    parts: &mut LoopParts,
    frame_interval: Duration,
    outputs: &LoopOutputs,
    stop_rx: &Receiver<()>,
    cancelled: &AtomicBool,
) {
    while !cancelled.load(Ordering::Relaxed) && parts.stream.is_active() {
        match parts.stream.read_frame() {
            Ok(Some(frame)) => {
                if !process_frame(parts, &frame, outputs) {
                    break;
                }
                if let Some(ref frames) = outputs.frames {
                    let _ = frames.try_send(frame);
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Camera stream failed: {e}");
                break;
            }
        }

        match stop_rx.recv_timeout(frame_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Runs detection and tracking for one frame. Returns false to end the loop.
fn process_frame(parts: &mut LoopParts, frame: &Frame, outputs: &LoopOutputs) -> bool {
    let Some(detector) = parts.detector.as_mut() else {
        return true;
    };

    let start = Instant::now();
    let detection = match detector.detect(frame) {
        Ok(detection) => detection,
        Err(DetectorError::Closed) => {
            log::warn!("Detector closed; stopping detection loop");
            return false;
        }
        Err(e) => {
            log::debug!("Frame {}: {e}", frame.index());
            Detection::NoFace
        }
    };
    parts
        .logger
        .timing("detect", start.elapsed().as_secs_f64() * 1000.0);

    let start = Instant::now();
    let update = parts.tracker.process(&detection);
    parts
        .logger
        .timing("track", start.elapsed().as_secs_f64() * 1000.0);
    parts.logger.frame(update.face_detected);

    outputs
        .updates
        .send(FrameUpdate {
            frame_index: frame.index(),
            update,
        })
        .is_ok()
}
