use std::collections::HashMap;
use std::time::Instant;

/// Observer for detection-loop events.
///
/// Decouples the loop from where diagnostics go (log crate, a UI overlay,
/// nowhere) so callers can watch tracking without touching the loop.
pub trait SessionLogger: Send {
    /// One frame went through the tracker.
    fn frame(&mut self, face_detected: bool);

    /// How long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    fn info(&mut self, message: &str);

    /// End-of-session report. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and embedders with their own telemetry.
pub struct NullSessionLogger;

impl SessionLogger for NullSessionLogger {
    fn frame(&mut self, _face_detected: bool) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs throttled tracking progress and a summary with detection rate and
/// per-stage timings.
pub struct StdoutSessionLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
    faces: usize,
}

impl StdoutSessionLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
            faces: 0,
        }
    }

    /// Fraction of frames with a tracked face.
    pub fn detection_rate(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.faces as f64 / self.frames as f64
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// `None` until a frame has been seen.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames, {:.1}s, face in {:.1}%):",
            self.frames,
            elapsed_s,
            self.detection_rate() * 100.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let avg_ms = durations.iter().sum::<f64>() / durations.len().max(1) as f64;
            let max_ms = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!("  {stage:10}: avg {avg_ms:6.2}ms  max {max_ms:7.2}ms"));
        }

        if elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.frames as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutSessionLogger {
    fn default() -> Self {
        Self::new(300)
    }
}

impl SessionLogger for StdoutSessionLogger {
    fn frame(&mut self, face_detected: bool) {
        self.frames += 1;
        if face_detected {
            self.faces += 1;
        }
        if self.frames % self.throttle_frames == 0 {
            log::info!(
                "Tracked {} frames, face in {:.1}%",
                self.frames,
                self.detection_rate() * 100.0
            );
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
