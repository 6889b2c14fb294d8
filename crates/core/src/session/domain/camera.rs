use thiserror::Error;

use crate::shared::constants::{CAMERA_IDEAL_HEIGHT, CAMERA_IDEAL_WIDTH};
use crate::shared::frame::Frame;

/// The closed set of camera failures a user can act on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("camera access denied")]
    PermissionDenied,
    #[error("no camera found")]
    NoDevice,
    #[error("camera unavailable: {0}")]
    Other(String),
}

impl CameraError {
    /// Message shown next to the retry prompt.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => {
                "Camera access was denied. Please enable camera permissions in your settings."
            }
            CameraError::NoDevice => "No camera found. Please connect a camera and try again.",
            CameraError::Other(_) => "Unable to access camera. Please try again.",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera; its preview is presented mirrored.
    User,
    Environment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            ideal_width: CAMERA_IDEAL_WIDTH,
            ideal_height: CAMERA_IDEAL_HEIGHT,
        }
    }
}

/// Grants access to a camera. Opening is the permission request.
pub trait CameraSource: Send {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// A live frame stream, held for the lifetime of a session.
pub trait MediaStream: Send {
    /// The next frame, or `None` if none is ready yet.
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Stops all tracks. Idempotent.
    fn stop(&mut self);

    /// False once stopped or when a finite source is exhausted.
    fn is_active(&self) -> bool;
}
