/// Face width (normalized) of a neutral face at neutral distance; `scale = face_width / this`.
pub const NEUTRAL_FACE_WIDTH: f64 = 0.4;

pub const DEFAULT_POSITION_SMOOTHING: f64 = 0.3;
pub const DEFAULT_ANGLE_SMOOTHING: f64 = 0.2;

/// Detections narrower than this (normalized temple distance) are rejected.
pub const DEFAULT_MIN_FACE_WIDTH: f64 = 0.02;

/// A typical frame spans about this many inter-eye distances.
pub const FRAME_TO_EYE_DISTANCE_RATIO: f64 = 2.8;

/// Upward anchor shift, as a fraction of eye distance, to sit on the nose bridge.
pub const NOSE_BRIDGE_LIFT_RATIO: f64 = 0.08;

pub const MIN_OVERLAY_SCALE: f64 = 0.5;
pub const MAX_OVERLAY_SCALE: f64 = 2.5;

/// ~30 fps polling of the camera.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;

pub const DEFAULT_ASSET_ID: &str = "aviator";

pub const CAMERA_IDEAL_WIDTH: u32 = 1920;
pub const CAMERA_IDEAL_HEIGHT: u32 = 1080;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
