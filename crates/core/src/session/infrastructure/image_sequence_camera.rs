use std::path::{Path, PathBuf};

use crate::session::domain::camera::{CameraConstraints, CameraError, CameraSource, MediaStream};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Adapts a directory of still images to the [`CameraSource`] interface.
///
/// Files are played back in name order, one per read, so recorded captures
/// can drive a session exactly like a live camera. Frame indices follow
/// file order.
pub struct ImageSequenceCamera {
    dir: PathBuf,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn list_images(&self) -> Result<Vec<PathBuf>, CameraError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|_| CameraError::NoDevice)?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        paths.sort();
        Ok(paths)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

impl CameraSource for ImageSequenceCamera {
    fn open(
        &mut self,
        _constraints: &CameraConstraints,
    ) -> Result<Box<dyn MediaStream>, CameraError> {
        let paths = self.list_images()?;
        if paths.is_empty() {
            return Err(CameraError::NoDevice);
        }
        log::info!(
            "Opened image sequence {} ({} frames)",
            self.dir.display(),
            paths.len()
        );
        Ok(Box::new(ImageSequenceStream {
            paths,
            next: 0,
            active: true,
        }))
    }
}

struct ImageSequenceStream {
    paths: Vec<PathBuf>,
    next: usize,
    active: bool,
}

impl MediaStream for ImageSequenceStream {
    fn read_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        if !self.active {
            return Ok(None);
        }
        let Some(path) = self.paths.get(self.next) else {
            self.active = false;
            return Ok(None);
        };
        let image = image::open(path)
            .map_err(|e| CameraError::Other(format!("{}: {e}", path.display())))?
            .to_rgb8();
        let frame = Frame::from_rgb_image(image, self.next);
        self.next += 1;
        Ok(Some(frame))
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
