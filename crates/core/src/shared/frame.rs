use image::RgbImage;
use ndarray::{ArrayView3, ArrayViewMut3};

use super::viewport::Viewport;

const CHANNELS: usize = 3;

/// One camera frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the camera boundary; detectors and
/// renderers see RGB only.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A black frame, used by fakes and as a compositing canvas.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        Self::new(
            vec![0u8; width as usize * height as usize * CHANNELS],
            width,
            height,
            index,
        )
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, index)
    }

    pub fn into_rgb_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.data)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Flips the frame left to right, as a front camera preview is shown.
    pub fn mirror_horizontal(&mut self) {
        let width = self.width as usize;
        if width < 2 {
            return;
        }
        let row_len = width * CHANNELS;
        for row in self.data.chunks_exact_mut(row_len) {
            for x in 0..width / 2 {
                let (a, b) = (x * CHANNELS, (width - 1 - x) * CHANNELS);
                for c in 0..CHANNELS {
                    row.swap(a + c, b + c);
                }
            }
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_dimensions() {
        let frame = Frame::blank(4, 2, 7);
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.data().len(), 24);
        assert_eq!(frame.viewport(), Viewport::new(4, 2));
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_rgb_image_conversion_preserves_pixels() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([10, 20, 30]));
        let frame = Frame::from_rgb_image(img, 0);
        assert_eq!(frame.as_ndarray()[[1, 2, 1]], 20);

        let back = frame.into_rgb_image().unwrap();
        assert_eq!(back.get_pixel(2, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_as_ndarray_shape_is_height_width_channels() {
        let frame = Frame::blank(4, 2, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_mirror_horizontal_swaps_columns() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 1, image::Rgb([1, 2, 3]));
        img.put_pixel(1, 1, image::Rgb([7, 7, 7]));
        let mut frame = Frame::from_rgb_image(img, 0);
        frame.mirror_horizontal();

        let pixels = frame.as_ndarray();
        assert_eq!(pixels[[1, 2, 0]], 1);
        assert_eq!(pixels[[1, 2, 2]], 3);
        assert_eq!(pixels[[1, 1, 0]], 7);
        assert_eq!(pixels[[1, 0, 0]], 0);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let mut frame = Frame::blank(2, 2, 0);
        frame.as_ndarray_mut()[[0, 1, 2]] = 128;
        assert_eq!(frame.data()[5], 128);
    }
}
