use super::image::{Image, PixelBuffer};
use super::pixel::PixelFormat;

/// A single captured frame: contiguous row-major pixels in a declared layout.
///
/// Format conversion happens inside the backends; the frame only carries the
/// pixels as they arrived from the source.
#[derive(Clone, Debug)]
pub struct Frame {
    pixels: PixelBuffer,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(pixels: PixelBuffer, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize),
            "pixel count must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
            index,
        }
    }

    pub fn image(&self) -> Image<'_> {
        self.pixels.as_image()
    }

    pub fn format(&self) -> PixelFormat {
        self.pixels.format()
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
}
