use crate::conversion::convert::convert;
use crate::shared::image::{Image, PixelBuffer};
use crate::shared::pixel::PixelFormat;

/// Brings images of any layout into one target format.
///
/// The scratch buffer is allocated once, so adapting a frame never allocates.
pub struct FormatAdapter {
    scratch: PixelBuffer,
}

impl FormatAdapter {
    pub fn new(format: PixelFormat, len: usize) -> Self {
        Self {
            scratch: PixelBuffer::new(format, len),
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.scratch.format()
    }

    /// Returns `image` itself when it is already in the target format,
    /// otherwise a view of the scratch buffer holding the converted pixels.
    pub fn adapt<'a>(&'a mut self, image: Image<'a>) -> Image<'a> {
        if image.format() == self.scratch.format() {
            return image;
        }
        convert(image, self.scratch.as_image_mut());
        self.scratch.as_image()
    }
}
