use crate::shared::image::Image;
use crate::shared::pixel::PixelFormat;
use crate::shared::rect::{Rect, RectList};

use super::backend::{Backend, BackendError};

/// Deterministic backend that ignores pixel content.
///
/// Always reports one rectangle of `width/8 × height/4` centered in the
/// frame. Has no dependencies, so it is always registered as the last resort.
pub struct StubBackend {
    width: u32,
    height: u32,
}

impl StubBackend {
    pub const NAME: &'static str = "stub";

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        let w = self.width / 8;
        let h = self.height / 4;
        let x = self.width / 2 - w / 2;
        let y = self.height / 2 - h / 2;
        Rect::new(x, y, w, h)
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn preferred_format(&self) -> PixelFormat {
        PixelFormat::Grayscale
    }

    fn process(&mut self, _image: Image<'_>, results: &mut RectList) -> Result<(), BackendError> {
        results.clear();
        results.push(self.rect());
        Ok(())
    }
}
