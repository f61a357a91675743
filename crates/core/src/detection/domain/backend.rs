use thiserror::Error;

use crate::shared::image::Image;
use crate::shared::pixel::PixelFormat;
use crate::shared::rect::RectList;

#[derive(Error, Debug)]
pub enum BackendError {
    #[cfg(feature = "onnx")]
    #[error("failed to resolve model: {0}")]
    ModelResolve(#[from] crate::shared::model_resolver::ModelResolveError),
    #[error("detection engine session error: {0}")]
    Session(String),
    #[error("engine expected {expected} pixels, got {actual}")]
    UnexpectedFormat {
        expected: PixelFormat,
        actual: PixelFormat,
    },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Uniform detection contract over every engine.
///
/// A backend is bound to one frame size at construction and may keep scratch
/// buffers of that size, hence `&mut self`. Images of any other size are a
/// caller bug.
pub trait Backend: Send {
    fn name(&self) -> &str;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// The layout the backend consumes without converting.
    fn preferred_format(&self) -> PixelFormat;

    /// Detects faces in `image`, replacing the contents of `results`.
    ///
    /// The input is never modified. Finding no faces is `Ok` with an empty list.
    fn process(&mut self, image: Image<'_>, results: &mut RectList) -> Result<(), BackendError>;
}
