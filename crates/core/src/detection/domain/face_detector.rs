use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use super::backend::{Backend, BackendError};
use super::backend_registry::BackendRegistry;
use crate::shared::image::{Image, ImageError};
use crate::shared::pixel::PixelFormat;
use crate::shared::rect::RectList;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Unsupported backend \"{0}\" requested.")]
    UnsupportedBackend(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Thread-safe front end over one backend.
///
/// Calls to [`FaceDetector::process`] are serialized, so a detector can be
/// shared between threads behind an `Arc`.
pub struct FaceDetector {
    backend: Mutex<Box<dyn Backend>>,
    name: String,
    preferred_format: PixelFormat,
    width: u32,
    height: u32,
}

impl FaceDetector {
    /// Builds the backend registered under `backend` for a `width × height` frame.
    pub fn new(
        registry: &BackendRegistry,
        width: u32,
        height: u32,
        backend: &str,
    ) -> Result<Self, DetectorError> {
        let backend = registry
            .create(backend, width, height)
            .ok_or_else(|| DetectorError::UnsupportedBackend(backend.to_owned()))??;
        log::info!(
            "Face detector using backend '{}' at {}x{} (prefers {})",
            backend.name(),
            width,
            height,
            backend.preferred_format()
        );
        Ok(Self::from_backend(backend))
    }

    pub fn with_default_backend(
        registry: &BackendRegistry,
        width: u32,
        height: u32,
    ) -> Result<Self, DetectorError> {
        Self::new(registry, width, height, registry.default_backend())
    }

    pub fn from_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            name: backend.name().to_owned(),
            preferred_format: backend.preferred_format(),
            width: backend.width(),
            height: backend.height(),
            backend: Mutex::new(backend),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preferred_format(&self) -> PixelFormat {
        self.preferred_format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Detects faces in `image`, replacing the contents of `results`.
    ///
    /// Concurrent callers are served one at a time.
    pub fn process(&self, image: Image<'_>, results: &mut RectList) -> Result<(), DetectorError> {
        debug_assert_eq!(
            image.len(),
            self.width as usize * self.height as usize,
            "image pixel count must match the detector frame size"
        );
        self.lock().process(image, results)?;
        Ok(())
    }

    /// Like [`FaceDetector::process`], for a packed byte buffer.
    pub fn process_bytes(
        &self,
        format: PixelFormat,
        bytes: &[u8],
        results: &mut RectList,
    ) -> Result<(), DetectorError> {
        let image = Image::from_bytes(format, bytes)?;
        self.process(image, results)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Backend>> {
        self.backend.lock().unwrap_or_else(|poisoned| {
            log::warn!("Backend '{}' panicked during a previous call; continuing", self.name);
            poisoned.into_inner()
        })
    }
}
