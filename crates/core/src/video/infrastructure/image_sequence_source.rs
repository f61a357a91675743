use std::path::{Path, PathBuf};

use image::imageops::FilterType;

use crate::conversion::convert::convert;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::image::{Image, PixelBuffer};
use crate::shared::pixel::{PixelFormat, RgbaPixel};
use crate::video::domain::frame_source::{FrameSource, FrameSourceError};

/// Plays a list of image files back as frames.
///
/// Every image must have the size of the first one. Frames are downscaled by
/// an integer factor and converted to the requested pixel format.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    next: usize,
    format: PixelFormat,
    scale: u32,
    source_size: (u32, u32),
}

impl ImageSequenceSource {
    /// # Panics
    ///
    /// Panics if `scale` is zero.
    pub fn new(
        paths: Vec<PathBuf>,
        format: PixelFormat,
        scale: u32,
    ) -> Result<Self, FrameSourceError> {
        assert!(scale >= 1, "scale must be at least 1");
        let first = paths
            .first()
            .ok_or_else(|| FrameSourceError::Empty(PathBuf::new()))?;
        let source_size = image::image_dimensions(first).map_err(|e| decode_error(first, e))?;
        log::info!(
            "Image sequence of {} frames at {}x{}",
            paths.len(),
            source_size.0,
            source_size.1
        );
        Ok(Self {
            paths,
            next: 0,
            format,
            scale,
            source_size,
        })
    }

    /// All images directly inside `dir`, in file name order.
    pub fn from_dir(dir: &Path, format: PixelFormat, scale: u32) -> Result<Self, FrameSourceError> {
        let io_error = |source| FrameSourceError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(FrameSourceError::Empty(dir.to_path_buf()));
        }
        paths.sort();
        Self::new(paths, format, scale)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Changes the layout of frames decoded from now on.
    pub fn set_format(&mut self, format: PixelFormat) {
        self.format = format;
    }

    fn decode(&self, path: &Path) -> Result<Frame, FrameSourceError> {
        let decoded = image::open(path).map_err(|e| decode_error(path, e))?;
        let (width, height) = (decoded.width(), decoded.height());
        if (width, height) != self.source_size {
            return Err(FrameSourceError::SizeMismatch {
                path: path.to_path_buf(),
                width: self.source_size.0,
                height: self.source_size.1,
                actual_width: width,
                actual_height: height,
            });
        }

        let (out_w, out_h) = self.frame_size();
        let decoded = if self.scale > 1 {
            decoded.resize_exact(out_w, out_h, FilterType::Triangle)
        } else {
            decoded
        };

        let rgba = decoded.to_rgba8();
        let bytes: &[u8] = rgba.as_raw();
        let pixels: &[RgbaPixel] = bytemuck::cast_slice(bytes);
        let mut buffer = PixelBuffer::new(self.format, pixels.len());
        convert(Image::Rgba(pixels), buffer.as_image_mut());

        Ok(Frame::new(buffer, out_w, out_h, self.next))
    }
}

impl FrameSource for ImageSequenceSource {
    fn frame_size(&self) -> (u32, u32) {
        (
            (self.source_size.0 / self.scale).max(1),
            (self.source_size.1 / self.scale).max(1),
        )
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        let frame = self.decode(path)?;
        self.next += 1;
        Ok(Some(frame))
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn decode_error(path: &Path, e: image::ImageError) -> FrameSourceError {
    FrameSourceError::Decode {
        path: path.to_path_buf(),
        source: Box::new(e),
    }
}
