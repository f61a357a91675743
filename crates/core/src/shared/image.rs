use thiserror::Error;

use super::pixel::{BgrPixel, BgraPixel, GrayscalePixel, PixelFormat, RgbPixel, RgbaPixel};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("buffer of {len} bytes is not a whole number of {format} pixels")]
    Misaligned { format: PixelFormat, len: usize },
}

/// Read-only view of a pixel buffer, tagged with its layout.
#[derive(Clone, Copy, Debug)]
pub enum Image<'a> {
    Grayscale(&'a [GrayscalePixel]),
    Rgb(&'a [RgbPixel]),
    Rgba(&'a [RgbaPixel]),
    Bgr(&'a [BgrPixel]),
    Bgra(&'a [BgraPixel]),
}

impl<'a> Image<'a> {
    /// Reinterprets raw bytes as pixels of `format`.
    pub fn from_bytes(format: PixelFormat, bytes: &'a [u8]) -> Result<Self, ImageError> {
        let misaligned = || ImageError::Misaligned {
            format,
            len: bytes.len(),
        };
        Ok(match format {
            PixelFormat::Grayscale => Image::Grayscale(bytes),
            PixelFormat::Rgb => Image::Rgb(bytemuck::try_cast_slice(bytes).map_err(|_| misaligned())?),
            PixelFormat::Rgba => Image::Rgba(bytemuck::try_cast_slice(bytes).map_err(|_| misaligned())?),
            PixelFormat::Bgr => Image::Bgr(bytemuck::try_cast_slice(bytes).map_err(|_| misaligned())?),
            PixelFormat::Bgra => Image::Bgra(bytemuck::try_cast_slice(bytes).map_err(|_| misaligned())?),
        })
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            Image::Grayscale(_) => PixelFormat::Grayscale,
            Image::Rgb(_) => PixelFormat::Rgb,
            Image::Rgba(_) => PixelFormat::Rgba,
            Image::Bgr(_) => PixelFormat::Bgr,
            Image::Bgra(_) => PixelFormat::Bgra,
        }
    }

    /// Number of pixels (not bytes).
    pub fn len(&self) -> usize {
        match self {
            Image::Grayscale(p) => p.len(),
            Image::Rgb(p) => p.len(),
            Image::Rgba(p) => p.len(),
            Image::Bgr(p) => p.len(),
            Image::Bgra(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Image::Grayscale(p) => p,
            Image::Rgb(p) => bytemuck::cast_slice(p),
            Image::Rgba(p) => bytemuck::cast_slice(p),
            Image::Bgr(p) => bytemuck::cast_slice(p),
            Image::Bgra(p) => bytemuck::cast_slice(p),
        }
    }
}

impl<'a> From<&'a [GrayscalePixel]> for Image<'a> {
    fn from(pixels: &'a [GrayscalePixel]) -> Self {
        Image::Grayscale(pixels)
    }
}

impl<'a> From<&'a [RgbPixel]> for Image<'a> {
    fn from(pixels: &'a [RgbPixel]) -> Self {
        Image::Rgb(pixels)
    }
}

impl<'a> From<&'a [RgbaPixel]> for Image<'a> {
    fn from(pixels: &'a [RgbaPixel]) -> Self {
        Image::Rgba(pixels)
    }
}

impl<'a> From<&'a [BgrPixel]> for Image<'a> {
    fn from(pixels: &'a [BgrPixel]) -> Self {
        Image::Bgr(pixels)
    }
}

impl<'a> From<&'a [BgraPixel]> for Image<'a> {
    fn from(pixels: &'a [BgraPixel]) -> Self {
        Image::Bgra(pixels)
    }
}

/// Mutable counterpart of [`Image`]; the destination of conversions.
#[derive(Debug)]
pub enum ImageMut<'a> {
    Grayscale(&'a mut [GrayscalePixel]),
    Rgb(&'a mut [RgbPixel]),
    Rgba(&'a mut [RgbaPixel]),
    Bgr(&'a mut [BgrPixel]),
    Bgra(&'a mut [BgraPixel]),
}

impl ImageMut<'_> {
    pub fn format(&self) -> PixelFormat {
        match self {
            ImageMut::Grayscale(_) => PixelFormat::Grayscale,
            ImageMut::Rgb(_) => PixelFormat::Rgb,
            ImageMut::Rgba(_) => PixelFormat::Rgba,
            ImageMut::Bgr(_) => PixelFormat::Bgr,
            ImageMut::Bgra(_) => PixelFormat::Bgra,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ImageMut::Grayscale(p) => p.len(),
            ImageMut::Rgb(p) => p.len(),
            ImageMut::Rgba(p) => p.len(),
            ImageMut::Bgr(p) => p.len(),
            ImageMut::Bgra(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owned pixel storage in one of the five layouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelBuffer {
    Grayscale(Vec<GrayscalePixel>),
    Rgb(Vec<RgbPixel>),
    Rgba(Vec<RgbaPixel>),
    Bgr(Vec<BgrPixel>),
    Bgra(Vec<BgraPixel>),
}

impl PixelBuffer {
    /// Zero-filled buffer of `len` pixels.
    pub fn new(format: PixelFormat, len: usize) -> Self {
        match format {
            PixelFormat::Grayscale => PixelBuffer::Grayscale(vec![0; len]),
            PixelFormat::Rgb => PixelBuffer::Rgb(vec![RgbPixel::default(); len]),
            PixelFormat::Rgba => PixelBuffer::Rgba(vec![RgbaPixel::default(); len]),
            PixelFormat::Bgr => PixelBuffer::Bgr(vec![BgrPixel::default(); len]),
            PixelFormat::Bgra => PixelBuffer::Bgra(vec![BgraPixel::default(); len]),
        }
    }

    /// Copies raw bytes into owned storage.
    pub fn from_bytes(format: PixelFormat, bytes: &[u8]) -> Result<Self, ImageError> {
        Ok(PixelBuffer::from(Image::from_bytes(format, bytes)?))
    }

    pub fn format(&self) -> PixelFormat {
        self.as_image().format()
    }

    pub fn len(&self) -> usize {
        self.as_image().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_image(&self) -> Image<'_> {
        match self {
            PixelBuffer::Grayscale(p) => Image::Grayscale(p),
            PixelBuffer::Rgb(p) => Image::Rgb(p),
            PixelBuffer::Rgba(p) => Image::Rgba(p),
            PixelBuffer::Bgr(p) => Image::Bgr(p),
            PixelBuffer::Bgra(p) => Image::Bgra(p),
        }
    }

    pub fn as_image_mut(&mut self) -> ImageMut<'_> {
        match self {
            PixelBuffer::Grayscale(p) => ImageMut::Grayscale(p),
            PixelBuffer::Rgb(p) => ImageMut::Rgb(p),
            PixelBuffer::Rgba(p) => ImageMut::Rgba(p),
            PixelBuffer::Bgr(p) => ImageMut::Bgr(p),
            PixelBuffer::Bgra(p) => ImageMut::Bgra(p),
        }
    }
}

impl From<Image<'_>> for PixelBuffer {
    fn from(image: Image<'_>) -> Self {
        match image {
            Image::Grayscale(p) => PixelBuffer::Grayscale(p.to_vec()),
            Image::Rgb(p) => PixelBuffer::Rgb(p.to_vec()),
            Image::Rgba(p) => PixelBuffer::Rgba(p.to_vec()),
            Image::Bgr(p) => PixelBuffer::Bgr(p.to_vec()),
            Image::Bgra(p) => PixelBuffer::Bgra(p.to_vec()),
        }
    }
}
