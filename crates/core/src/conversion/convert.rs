//! Pixel layout conversion between the five supported formats.
//!
//! Every output pixel depends only on the input pixel at the same index, so
//! conversions are split across the rayon pool. Images below
//! [`MIN_PARALLEL_LEN`] pixels per task stay on the calling thread.

use rayon::prelude::*;

use crate::shared::image::{Image, ImageMut};
use crate::shared::pixel::{
    BgrPixel, BgraPixel, GrayscalePixel, PixelFormat, RgbPixel, RgbaPixel,
};

/// Smallest run of pixels handed to one rayon task.
pub const MIN_PARALLEL_LEN: usize = 16 * 1024;

/// Layout-independent pixel value. `a` is `None` for sources without alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

/// A concrete pixel layout that can be decoded to and encoded from [`Color`].
pub trait Pixel: Copy + Send + Sync {
    const FORMAT: PixelFormat;

    fn to_color(self) -> Color;

    fn from_color(color: Color) -> Self;
}

/// ITU-R BT.601 luma, truncated.
///
/// Evaluated in fixed point so the result is exactly
/// `floor(0.299 R + 0.587 G + 0.114 B)`; a gray input maps to itself.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

impl Pixel for GrayscalePixel {
    const FORMAT: PixelFormat = PixelFormat::Grayscale;

    #[inline]
    fn to_color(self) -> Color {
        Color {
            r: self,
            g: self,
            b: self,
            a: None,
        }
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        luminance(c.r, c.g, c.b)
    }
}

impl Pixel for RgbPixel {
    const FORMAT: PixelFormat = PixelFormat::Rgb;

    #[inline]
    fn to_color(self) -> Color {
        Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: None,
        }
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        RgbPixel::new(c.r, c.g, c.b)
    }
}

impl Pixel for RgbaPixel {
    const FORMAT: PixelFormat = PixelFormat::Rgba;

    #[inline]
    fn to_color(self) -> Color {
        Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: Some(self.a),
        }
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        RgbaPixel::new(c.r, c.g, c.b, c.a.unwrap_or(u8::MAX))
    }
}

impl Pixel for BgrPixel {
    const FORMAT: PixelFormat = PixelFormat::Bgr;

    #[inline]
    fn to_color(self) -> Color {
        Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: None,
        }
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        BgrPixel::new(c.b, c.g, c.r)
    }
}

impl Pixel for BgraPixel {
    const FORMAT: PixelFormat = PixelFormat::Bgra;

    #[inline]
    fn to_color(self) -> Color {
        Color {
            r: self.r,
            g: self.g,
            b: self.b,
            a: Some(self.a),
        }
    }

    #[inline]
    fn from_color(c: Color) -> Self {
        BgraPixel::new(c.b, c.g, c.r, c.a.unwrap_or(u8::MAX))
    }
}

/// Converts `input` into `output` pixel by pixel.
///
/// Panics if the slices differ in length.
pub fn convert_pixels<S: Pixel, D: Pixel>(input: &[S], output: &mut [D]) {
    assert_eq!(
        input.len(),
        output.len(),
        "conversion from {} to {} needs equal pixel counts",
        S::FORMAT,
        D::FORMAT
    );
    output
        .par_iter_mut()
        .zip(input.par_iter())
        .with_min_len(MIN_PARALLEL_LEN)
        .for_each(|(dst, src)| *dst = D::from_color(src.to_color()));
}

pub fn to_grayscale<S: Pixel>(input: &[S], output: &mut [GrayscalePixel]) {
    convert_pixels(input, output);
}

pub fn to_rgb<S: Pixel>(input: &[S], output: &mut [RgbPixel]) {
    convert_pixels(input, output);
}

pub fn to_rgba<S: Pixel>(input: &[S], output: &mut [RgbaPixel]) {
    convert_pixels(input, output);
}

pub fn to_bgr<S: Pixel>(input: &[S], output: &mut [BgrPixel]) {
    convert_pixels(input, output);
}

pub fn to_bgra<S: Pixel>(input: &[S], output: &mut [BgraPixel]) {
    convert_pixels(input, output);
}

/// Converts between any two tagged images. Same-format pairs are copied.
///
/// Panics if the images differ in pixel count.
pub fn convert(input: Image<'_>, output: ImageMut<'_>) {
    match (input, output) {
        (Image::Grayscale(i), ImageMut::Grayscale(o)) => o.copy_from_slice(i),
        (Image::Rgb(i), ImageMut::Rgb(o)) => o.copy_from_slice(i),
        (Image::Rgba(i), ImageMut::Rgba(o)) => o.copy_from_slice(i),
        (Image::Bgr(i), ImageMut::Bgr(o)) => o.copy_from_slice(i),
        (Image::Bgra(i), ImageMut::Bgra(o)) => o.copy_from_slice(i),
        (Image::Grayscale(i), output) => convert_into(i, output),
        (Image::Rgb(i), output) => convert_into(i, output),
        (Image::Rgba(i), output) => convert_into(i, output),
        (Image::Bgr(i), output) => convert_into(i, output),
        (Image::Bgra(i), output) => convert_into(i, output),
    }
}

fn convert_into<S: Pixel>(input: &[S], output: ImageMut<'_>) {
    match output {
        ImageMut::Grayscale(o) => convert_pixels(input, o),
        ImageMut::Rgb(o) => convert_pixels(input, o),
        ImageMut::Rgba(o) => convert_pixels(input, o),
        ImageMut::Bgr(o) => convert_pixels(input, o),
        ImageMut::Bgra(o) => convert_pixels(input, o),
    }
}
