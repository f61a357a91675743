use crate::detection::domain::backend::{Backend, BackendError};
use crate::detection::domain::face_engine::{FaceEngine, RawDetection};
use crate::shared::image::Image;
use crate::shared::pixel::PixelFormat;
use crate::shared::rect::RectList;

use super::format_adapter::FormatAdapter;

/// Backend around an external [`FaceEngine`].
///
/// Converts frames to the engine's format, then keeps detections scoring at
/// least `min_confidence`, clamped to the frame.
pub struct EngineBackend<E: FaceEngine> {
    engine: E,
    adapter: FormatAdapter,
    width: u32,
    height: u32,
    min_confidence: f64,
    detections: Vec<RawDetection>,
}

impl<E: FaceEngine> EngineBackend<E> {
    pub fn new(engine: E, width: u32, height: u32, min_confidence: f64) -> Self {
        let adapter = FormatAdapter::new(engine.preferred_format(), width as usize * height as usize);
        Self {
            engine,
            adapter,
            width,
            height,
            min_confidence,
            detections: Vec::new(),
        }
    }
}

impl<E: FaceEngine> Backend for EngineBackend<E> {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn preferred_format(&self) -> PixelFormat {
        self.adapter.format()
    }

    fn process(&mut self, image: Image<'_>, results: &mut RectList) -> Result<(), BackendError> {
        debug_assert_eq!(image.len(), self.width as usize * self.height as usize);
        results.clear();
        self.detections.clear();

        let image = self.adapter.adapt(image);
        self.engine
            .detect(image, self.width, self.height, &mut self.detections)?;

        let (width, height, min_confidence) = (self.width, self.height, self.min_confidence);
        results.extend(
            self.detections
                .iter()
                .filter(|d| d.confidence >= min_confidence)
                .filter_map(|d| d.to_rect(width, height)),
        );
        log::debug!(
            "{}: {} candidates, {} faces",
            self.engine.name(),
            self.detections.len(),
            results.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::image::PixelBuffer;
    use crate::shared::pixel::{BgrPixel, RgbPixel};
    use crate::shared::rect::Rect;

    /// Engine that echoes canned detections and records what it was given.
    struct ScriptedEngine {
        format: PixelFormat,
        output: Vec<RawDetection>,
        seen_formats: Vec<PixelFormat>,
        seen_first_bytes: Vec<Vec<u8>>,
    }

    impl ScriptedEngine {
        fn new(format: PixelFormat, output: Vec<RawDetection>) -> Self {
            Self {
                format,
                output,
                seen_formats: Vec::new(),
                seen_first_bytes: Vec::new(),
            }
        }
    }

    impl FaceEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn preferred_format(&self) -> PixelFormat {
            self.format
        }

        fn detect(
            &mut self,
            image: Image<'_>,
            _width: u32,
            _height: u32,
            detections: &mut Vec<RawDetection>,
        ) -> Result<(), BackendError> {
            self.seen_formats.push(image.format());
            let bpp = image.format().bytes_per_pixel();
            self.seen_first_bytes.push(image.as_bytes()[..bpp].to_vec());
            detections.extend_from_slice(&self.output);
            Ok(())
        }
    }

    struct FailingEngine;

    impl FaceEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }
        fn preferred_format(&self) -> PixelFormat {
            PixelFormat::Rgb
        }
        fn detect(
            &mut self,
            _: Image<'_>,
            _: u32,
            _: u32,
            _: &mut Vec<RawDetection>,
        ) -> Result<(), BackendError> {
            Err(BackendError::Inference("bad output shape".into()))
        }
    }

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    #[test]
    fn test_identity_comes_from_engine() {
        let backend = EngineBackend::new(ScriptedEngine::new(PixelFormat::Bgr, vec![]), 8, 4, 0.5);
        assert_eq!(backend.name(), "scripted");
        assert_eq!(backend.preferred_format(), PixelFormat::Bgr);
        assert_eq!((backend.width(), backend.height()), (8, 4));
    }

    #[test]
    fn test_converts_to_engine_format() {
        let engine = ScriptedEngine::new(PixelFormat::Rgb, vec![]);
        let mut backend = EngineBackend::new(engine, 2, 1, 0.5);
        let pixels = [BgrPixel::new(3, 2, 1), BgrPixel::new(0, 0, 0)];

        backend.process(Image::Bgr(&pixels), &mut Vec::new()).unwrap();

        assert_eq!(backend.engine.seen_formats, vec![PixelFormat::Rgb]);
        assert_eq!(backend.engine.seen_first_bytes, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_preferred_format_reaches_engine_unchanged() {
        let engine = ScriptedEngine::new(PixelFormat::Rgb, vec![]);
        let mut backend = EngineBackend::new(engine, 1, 1, 0.5);
        let pixels = [RgbPixel::new(9, 8, 7)];

        backend.process(Image::Rgb(&pixels), &mut Vec::new()).unwrap();

        assert_eq!(backend.engine.seen_first_bytes, vec![vec![9, 8, 7]]);
    }

    #[test]
    fn test_filters_by_confidence_inclusive() {
        let engine = ScriptedEngine::new(
            PixelFormat::Rgb,
            vec![
                det(0.0, 0.0, 10.0, 10.0, 0.49),
                det(10.0, 10.0, 20.0, 20.0, 0.5),
                det(20.0, 20.0, 40.0, 40.0, 0.97),
            ],
        );
        let mut backend = EngineBackend::new(engine, 64, 64, 0.5);
        let image = PixelBuffer::new(PixelFormat::Rgb, 64 * 64);
        let mut results = Vec::new();

        backend.process(image.as_image(), &mut results).unwrap();

        assert_eq!(results, vec![Rect::new(10, 10, 10, 10), Rect::new(20, 20, 20, 20)]);
    }

    #[test]
    fn test_clamps_and_drops_out_of_frame() {
        let engine = ScriptedEngine::new(
            PixelFormat::Grayscale,
            vec![det(-5.0, 50.0, 20.0, 80.0, 0.9), det(70.0, 70.0, 90.0, 90.0, 0.9)],
        );
        let mut backend = EngineBackend::new(engine, 64, 64, 0.5);
        let image = PixelBuffer::new(PixelFormat::Grayscale, 64 * 64);
        let mut results = Vec::new();

        backend.process(image.as_image(), &mut results).unwrap();

        assert_eq!(results, vec![Rect::new(0, 50, 20, 14)]);
    }

    #[test]
    fn test_results_replaced_each_call() {
        let engine = ScriptedEngine::new(PixelFormat::Rgb, vec![det(0.0, 0.0, 4.0, 4.0, 0.9)]);
        let mut backend = EngineBackend::new(engine, 8, 8, 0.5);
        let image = PixelBuffer::new(PixelFormat::Rgb, 64);
        let mut results = vec![Rect::new(7, 7, 1, 1)];

        backend.process(image.as_image(), &mut results).unwrap();
        backend.process(image.as_image(), &mut results).unwrap();

        assert_eq!(results, vec![Rect::new(0, 0, 4, 4)]);
    }

    #[test]
    fn test_engine_error_propagates_and_clears_results() {
        let mut backend = EngineBackend::new(FailingEngine, 2, 2, 0.5);
        let image = PixelBuffer::new(PixelFormat::Rgba, 4);
        let mut results = vec![Rect::new(1, 1, 1, 1)];

        let err = backend.process(image.as_image(), &mut results).unwrap_err();

        assert!(matches!(err, BackendError::Inference(_)));
        assert!(results.is_empty());
    }
}
