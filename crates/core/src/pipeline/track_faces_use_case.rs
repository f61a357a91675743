use serde::Serialize;
use thiserror::Error;

use crate::detection::domain::face_detector::{DetectorError, FaceDetector};
use crate::detection::domain::rect_smoother::SlotSmoothers;
use crate::shared::fps_counter::FpsCounter;
use crate::shared::frame::Frame;
use crate::shared::rect::RectList;
use crate::video::domain::frame_source::FrameSourceError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] FrameSourceError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error("frame is {width}x{height}, detector expects {expected_width}x{expected_height}")]
    FrameSize {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Faces found in one frame, in full-resolution coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameResult {
    pub index: usize,
    pub raw: RectList,
    pub smoothed: RectList,
    pub fps: u32,
}

/// Detects and smooths faces frame by frame.
///
/// Frames may be downscaled before detection; `scale` maps the rectangles
/// back to the original resolution.
pub struct TrackFacesUseCase {
    detector: FaceDetector,
    smoothers: SlotSmoothers,
    fps: FpsCounter,
    scale: u32,
    raw: RectList,
}

impl TrackFacesUseCase {
    /// # Panics
    ///
    /// Panics if `scale` is zero or `window_size` is not an odd number of at
    /// least 3.
    pub fn new(detector: FaceDetector, window_size: usize, scale: u32) -> Self {
        assert!(scale >= 1, "scale must be at least 1");
        Self {
            detector,
            smoothers: SlotSmoothers::new(window_size),
            fps: FpsCounter::default(),
            scale,
            raw: RectList::new(),
        }
    }

    pub fn detector(&self) -> &FaceDetector {
        &self.detector
    }

    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameResult, PipelineError> {
        let expected = (self.detector.width(), self.detector.height());
        if (frame.width(), frame.height()) != expected {
            return Err(PipelineError::FrameSize {
                width: frame.width(),
                height: frame.height(),
                expected_width: expected.0,
                expected_height: expected.1,
            });
        }

        self.detector.process(frame.image(), &mut self.raw)?;
        let smoothed = self.smoothers.smooth(&self.raw);
        let fps = self.fps.update();
        log::debug!("frame {}: {} faces", frame.index(), self.raw.len());

        let scale = self.scale;
        Ok(FrameResult {
            index: frame.index(),
            raw: self.raw.iter().map(|r| r.scaled(scale)).collect(),
            smoothed: smoothed.iter().map(|r| r.scaled(scale)).collect(),
            fps,
        })
    }

    /// Forgets smoothing history and frame timing, e.g. when the input restarts.
    pub fn reset(&mut self) {
        self.smoothers.reset();
        self.fps.reset();
    }
}
