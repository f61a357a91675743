use crate::shared::image::Image;
use crate::shared::pixel::PixelFormat;
use crate::shared::rect::Rect;

use super::backend::BackendError;

/// A face candidate as reported by an engine, in frame pixel coordinates.
///
/// Corners may lie outside the frame; they are clamped when converted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDetection {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: f64,
}

impl RawDetection {
    /// Clamps to the frame and truncates to whole pixels.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn to_rect(&self, width: u32, height: u32) -> Option<Rect> {
        let x1 = self.x1.clamp(0.0, width as f64);
        let y1 = self.y1.clamp(0.0, height as f64);
        let x2 = self.x2.clamp(0.0, width as f64);
        let y2 = self.y2.clamp(0.0, height as f64);

        let x = x1 as u32;
        let y = y1 as u32;
        let w = (x2 as u32).saturating_sub(x);
        let h = (y2 as u32).saturating_sub(y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Rect::new(x, y, w, h))
    }
}

/// An opaque external detection routine.
///
/// The engine only ever sees images in its preferred format; conversion and
/// confidence filtering are handled by the backend wrapping it.
pub trait FaceEngine: Send {
    fn name(&self) -> &str;

    fn preferred_format(&self) -> PixelFormat;

    fn detect(
        &mut self,
        image: Image<'_>,
        width: u32,
        height: u32,
        detections: &mut Vec<RawDetection>,
    ) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f64, y1: f64, x2: f64, y2: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_to_rect_inside_frame() {
        let r = det(10.4, 20.9, 50.0, 80.0).to_rect(100, 100).unwrap();
        assert_eq!(r, Rect::new(10, 20, 40, 60));
    }

    #[test]
    fn test_to_rect_clamps_to_frame() {
        let r = det(-20.0, -5.0, 130.0, 40.0).to_rect(100, 100).unwrap();
        assert_eq!(r, Rect::new(0, 0, 100, 40));
    }

    #[test]
    fn test_to_rect_outside_frame_is_none() {
        assert!(det(120.0, 10.0, 150.0, 40.0).to_rect(100, 100).is_none());
        assert!(det(10.0, -40.0, 40.0, -1.0).to_rect(100, 100).is_none());
    }

    #[test]
    fn test_to_rect_inverted_box_is_none() {
        assert!(det(50.0, 50.0, 40.0, 60.0).to_rect(100, 100).is_none());
    }
}
