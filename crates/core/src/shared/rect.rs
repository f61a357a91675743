use serde::Serialize;

/// Axis-aligned face bounding box in source-image pixel coordinates.
///
/// Produced fresh per detection call; carries no identity across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub type RectList = Vec<Rect>;

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Multiplies every component, mapping a rect found on a downscaled
    /// frame back to full resolution.
    pub fn scaled(&self, factor: u32) -> Rect {
        Rect {
            x: self.x.saturating_mul(factor),
            y: self.y.saturating_mul(factor),
            width: self.width.saturating_mul(factor),
            height: self.height.saturating_mul(factor),
        }
    }
}
