use std::collections::VecDeque;

use crate::shared::constants::DEFAULT_WINDOW_SIZE;
use crate::shared::rect::{Rect, RectList};

pub const MIN_WINDOW_SIZE: usize = 3;

/// Savitzky–Golay smoothing of one rectangle track.
///
/// Keeps the last `N` rectangles and reports the quadratic-fit value at the
/// window center, so the output trails the input by `N / 2` frames.
pub struct RectSmoother {
    window_size: usize,
    coefficients: Vec<f64>,
    window: VecDeque<Rect>,
}

impl RectSmoother {
    /// # Panics
    ///
    /// Panics if `window_size` is below 3 or even.
    pub fn new(window_size: usize) -> Self {
        let mut smoother = Self {
            window_size: 0,
            coefficients: Vec::new(),
            window: VecDeque::new(),
        };
        smoother.set_window_size(window_size);
        smoother
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Changes the window length and empties the window.
    ///
    /// Resizing discards the smoothing history; the next [`add_rect`]
    /// refills the window from that single rect.
    ///
    /// [`add_rect`]: RectSmoother::add_rect
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is below 3 or even.
    pub fn set_window_size(&mut self, window_size: usize) {
        check_window_size(window_size);
        self.window_size = window_size;
        self.coefficients = quadratic_coefficients(window_size);
        self.window.clear();
    }

    /// Pushes `rect` and evicts the oldest entry.
    ///
    /// An empty window is filled with copies of `rect` instead.
    pub fn add_rect(&mut self, rect: Rect) {
        if self.window.is_empty() {
            self.window.extend(std::iter::repeat(rect).take(self.window_size));
            return;
        }
        self.window.push_back(rect);
        self.window.pop_front();
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() == self.window_size
    }

    /// # Panics
    ///
    /// Panics if no rectangle was added since construction or the last reset.
    pub fn average(&self) -> Rect {
        assert!(self.is_ready(), "average requested before the window was filled");

        let mut sum = [0.0f64; 4];
        for (c, r) in self.coefficients.iter().zip(&self.window) {
            sum[0] += c * r.x as f64;
            sum[1] += c * r.y as f64;
            sum[2] += c * r.width as f64;
            sum[3] += c * r.height as f64;
        }

        let [x, y, width, height] = sum.map(|v| v.round().max(0.0) as u32);
        Rect::new(x, y, width, height)
    }
}

impl Default for RectSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

fn check_window_size(window_size: usize) {
    assert!(
        window_size >= MIN_WINDOW_SIZE && window_size % 2 == 1,
        "window size must be odd and at least {MIN_WINDOW_SIZE}, got {window_size}"
    );
}

/// Quadratic Savitzky–Golay smoothing weights for offsets `-m..=m`.
fn quadratic_coefficients(window_size: usize) -> Vec<f64> {
    let m = (window_size / 2) as f64;
    let denominator = (2.0 * m + 3.0) * (2.0 * m + 1.0) * (2.0 * m - 1.0);
    let half = (window_size / 2) as i64;
    (-half..=half)
        .map(|i| {
            let i = i as f64;
            (3.0 * (3.0 * m * m + 3.0 * m - 1.0) - 15.0 * i * i) / denominator
        })
        .collect()
}

/// One smoother per detection slot.
///
/// Slot `k` smooths the `k`-th rectangle of each frame. Slots are created on
/// demand and a slot with no rectangle in a frame is reset, so a face that
/// reappears starts from a fresh window.
pub struct SlotSmoothers {
    window_size: usize,
    slots: Vec<RectSmoother>,
}

impl SlotSmoothers {
    /// # Panics
    ///
    /// Panics if `window_size` is below 3 or even.
    pub fn new(window_size: usize) -> Self {
        check_window_size(window_size);
        Self {
            window_size,
            slots: Vec::new(),
        }
    }

    pub fn smooth(&mut self, rects: &[Rect]) -> RectList {
        while self.slots.len() < rects.len() {
            self.slots.push(RectSmoother::new(self.window_size));
        }

        for slot in &mut self.slots[rects.len()..] {
            slot.reset();
        }

        self.slots
            .iter_mut()
            .zip(rects)
            .map(|(slot, rect)| {
                slot.add_rect(*rect);
                slot.average()
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(RectSmoother::reset);
    }
}

impl Default for SlotSmoothers {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn rect_x(x: u32) -> Rect {
        Rect::new(x, 10, 40, 40)
    }

    // ── Coefficients ──

    #[test]
    fn test_coefficients_window_5() {
        let smoother = RectSmoother::new(5);
        let expected = [-3.0 / 35.0, 12.0 / 35.0, 17.0 / 35.0, 12.0 / 35.0, -3.0 / 35.0];
        for (c, e) in smoother.coefficients().iter().zip(expected) {
            assert_relative_eq!(*c, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coefficients_window_3_pass_center_through() {
        let smoother = RectSmoother::new(3);
        assert_relative_eq!(smoother.coefficients()[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(smoother.coefficients()[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(smoother.coefficients()[2], 0.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(3)]
    #[case(5)]
    #[case(7)]
    #[case(9)]
    #[case(21)]
    fn test_coefficients_sum_to_one_and_are_symmetric(#[case] n: usize) {
        let smoother = RectSmoother::new(n);
        let c = smoother.coefficients();
        assert_eq!(c.len(), n);
        assert_relative_eq!(c.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        for i in 0..n / 2 {
            assert_relative_eq!(c[i], c[n - 1 - i], epsilon = 1e-12);
        }
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    #[case(6)]
    #[should_panic(expected = "window size must be odd")]
    fn test_invalid_window_size_panics(#[case] n: usize) {
        RectSmoother::new(n);
    }

    #[test]
    #[should_panic(expected = "window size must be odd")]
    fn test_set_invalid_window_size_panics() {
        RectSmoother::default().set_window_size(8);
    }

    // ── Window ──

    #[test]
    fn test_first_rect_fills_window() {
        let mut smoother = RectSmoother::new(5);
        smoother.add_rect(rect_x(100));
        assert!(smoother.is_ready());
        assert_eq!(smoother.average(), rect_x(100));
    }

    #[test]
    #[should_panic(expected = "before the window was filled")]
    fn test_average_on_empty_window_panics() {
        RectSmoother::new(5).average();
    }

    #[test]
    #[should_panic(expected = "before the window was filled")]
    fn test_average_after_reset_panics() {
        let mut smoother = RectSmoother::new(3);
        smoother.add_rect(rect_x(5));
        smoother.reset();
        smoother.average();
    }

    #[test]
    fn test_reset_then_single_rect_is_reported() {
        let mut smoother = RectSmoother::new(5);
        let first = Rect::new(40, 30, 20, 20);
        for _ in 0..5 {
            smoother.add_rect(first);
        }
        assert_eq!(smoother.average(), first);

        smoother.reset();
        let second = Rect::new(200, 150, 60, 80);
        smoother.add_rect(second);
        assert_eq!(smoother.average(), second);
    }

    #[test]
    fn test_constant_input_is_fixed_point() {
        let mut smoother = RectSmoother::new(7);
        let rect = Rect::new(320, 240, 64, 96);
        for _ in 0..20 {
            smoother.add_rect(rect);
            assert_eq!(smoother.average(), rect);
        }
    }

    #[test]
    fn test_window_3_reports_middle_entry() {
        let mut smoother = RectSmoother::new(3);
        smoother.add_rect(rect_x(10));
        smoother.add_rect(rect_x(20));
        smoother.add_rect(rect_x(30));
        assert_eq!(smoother.average(), rect_x(20));
        smoother.add_rect(rect_x(99));
        assert_eq!(smoother.average(), rect_x(30));
    }

    #[test]
    fn test_linear_motion_lags_by_half_window() {
        let mut smoother = RectSmoother::new(5);
        for x in [0, 10, 20, 30, 40] {
            smoother.add_rect(rect_x(x));
        }
        assert_eq!(smoother.average(), rect_x(20));
        smoother.add_rect(rect_x(50));
        assert_eq!(smoother.average(), rect_x(30));
    }

    #[test]
    fn test_jitter_is_damped() {
        let mut smoother = RectSmoother::new(5);
        for x in [100, 100, 100, 100, 100, 130, 100] {
            smoother.add_rect(rect_x(x));
        }
        // The spike now sits at the window's second-to-last position.
        let x = smoother.average().x;
        assert!((100..=112).contains(&x), "x = {x}");
    }

    #[test]
    fn test_negative_sum_clamps_to_zero() {
        let mut smoother = RectSmoother::new(5);
        smoother.add_rect(Rect::new(0, 0, 0, 0));
        smoother.add_rect(Rect::new(0, 0, 0, 0));
        smoother.add_rect(Rect::new(0, 0, 0, 0));
        smoother.add_rect(Rect::new(0, 0, 0, 0));
        smoother.add_rect(Rect::new(100, 100, 100, 100));
        assert_eq!(smoother.average(), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn test_set_window_size_restarts_window() {
        let mut smoother = RectSmoother::new(5);
        for x in [0, 10, 20, 30, 40] {
            smoother.add_rect(rect_x(x));
        }
        smoother.set_window_size(3);
        assert!(!smoother.is_ready());
        assert_eq!(smoother.window_size(), 3);

        smoother.add_rect(rect_x(50));
        assert!(smoother.is_ready());
        assert_eq!(smoother.average(), rect_x(50));
    }

    // ── Slots ──

    #[test]
    fn test_slots_smooth_each_index_independently() {
        let mut slots = SlotSmoothers::new(3);
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(200, 200, 30, 30);

        assert_eq!(slots.smooth(&[a, b]), vec![a, b]);
        assert_eq!(slots.smooth(&[a, b]), vec![a, b]);
    }

    #[test]
    fn test_slots_reset_when_face_disappears() {
        let mut slots = SlotSmoothers::new(3);
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(100, 100, 10, 10);
        let c = Rect::new(400, 400, 10, 10);

        slots.smooth(&[a, b]);
        slots.smooth(&[a]);
        // Slot 1 restarts from `c` instead of blending with `b`.
        assert_eq!(slots.smooth(&[a, c]), vec![a, c]);
    }

    #[test]
    fn test_slots_empty_frame() {
        let mut slots = SlotSmoothers::default();
        assert!(slots.smooth(&[]).is_empty());
    }

    #[test]
    #[should_panic(expected = "window size must be odd")]
    fn test_slots_validate_window_size() {
        SlotSmoothers::new(4);
    }
}
