use std::collections::VecDeque;
use std::time::Instant;

use super::constants::FPS_WINDOW;

/// Frame rate over a rolling window of the most recent frame instants.
pub struct FpsCounter {
    times: VecDeque<Instant>,
    capacity: usize,
}

impl FpsCounter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            times: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Records a frame now and returns the rounded rate.
    pub fn update(&mut self) -> u32 {
        self.update_at(Instant::now())
    }

    /// Records a frame at `now`. Returns 0 until the window spans any time.
    pub fn update_at(&mut self, now: Instant) -> u32 {
        self.times.push_back(now);
        while self.times.len() > self.capacity {
            self.times.pop_front();
        }

        let (Some(first), Some(last)) = (self.times.front(), self.times.back()) else {
            return 0;
        };
        let elapsed = last.saturating_duration_since(*first).as_secs_f64();
        if elapsed == 0.0 {
            return 0;
        }

        let frames = (self.times.len() - 1) as f64;
        (frames / elapsed).round() as u32
    }

    pub fn reset(&mut self) {
        self.times.clear();
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(FPS_WINDOW)
    }
}
