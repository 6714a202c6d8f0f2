//! Whole-second countdown fed by frame deltas

use serde::{Deserialize, Serialize};

/// Mission countdown
///
/// Frame time accumulates until a full second has passed; each whole
/// second decrements `remaining` once. Bonuses never push it past `total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    total: u32,
    remaining: u32,
    #[serde(skip)]
    accumulator: f32,
}

impl Countdown {
    pub fn new(total: u32) -> Self {
        Self { total, remaining: total, accumulator: 0.0 }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Accumulate `dt` seconds and return the value after each whole
    /// second that elapsed, in order. Stops at zero.
    pub fn advance(&mut self, dt: f32) -> Vec<u32> {
        let mut ticks = Vec::new();
        if self.is_expired() || dt <= 0.0 {
            return ticks;
        }
        self.accumulator += dt;
        while self.accumulator >= 1.0 && self.remaining > 0 {
            self.accumulator -= 1.0;
            self.remaining -= 1;
            ticks.push(self.remaining);
        }
        if self.is_expired() {
            self.accumulator = 0.0;
        }
        ticks
    }

    /// Add bonus seconds, clamped to the starting total
    pub fn add_bonus(&mut self, seconds: u32) {
        self.remaining = self.remaining.saturating_add(seconds).min(self.total);
    }

    pub fn set_remaining(&mut self, seconds: u32) {
        self.remaining = seconds.min(self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_frames_accumulate() {
        let mut c = Countdown::new(10);
        for _ in 0..59 {
            assert!(c.advance(1.0 / 60.0).is_empty());
        }
        assert_eq!(c.advance(0.02), vec![9]);
        assert_eq!(c.remaining(), 9);
    }

    #[test]
    fn test_long_frame_emits_every_second() {
        let mut c = Countdown::new(5);
        assert_eq!(c.advance(3.5), vec![4, 3, 2]);
        assert_eq!(c.advance(10.0), vec![1, 0]);
        assert!(c.is_expired());
        assert!(c.advance(1.0).is_empty());
    }

    #[test]
    fn test_bonus_is_clamped_to_total() {
        let mut c = Countdown::new(40);
        c.advance(5.0);
        c.add_bonus(10);
        assert_eq!(c.remaining(), 40);

        c.set_remaining(12);
        c.add_bonus(10);
        assert_eq!(c.remaining(), 22);
    }
}
