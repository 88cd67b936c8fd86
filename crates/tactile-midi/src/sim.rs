//! Simulated sensor input
//!
//! Deterministic frame generators for running without hardware. Both count
//! frames instead of reading a clock, so the caller's frame interval sets the
//! tempo.

use crate::error::Result;
use crate::frame::{SensorFrame, SensorLayout};

/// One touch stepping through every sample of the matrix in order
#[derive(Debug, Clone)]
pub struct WalkingTouch {
    layout: SensorLayout,
    /// Frames each position is held for
    hold: u32,
    index: usize,
    held: u32,
}

impl WalkingTouch {
    pub fn new(layout: SensorLayout, hold: u32) -> Self {
        Self {
            layout,
            hold: hold.max(1),
            index: 0,
            held: 0,
        }
    }
}

impl Iterator for WalkingTouch {
    type Item = Result<SensorFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.layout.is_empty() {
            return None;
        }
        let mut frame = SensorFrame::idle(self.layout);
        frame.press(self.index, 0);

        self.held += 1;
        if self.held >= self.hold {
            self.held = 0;
            self.index = (self.index + 1) % self.layout.len();
        }
        Some(Ok(frame))
    }
}

/// A steady touch plus a second one that blinks on and off
///
/// The steady touch starts two thirds into the matrix and the blinking one a
/// third in. Every `flash_limit` frames they swap places and the blinking
/// touch toggles between shown and hidden, which exercises id reuse and
/// note retriggering.
#[derive(Debug, Clone)]
pub struct FlashingTouch {
    layout: SensorLayout,
    flash_limit: u32,
    steady_index: usize,
    flashing_index: usize,
    flash_count: u32,
    flashing_active: bool,
}

impl FlashingTouch {
    pub fn new(layout: SensorLayout, flash_limit: u32) -> Self {
        let len = layout.len();
        Self {
            layout,
            flash_limit: flash_limit.max(1),
            steady_index: len * 2 / 3,
            flashing_index: len / 3,
            flash_count: 0,
            flashing_active: true,
        }
    }
}

impl Iterator for FlashingTouch {
    type Item = Result<SensorFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.layout.is_empty() {
            return None;
        }
        let mut frame = SensorFrame::idle(self.layout);
        frame.press(self.steady_index, 0);
        if self.flashing_active {
            frame.press(self.flashing_index, 0);
        }

        self.flash_count += 1;
        if self.flash_count >= self.flash_limit {
            std::mem::swap(&mut self.steady_index, &mut self.flashing_index);
            self.flash_count = 0;
            self.flashing_active = !self.flashing_active;
        }
        Some(Ok(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(frame: &SensorFrame) -> Vec<usize> {
        frame
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == 0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_walking_touch_holds_then_moves() {
        let mut source = WalkingTouch::new(SensorLayout::default(), 2);
        let positions: Vec<Vec<usize>> = (0..5)
            .map(|_| pressed(&source.next().unwrap().unwrap()))
            .collect();
        assert_eq!(positions, vec![vec![0], vec![0], vec![1], vec![1], vec![2]]);
    }

    #[test]
    fn test_walking_touch_wraps() {
        let layout = SensorLayout {
            rows: 1,
            cols: 2,
            ..SensorLayout::default()
        };
        let mut source = WalkingTouch::new(layout, 1);
        let positions: Vec<Vec<usize>> = (0..3)
            .map(|_| pressed(&source.next().unwrap().unwrap()))
            .collect();
        assert_eq!(positions, vec![vec![0], vec![1], vec![0]]);
    }

    #[test]
    fn test_flashing_touch_swaps() {
        let mut source = FlashingTouch::new(SensorLayout::default(), 2);
        let frames: Vec<Vec<usize>> = (0..6)
            .map(|_| pressed(&source.next().unwrap().unwrap()))
            .collect();
        assert_eq!(frames[0], vec![66, 133]);
        assert_eq!(frames[1], vec![66, 133]);
        // Swapped and blinking touch hidden
        assert_eq!(frames[2], vec![66]);
        assert_eq!(frames[3], vec![66]);
        // Swapped back and shown again
        assert_eq!(frames[4], vec![66, 133]);
    }

    #[test]
    fn test_empty_layout_ends() {
        let layout = SensorLayout {
            rows: 0,
            ..SensorLayout::default()
        };
        assert!(WalkingTouch::new(layout, 1).next().is_none());
        assert!(FlashingTouch::new(layout, 1).next().is_none());
    }
}
