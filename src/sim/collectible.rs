//! Point pickups

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::COLLECTIBLE_SIZE;

/// Bob amplitude in pixels
pub const BOB_AMPLITUDE: f32 = 5.0;
/// Bob phase advance per frame (radians)
pub const BOB_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub rect: Rect,
    pub value: u64,
    pub collected: bool,
    base_y: f32,
    phase: f32,
}

impl Collectible {
    pub fn new(x: f32, y: f32, value: u64) -> Self {
        Self {
            rect: Rect::new(x, y, COLLECTIBLE_SIZE, COLLECTIBLE_SIZE),
            value,
            collected: false,
            base_y: y,
            phase: 0.0,
        }
    }

    /// Bob around the spawn line
    pub fn update(&mut self) {
        self.phase += BOB_SPEED;
        self.rect.y = self.base_y + (BOB_AMPLITUDE * self.phase.sin()).trunc();
    }

    /// Mark as taken and return the point value
    pub fn collect(&mut self) -> u64 {
        self.collected = true;
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bobbing_stays_within_amplitude() {
        let mut c = Collectible::new(200.0, 430.0, 20);
        let mut seen_offset = false;
        for _ in 0..200 {
            c.update();
            let offset = c.rect.y - 430.0;
            assert!(offset.abs() <= BOB_AMPLITUDE);
            assert_eq!(offset, offset.trunc());
            seen_offset |= offset != 0.0;
        }
        assert!(seen_offset);
        assert_eq!(c.rect.x, 200.0);
    }

    #[test]
    fn test_collect() {
        let mut c = Collectible::new(0.0, 0.0, 50);
        assert_eq!(c.collect(), 50);
        assert!(c.collected);
    }
}
