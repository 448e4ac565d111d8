//! Thrown explosive bananas

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// Flight or explosion phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    /// Blast window with `remaining` frames left
    Exploding { remaining: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub rect: Rect,
    pub vel: Vec2,
    pub state: ProjectileState,
    /// False once the blast window has closed
    pub active: bool,
}

impl Projectile {
    /// Launch from `origin` (center) toward `target` at fixed speed.
    /// A zero-length throw starts at rest and simply drops.
    pub fn new(origin: Vec2, target: Vec2) -> Self {
        let vel = (target - origin).normalize_or_zero() * PROJECTILE_SPEED;
        Self {
            rect: Rect::centered(origin, PROJECTILE_SIZE, PROJECTILE_SIZE),
            vel,
            state: ProjectileState::Flying,
            active: true,
        }
    }

    pub fn exploded(&self) -> bool {
        matches!(self.state, ProjectileState::Exploding { .. })
    }

    /// Start the blast window. Has no effect once exploded.
    pub fn explode(&mut self) {
        if !self.exploded() {
            self.state = ProjectileState::Exploding {
                remaining: EXPLOSION_FRAMES,
            };
            self.vel = Vec2::ZERO;
        }
    }

    /// Area that kills enemies while the blast window is open
    pub fn explosion_rect(&self) -> Option<Rect> {
        match self.state {
            ProjectileState::Exploding { remaining } if remaining > 0 => Some(Rect::centered(
                self.rect.center(),
                EXPLOSION_SIZE,
                EXPLOSION_SIZE,
            )),
            _ => None,
        }
    }

    /// Advance one frame. Returns true on the frame the projectile explodes.
    pub fn update(&mut self, enemies: &[Rect], width: f32, height: f32) -> bool {
        if !self.active {
            return false;
        }

        match self.state {
            ProjectileState::Flying => {
                self.rect.x += self.vel.x;
                self.rect.y += self.vel.y;
                self.vel.y += PROJECTILE_GRAVITY;

                let hit = enemies.iter().any(|e| e.intersects(&self.rect));
                let out = self.rect.x < 0.0 || self.rect.x > width || self.rect.y > height;
                if hit || out {
                    self.explode();
                    return true;
                }
            }
            ProjectileState::Exploding { remaining } => {
                if remaining > 0 {
                    self.state = ProjectileState::Exploding {
                        remaining: remaining - 1,
                    };
                } else {
                    self.active = false;
                }
            }
        }
        false
    }
}
