//! Shared rigid-body integration for player, enemies and projectiles
//!
//! Order inside one step is fixed: gravity (caller-controlled), horizontal
//! integration and bounds, vertical integration, platform landing, ground
//! fallback, world-exit detection.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, landing_allowed};
use crate::config::GameConfig;
use crate::consts::MAX_FALL_SPEED;

/// Incoming fall speed above which a bouncy body rebounds on landing
pub const BOUNCE_THRESHOLD: f32 = 12.0;

/// Read-only view of the level that bodies collide against
#[derive(Debug, Clone, Copy)]
pub struct PhysicsWorld<'a> {
    pub width: f32,
    pub height: f32,
    /// Fallback ground line (None = bottomless world)
    pub ground_y: Option<f32>,
    pub platforms: &'a [Rect],
}

impl<'a> PhysicsWorld<'a> {
    pub fn new(config: &GameConfig, platforms: &'a [Rect]) -> Self {
        Self {
            width: config.window_width,
            height: config.window_height,
            ground_y: config.ground_y(),
            platforms,
        }
    }
}

/// What happens when a body crosses the left/right edge of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalBounds {
    /// Hard clamp at the edge (player)
    Clamp,
    /// Clamp and report the wall so the owner can turn around (monsters)
    Reflect,
    /// No clamping; report once the body is fully off-screen (barrels)
    Exit,
}

/// World edge hit during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSide {
    Left,
    Right,
}

/// Result of a single integration step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    /// Landed on a platform or the ground this step
    pub landed: bool,
    /// Edge that stopped the body (Clamp/Reflect only)
    pub wall: Option<WallSide>,
    /// Fully outside the horizontal extent (Exit only)
    pub left_world: bool,
    /// Fully below the bottom of the world
    pub fell_out: bool,
}

/// Position, velocity and grounding state shared by every moving entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub rect: Rect,
    pub vel: Vec2,
    pub gravity: f32,
    pub on_ground: bool,
    /// Upward rebound speed applied when landing faster than [`BOUNCE_THRESHOLD`]
    #[serde(default)]
    pub bounce: f32,
}

impl Body {
    pub fn new(rect: Rect, gravity: f32) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
            gravity,
            on_ground: false,
            bounce: 0.0,
        }
    }

    /// Accelerate downward, capped at the terminal fall speed
    pub fn apply_gravity(&mut self) {
        self.vel.y = (self.vel.y + self.gravity).min(MAX_FALL_SPEED);
    }

    /// Launch upward if standing on something. Returns whether the jump happened.
    pub fn jump(&mut self, power: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vel.y = power;
        self.on_ground = false;
        true
    }

    /// Integrate velocity and resolve against the world. Gravity is not applied here.
    pub fn integrate(&mut self, world: &PhysicsWorld<'_>, bounds: HorizontalBounds) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        self.rect.x += self.vel.x;
        match bounds {
            HorizontalBounds::Clamp | HorizontalBounds::Reflect => {
                if self.rect.left() < 0.0 {
                    self.rect.set_left(0.0);
                    outcome.wall = Some(WallSide::Left);
                } else if self.rect.right() > world.width {
                    self.rect.set_right(world.width);
                    outcome.wall = Some(WallSide::Right);
                }
            }
            HorizontalBounds::Exit => {
                outcome.left_world = self.rect.right() < 0.0 || self.rect.left() > world.width;
            }
        }

        self.rect.y += self.vel.y;

        self.on_ground = false;
        let incoming = self.vel.y;
        for platform in world.platforms {
            if landing_allowed(&self.rect, self.vel.y, platform) {
                self.rect.set_bottom(platform.top());
                self.land(incoming);
                outcome.landed = true;
                break;
            }
        }

        if !outcome.landed {
            if let Some(ground) = world.ground_y {
                if self.rect.bottom() >= ground {
                    self.rect.set_bottom(ground);
                    self.land(incoming);
                    outcome.landed = true;
                }
            }
        }

        outcome.fell_out = self.rect.top() >= world.height;
        outcome
    }

    fn land(&mut self, incoming_vy: f32) {
        self.on_ground = true;
        self.vel.y = if self.bounce > 0.0 && incoming_vy > BOUNCE_THRESHOLD {
            -self.bounce
        } else {
            0.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bottomless(platforms: &[Rect]) -> PhysicsWorld<'_> {
        PhysicsWorld {
            width: 800.0,
            height: 600.0,
            ground_y: None,
            platforms,
        }
    }

    #[test]
    fn test_free_fall_accelerates_until_terminal() {
        let world = bottomless(&[]);
        let mut body = Body::new(Rect::new(100.0, 0.0, 25.0, 25.0), 0.5);
        let mut last_vy = body.vel.y;
        let mut last_y = body.rect.y;
        for _ in 0..200 {
            body.apply_gravity();
            body.integrate(&world, HorizontalBounds::Clamp);
            if last_vy < MAX_FALL_SPEED {
                assert!(body.vel.y > last_vy);
            } else {
                assert_eq!(body.vel.y, MAX_FALL_SPEED);
            }
            assert!(body.rect.y > last_y);
            last_vy = body.vel.y;
            last_y = body.rect.y;
        }
    }

    #[test]
    fn test_landing_zeroes_velocity() {
        let platforms = [Rect::new(100.0, 450.0, 600.0, 20.0)];
        let world = bottomless(&platforms);
        let mut body = Body::new(Rect::new(200.0, 0.0, 25.0, 25.0), 0.5);
        body.rect.set_bottom(453.0);
        body.vel.y = 1.0;

        body.apply_gravity();
        let outcome = body.integrate(&world, HorizontalBounds::Clamp);

        assert!(outcome.landed);
        assert!(body.on_ground);
        assert_eq!(body.vel.y, 0.0);
        assert_eq!(body.rect.bottom(), 450.0);
    }

    #[test]
    fn test_terminal_speed_cannot_tunnel_through_platform() {
        let platforms = [Rect::new(0.0, 300.0, 800.0, 20.0)];
        let world = bottomless(&platforms);
        let mut body = Body::new(Rect::new(200.0, 0.0, 25.0, 25.0), 0.5);
        body.vel.y = MAX_FALL_SPEED;
        for _ in 0..100 {
            body.apply_gravity();
            body.integrate(&world, HorizontalBounds::Clamp);
            if body.on_ground {
                break;
            }
        }
        assert!(body.on_ground);
        assert_eq!(body.rect.bottom(), 300.0);
    }

    #[test]
    fn test_ground_fallback() {
        let world = PhysicsWorld {
            ground_y: Some(550.0),
            ..bottomless(&[])
        };
        let mut body = Body::new(Rect::new(200.0, 530.0, 25.0, 25.0), 0.5);
        body.vel.y = 4.0;
        let outcome = body.integrate(&world, HorizontalBounds::Clamp);
        assert!(outcome.landed);
        assert_eq!(body.rect.bottom(), 550.0);
    }

    #[test]
    fn test_bounds_policies() {
        let world = bottomless(&[]);

        let mut clamped = Body::new(Rect::new(2.0, 100.0, 30.0, 40.0), 0.0);
        clamped.vel.x = -5.0;
        let outcome = clamped.integrate(&world, HorizontalBounds::Reflect);
        assert_eq!(clamped.rect.left(), 0.0);
        assert_eq!(outcome.wall, Some(WallSide::Left));

        let mut rolling = Body::new(Rect::new(-24.0, 100.0, 25.0, 25.0), 0.0);
        rolling.vel.x = -2.0;
        let outcome = rolling.integrate(&world, HorizontalBounds::Exit);
        assert!(outcome.left_world);
        assert!(rolling.rect.right() < 0.0);
    }

    #[test]
    fn test_bouncy_body_rebounds_on_hard_landing() {
        let world = PhysicsWorld {
            ground_y: Some(550.0),
            ..bottomless(&[])
        };
        let mut body = Body::new(Rect::new(200.0, 520.0, 25.0, 25.0), 0.5);
        body.bounce = 2.0;
        body.vel.y = 14.0;
        body.integrate(&world, HorizontalBounds::Clamp);
        assert!(body.on_ground);
        assert_eq!(body.vel.y, -2.0);
    }

    #[test]
    fn test_fell_out_below_world() {
        let world = bottomless(&[]);
        let mut body = Body::new(Rect::new(200.0, 590.0, 25.0, 25.0), 0.5);
        body.vel.y = 12.0;
        assert!(body.integrate(&world, HorizontalBounds::Clamp).fell_out);
    }
}
