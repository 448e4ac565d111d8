//! Barrel Climb - a Donkey-Kong-style platformer core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (physics, entities, collisions, levels)
//! - `ai`: A* grid navigation and the tabular Q-learning agent
//! - `persistence`: Q-model and save-game storage
//! - `leaderboard`: Local best-score table
//! - `config`: Immutable game configuration

pub mod ai;
pub mod config;
pub mod leaderboard;
pub mod persistence;
pub mod sim;

pub use config::{GameConfig, PlayerColor};
pub use leaderboard::Leaderboard;

/// Gameplay constants
pub mod consts {
    /// How far below a platform's top an entity's bottom may sink and still land on it
    pub const LANDING_TOLERANCE: f32 = 15.0;
    /// Terminal fall speed. Kept equal to the landing tolerance so a falling
    /// entity can never step over a platform top in one frame.
    pub const MAX_FALL_SPEED: f32 = 15.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_JUMP_POWER: f32 = -15.0;
    pub const PLAYER_GRAVITY: f32 = 0.8;
    pub const PLAYER_CLIMB_SPEED: f32 = 3.0;
    pub const PLAYER_START_LIVES: u32 = 3;
    /// Respawn point after losing a life or starting a level
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 500.0);

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 25.0;
    pub const ENEMY_SPEED: f32 = 2.0;
    pub const ENEMY_GRAVITY: f32 = 0.5;
    pub const ENEMY_JUMP_POWER: f32 = -10.0;
    /// Jump impulse used when the learned policy picks the jump action
    pub const ENEMY_LEARNED_JUMP_POWER: f32 = -8.0;

    /// Projectile (banana) defaults
    pub const PROJECTILE_SIZE: f32 = 15.0;
    pub const PROJECTILE_SPEED: f32 = 8.0;
    pub const PROJECTILE_GRAVITY: f32 = 0.3;
    pub const EXPLOSION_FRAMES: u32 = 30;
    pub const EXPLOSION_SIZE: f32 = 60.0;
    pub const EXPLOSION_KILL_POINTS: u64 = 100;

    /// Collectibles
    pub const COLLECTIBLE_SIZE: f32 = 15.0;
    pub const COLLECTIBLE_VALUES: [u64; 3] = [10, 20, 50];
    pub const COLLECTIBLES_PER_LEVEL: u32 = 5;
    pub const MAX_LIVE_COLLECTIBLES: usize = 8;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: glam::Vec2, b: glam::Vec2) -> f32 {
    (a - b).length()
}
