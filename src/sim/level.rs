//! Level layouts
//!
//! Levels 1-3 are hand-authored. Every later level is generated from the
//! session RNG, getting harder up to level 13.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::geometry::Rect;
use crate::config::GameConfig;
use crate::consts::ENEMY_SPEED;

/// Number of authored levels
pub const AUTHORED_LEVELS: u32 = 3;
/// Difficulty stops growing after this many generated levels
pub const MAX_DIFFICULTY: u32 = 10;

const PLATFORM_THICKNESS: f32 = 20.0;
const LADDER_WIDTH: f32 = 20.0;
const LADDER_HEIGHT: f32 = 100.0;

/// Where and what to spawn when a level starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl EnemySpawn {
    const fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            speed: ENEMY_SPEED,
        }
    }
}

/// Static geometry for one level plus its initial enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub number: u32,
    /// Ground slab first (when the floor is enabled), then the rest
    platforms: Vec<Rect>,
    ladders: Vec<Rect>,
    pub spawns: Vec<EnemySpawn>,
    has_ground: bool,
}

impl Level {
    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn ladders(&self) -> &[Rect] {
        &self.ladders
    }

    /// Platforms other than the ground slab
    pub fn upper_platforms(&self) -> &[Rect] {
        if self.has_ground {
            &self.platforms[1..]
        } else {
            &self.platforms
        }
    }

    fn assemble(number: u32, config: &GameConfig, upper: &[Rect], ladders: &[Rect], spawns: Vec<EnemySpawn>) -> Self {
        let mut platforms = Vec::with_capacity(upper.len() + 1);
        let has_ground = match config.ground_y() {
            Some(ground) => {
                platforms.push(Rect::new(0.0, ground, config.window_width, config.ground_margin));
                true
            }
            None => false,
        };
        platforms.extend_from_slice(upper);
        Self {
            number,
            platforms,
            ladders: ladders.to_vec(),
            spawns,
            has_ground,
        }
    }
}

/// Tracks the current level number and builds layouts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelManager {
    current_level: u32,
}

impl Default for LevelManager {
    fn default() -> Self {
        Self { current_level: 1 }
    }
}

impl LevelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Jump to a level (e.g. when restoring a save). Level 0 is treated as 1.
    pub fn set_current_level(&mut self, level: u32) {
        self.current_level = level.max(1);
    }

    /// Levels never run out
    pub fn next_level(&mut self) -> u32 {
        self.current_level += 1;
        self.current_level
    }

    pub fn reset(&mut self) {
        self.current_level = 1;
    }

    /// Build level `n`. Authored layouts ignore `rng`.
    pub fn create_level<R: Rng + ?Sized>(&self, n: u32, config: &GameConfig, rng: &mut R) -> Level {
        let level = match n {
            0 | 1 => level_one(config),
            2 => level_two(config),
            3 => level_three(config),
            _ => random_level(n, config, rng),
        };
        log::info!(
            "Created level {} with {} platforms, {} ladders, {} enemies",
            level.number,
            level.platforms.len(),
            level.ladders.len(),
            level.spawns.len()
        );
        level
    }

    pub fn create_current<R: Rng + ?Sized>(&self, config: &GameConfig, rng: &mut R) -> Level {
        self.create_level(self.current_level, config, rng)
    }
}

fn level_one(config: &GameConfig) -> Level {
    let upper = [
        Rect::new(100.0, 450.0, 600.0, 20.0),
        Rect::new(100.0, 350.0, 600.0, 20.0),
        Rect::new(100.0, 250.0, 600.0, 20.0),
        Rect::new(100.0, 150.0, 600.0, 20.0),
    ];
    let ladders = [
        Rect::new(150.0, 450.0, 20.0, 100.0),
        Rect::new(650.0, 350.0, 20.0, 100.0),
        Rect::new(200.0, 250.0, 20.0, 100.0),
        Rect::new(600.0, 150.0, 20.0, 100.0),
    ];
    let spawns = vec![EnemySpawn::new(EnemyKind::Barrel, 400.0, 400.0)];
    Level::assemble(1, config, &upper, &ladders, spawns)
}

fn level_two(config: &GameConfig) -> Level {
    let upper = [
        Rect::new(50.0, 480.0, 200.0, 20.0),
        Rect::new(550.0, 480.0, 200.0, 20.0),
        Rect::new(200.0, 380.0, 400.0, 20.0),
        Rect::new(100.0, 280.0, 150.0, 20.0),
        Rect::new(550.0, 280.0, 150.0, 20.0),
        Rect::new(300.0, 180.0, 200.0, 20.0),
    ];
    let ladders = [
        Rect::new(120.0, 480.0, 20.0, 70.0),
        Rect::new(580.0, 480.0, 20.0, 70.0),
        Rect::new(250.0, 380.0, 20.0, 100.0),
        Rect::new(550.0, 380.0, 20.0, 100.0),
        Rect::new(380.0, 180.0, 20.0, 100.0),
    ];
    let spawns = vec![
        EnemySpawn::new(EnemyKind::Barrel, 200.0, 350.0),
        EnemySpawn::new(EnemyKind::Monster, 500.0, 250.0),
        EnemySpawn::new(EnemyKind::Barrel, 300.0, 450.0),
    ];
    Level::assemble(2, config, &upper, &ladders, spawns)
}

fn level_three(config: &GameConfig) -> Level {
    let upper = [
        Rect::new(0.0, 450.0, 150.0, 20.0),
        Rect::new(200.0, 480.0, 100.0, 20.0),
        Rect::new(350.0, 420.0, 100.0, 20.0),
        Rect::new(500.0, 460.0, 150.0, 20.0),
        Rect::new(650.0, 380.0, 150.0, 20.0),
        Rect::new(0.0, 320.0, 200.0, 20.0),
        Rect::new(300.0, 280.0, 200.0, 20.0),
        Rect::new(550.0, 200.0, 150.0, 20.0),
        Rect::new(200.0, 150.0, 300.0, 20.0),
    ];
    let ladders = [
        Rect::new(80.0, 450.0, 20.0, 100.0),
        Rect::new(230.0, 420.0, 20.0, 60.0),
        Rect::new(680.0, 380.0, 20.0, 80.0),
        Rect::new(150.0, 320.0, 20.0, 130.0),
        Rect::new(400.0, 280.0, 20.0, 140.0),
        Rect::new(580.0, 200.0, 20.0, 80.0),
    ];
    let spawns = vec![
        EnemySpawn::new(EnemyKind::Monster, 150.0, 350.0),
        EnemySpawn::new(EnemyKind::Barrel, 350.0, 250.0),
        EnemySpawn::new(EnemyKind::Monster, 550.0, 350.0),
        EnemySpawn::new(EnemyKind::Barrel, 250.0, 150.0),
        EnemySpawn::new(EnemyKind::Monster, 450.0, 450.0),
    ];
    Level::assemble(3, config, &upper, &ladders, spawns)
}

/// Inclusive integer draw that tolerates an empty range
fn draw<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32) -> i32 {
    if hi <= lo { lo } else { rng.random_range(lo..=hi) }
}

/// Difficulty of generated level `n` (0 for authored levels)
pub fn difficulty(n: u32) -> u32 {
    n.saturating_sub(AUTHORED_LEVELS).min(MAX_DIFFICULTY)
}

fn random_level<R: Rng + ?Sized>(n: u32, config: &GameConfig, rng: &mut R) -> Level {
    let d = difficulty(n);
    let width = config.window_width as i32;
    let height = config.window_height as i32;

    let mut upper = Vec::new();
    let layers = draw(rng, 3, 6);
    let layer_height = (height - 100) / layers;
    for layer in 1..=layers {
        let y = height - 50 - layer * layer_height;
        let count = draw(rng, 2, 4);
        let platform_width = draw(rng, 80, 150);
        let spacing = (width - 100) / count;
        for i in 0..count {
            let x = (50 + i * spacing + draw(rng, -30, 30)).clamp(0, (width - platform_width).max(0));
            upper.push(Rect::new(x as f32, y as f32, platform_width as f32, PLATFORM_THICKNESS));
        }
    }

    let ladders: Vec<Rect> = (0..draw(rng, 1, 3))
        .map(|_| {
            let x = draw(rng, 100, width - 100);
            let y = draw(rng, 200, height - 200);
            Rect::new(x as f32, y as f32, LADDER_WIDTH, LADDER_HEIGHT)
        })
        .collect();

    let speed = 3.0 + d as f32 * 0.5;
    let enemy_count = (1 + d / 2).min(5);
    let mut spawns = Vec::with_capacity(enemy_count as usize);
    for _ in 0..enemy_count {
        let Some(platform) = upper.choose(rng) else {
            break;
        };
        let x = draw(rng, platform.left() as i32 + 10, platform.right() as i32 - 35);
        let kind = if rng.random_bool(0.5) {
            EnemyKind::Barrel
        } else {
            EnemyKind::Monster
        };
        spawns.push(EnemySpawn {
            kind,
            x: x as f32,
            y: platform.top() - 30.0,
            speed,
        });
    }

    Level::assemble(n, config, &upper, &ladders, spawns)
}
