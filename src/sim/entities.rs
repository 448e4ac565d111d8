//! Owner of every live entity
//!
//! Update order per frame is fixed: player, enemies (behavior then physics),
//! collectibles, projectiles. Dead entities are dropped with `retain` after
//! their pass, never while iterating.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collectible::Collectible;
use super::enemy::{Enemy, EnemyKind};
use super::geometry::Rect;
use super::level::{EnemySpawn, Level};
use super::physics::PhysicsWorld;
use super::player::{Player, PlayerInput, PlayerStep};
use super::projectile::Projectile;
use super::state::GameEvent;
use crate::ai::q_learning::QModel;
use crate::config::GameConfig;
use crate::consts::*;

/// Frames between collectible spawn rolls
pub const COLLECTIBLE_SPAWN_INTERVAL: u32 = 120;
/// Chance per eligible platform per roll
pub const COLLECTIBLE_SPAWN_CHANCE: f64 = 0.7;
/// Only this many platforms above the ground get collectibles
pub const COLLECTIBLE_PLATFORMS: usize = 3;

/// Per-frame barrel spawn chance while under the cap
pub const BARREL_SPAWN_CHANCE: f64 = 0.005;
/// Frames per extra allowed barrel
pub const BARREL_CAP_GROWTH: u64 = 3600;
pub const MAX_SPAWNED_BARRELS: usize = 3;
pub const BARREL_SPAWN_Y: f32 = 100.0;
pub const BARREL_SPAWN_INSET: f32 = 50.0;

/// Frames between monster drops
pub const MONSTER_SPAWN_INTERVAL: u32 = 1200;
/// Frames per extra allowed monster
pub const MONSTER_CAP_GROWTH: u64 = 4800;
pub const MONSTERS_PER_LEVEL: u32 = 3;
pub const MONSTER_SPAWN_Y: f32 = -50.0;
pub const MONSTER_SPAWN_INSET: i32 = 100;

/// Spawn bookkeeping, reset with every level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnTimers {
    /// Frames since the level started
    pub elapsed_frames: u64,
    pub collectible_timer: u32,
    pub monster_timer: u32,
    pub monsters_spawned: u32,
}

#[derive(Debug, Clone)]
pub struct EntityManager {
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Collectible>,
    pub projectiles: Vec<Projectile>,
    /// Starting policy for newly spawned barrels
    pub model_template: QModel,
    pub timers: SpawnTimers,
    /// Set when the player dropped out of the world; consumed by the collision pass
    pub(crate) player_fell_out: bool,
    next_id: u32,
}

impl EntityManager {
    pub fn new(player: Player, model_template: QModel) -> Self {
        Self {
            player,
            enemies: Vec::new(),
            collectibles: Vec::new(),
            projectiles: Vec::new(),
            model_template,
            timers: SpawnTimers::default(),
            player_fell_out: false,
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop everything except the player
    pub fn clear_all(&mut self) {
        self.enemies.clear();
        self.collectibles.clear();
        self.projectiles.clear();
        self.player_fell_out = false;
    }

    /// Clear the field, reset spawn timers and place the level's enemies
    pub fn load_level<R: Rng + ?Sized>(&mut self, level: &Level, rng: &mut R) {
        self.clear_all();
        self.timers = SpawnTimers::default();
        for spawn in &level.spawns {
            self.spawn_enemy(spawn, rng);
        }
    }

    /// Add an enemy with its own RNG seeded from `rng`. Returns its id.
    pub fn spawn_enemy<R: Rng + ?Sized>(&mut self, spawn: &EnemySpawn, rng: &mut R) -> u32 {
        let id = self.next_entity_id();
        let seed = rng.random::<u64>();
        let enemy = match spawn.kind {
            EnemyKind::Barrel => Enemy::barrel(id, spawn.x, spawn.y, spawn.speed, Some(&self.model_template), seed),
            EnemyKind::Monster => Enemy::monster(id, spawn.x, spawn.y, spawn.speed, seed),
        };
        self.enemies.push(enemy);
        id
    }

    /// Barrel entering from one of the two top corners
    pub fn spawn_barrel<R: Rng + ?Sized>(&mut self, config: &GameConfig, rng: &mut R) -> u32 {
        let x = if rng.random_bool(0.5) {
            BARREL_SPAWN_INSET
        } else {
            config.window_width - BARREL_SPAWN_INSET
        };
        let spawn = EnemySpawn {
            kind: EnemyKind::Barrel,
            x,
            y: BARREL_SPAWN_Y,
            speed: ENEMY_SPEED,
        };
        log::debug!("Spawning barrel at ({x}, {BARREL_SPAWN_Y})");
        self.spawn_enemy(&spawn, rng)
    }

    /// Monster dropping in from above the screen
    pub fn spawn_monster<R: Rng + ?Sized>(&mut self, config: &GameConfig, rng: &mut R) -> u32 {
        let right = config.window_width as i32 - MONSTER_SPAWN_INSET;
        let x = if right > MONSTER_SPAWN_INSET {
            rng.random_range(MONSTER_SPAWN_INSET..=right)
        } else {
            MONSTER_SPAWN_INSET
        };
        let spawn = EnemySpawn {
            kind: EnemyKind::Monster,
            x: x as f32,
            y: MONSTER_SPAWN_Y,
            speed: ENEMY_SPEED,
        };
        self.timers.monsters_spawned += 1;
        self.timers.monster_timer = 0;
        log::debug!("Spawning monster #{} at x={x}", self.timers.monsters_spawned);
        self.spawn_enemy(&spawn, rng)
    }

    pub fn barrel_count(&self) -> usize {
        self.enemies
            .iter()
            .filter(|e| e.kind() == EnemyKind::Barrel)
            .count()
    }

    /// Advance every entity one frame
    pub fn update_all(
        &mut self,
        input: &PlayerInput,
        world: &PhysicsWorld<'_>,
        ladders: &[Rect],
        events: &mut Vec<GameEvent>,
    ) -> PlayerStep {
        let step = self.player.update(input, world, ladders, events);
        if step.fell_out {
            self.player_fell_out = true;
        }

        let player_rect = *self.player.rect();
        for enemy in &mut self.enemies {
            enemy.update(Some(&player_rect), world);
        }
        self.enemies.retain(|e| e.active);

        for collectible in &mut self.collectibles {
            collectible.update();
        }

        let enemy_rects: Vec<Rect> = self.enemies.iter().map(|e| *e.rect()).collect();
        for projectile in &mut self.projectiles {
            if projectile.update(&enemy_rects, world.width, world.height) {
                events.push(GameEvent::Explosion);
            }
        }
        self.projectiles.retain(|p| p.active);

        step
    }

    /// Periodic spawning of collectibles, barrels and monsters
    pub fn spawn_entities<R: Rng + ?Sized>(&mut self, level: &Level, config: &GameConfig, rng: &mut R) {
        self.timers.elapsed_frames += 1;

        self.timers.collectible_timer += 1;
        if self.timers.collectible_timer >= COLLECTIBLE_SPAWN_INTERVAL {
            self.timers.collectible_timer = 0;
            self.spawn_collectibles(level, rng);
        }

        let max_barrels = (1 + (self.timers.elapsed_frames / BARREL_CAP_GROWTH) as usize).min(MAX_SPAWNED_BARRELS);
        if self.barrel_count() < max_barrels && rng.random_bool(BARREL_SPAWN_CHANCE) {
            self.spawn_barrel(config, rng);
        }

        self.timers.monster_timer += 1;
        let max_monsters = (1 + (self.timers.elapsed_frames / MONSTER_CAP_GROWTH) as u32).min(MONSTERS_PER_LEVEL);
        if self.timers.monster_timer > MONSTER_SPAWN_INTERVAL && self.timers.monsters_spawned < max_monsters {
            self.spawn_monster(config, rng);
        }
    }

    /// One spawn roll on each of the first few platforms above the ground
    pub fn spawn_collectibles<R: Rng + ?Sized>(&mut self, level: &Level, rng: &mut R) {
        for platform in level.upper_platforms().iter().take(COLLECTIBLE_PLATFORMS) {
            if self.collectibles.len() >= MAX_LIVE_COLLECTIBLES {
                break;
            }
            if !rng.random_bool(COLLECTIBLE_SPAWN_CHANCE) {
                continue;
            }
            let lo = platform.left() as i32 + 20;
            let hi = platform.right() as i32 - 20;
            let x = if hi > lo { rng.random_range(lo..=hi) } else { platform.center_x() as i32 };
            let value = COLLECTIBLE_VALUES.choose(rng).copied().unwrap_or(COLLECTIBLE_VALUES[0]);
            self.collectibles
                .push(Collectible::new(x as f32, platform.top() - 20.0, value));
        }
    }

    /// Throw a banana from the player's center toward `target`.
    /// Does nothing without bananas.
    pub fn throw_projectile(&mut self, target: Vec2) -> bool {
        if self.player.bananas == 0 {
            return false;
        }
        self.player.bananas -= 1;
        self.projectiles
            .push(Projectile::new(self.player.rect().center(), target));
        true
    }

    /// Throw at the closest enemy, if there is one
    pub fn throw_at_nearest_enemy(&mut self) -> bool {
        let origin = self.player.rect().center();
        let nearest = self
            .enemies
            .iter()
            .map(|e| e.rect().center())
            .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)));
        match nearest {
            Some(target) => self.throw_projectile(target),
            None => false,
        }
    }

    /// Policy of the barrel that has seen the most states, or the template
    pub fn export_model(&self) -> QModel {
        self.enemies
            .iter()
            .filter_map(|e| e.agent())
            .max_by_key(|a| a.stats().states_explored)
            .map(|a| a.to_model())
            .unwrap_or_else(|| self.model_template.clone())
    }
}
