//! Session state and the values exchanged with the frame driver
//!
//! A `GameSession` owns everything needed to advance the game one frame:
//! configuration, the seeded RNG, the current level, all live entities and
//! level progress. Notifications are queued as `GameEvent`s and drained by
//! the driver.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::EntityManager;
use super::level::{Level, LevelManager};
use super::physics::PhysicsWorld;
use super::player::Player;
use super::shop::{self, ShopError, ShopItem};
use crate::ai::pathfinding::{DEFAULT_CELL_SIZE, NavGrid};
use crate::ai::q_learning::{AgentStats, QModel};
use crate::config::{GameConfig, PlayerColor};
use crate::consts::*;
use crate::persistence::save::{LevelSnapshot, PlayerSnapshot, SaveGame};

/// Outcome of a frame's collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transition {
    #[default]
    None,
    LevelComplete,
    LifeLost,
    GameOver,
}

/// Fire-and-forget notifications for sound/UI/network collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jump,
    Damage,
    Point { value: u64 },
    GameOver { score: u64 },
    EnemyKilled,
    Explosion,
    /// Posted when a level is finished so the best score can be synced
    BestScore { score: u64 },
    LevelComplete { level: u32 },
}

/// High-level phase. Frames only simulate while `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Waiting for the driver to advance to the next level
    LevelComplete,
    GameOver,
}

/// Collectible progress toward finishing the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub collectibles_collected: u32,
    pub collectibles_needed: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            collectibles_collected: 0,
            collectibles_needed: COLLECTIBLES_PER_LEVEL,
        }
    }
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.collectibles_collected >= self.collectibles_needed
    }
}

/// One running game
#[derive(Debug, Clone)]
pub struct GameSession {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub levels: LevelManager,
    pub level: Level,
    pub entities: EntityManager,
    pub progress: Progress,
    /// Frames simulated since the session started
    pub frame: u64,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    nav: NavGrid,
}

impl GameSession {
    /// Start at level 1. `model` seeds every barrel's learning agent.
    pub fn new(config: GameConfig, color: PlayerColor, model: QModel) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let levels = LevelManager::new();
        let level = levels.create_current(&config, &mut rng);
        let nav = NavGrid::from_platforms(
            config.window_width,
            config.window_height,
            DEFAULT_CELL_SIZE,
            level.platforms(),
        );
        let mut entities = EntityManager::new(Player::spawned(color), model);
        entities.load_level(&level, &mut rng);

        Self {
            config,
            phase: GamePhase::Playing,
            levels,
            level,
            entities,
            progress: Progress::default(),
            frame: 0,
            rng,
            events: Vec::new(),
            nav,
        }
    }

    /// Collision view of the current level
    pub fn world(&self) -> PhysicsWorld<'_> {
        PhysicsWorld::new(&self.config, self.level.platforms())
    }

    pub fn player(&self) -> &Player {
        &self.entities.player
    }

    pub fn current_level(&self) -> u32 {
        self.levels.current_level()
    }

    /// Take all queued notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild the current level: geometry, enemies, progress and player position.
    /// What the barrels learned so far becomes the template for the new ones.
    pub fn start_level(&mut self) {
        self.entities.model_template = self.entities.export_model();
        self.level = self.levels.create_current(&self.config, &mut self.rng);
        self.nav.set_obstacles(self.level.platforms());
        self.entities.load_level(&self.level, &mut self.rng);
        self.entities.player.respawn();
        self.progress = Progress::default();
        self.phase = GamePhase::Playing;
    }

    /// Move on after a completed level
    pub fn advance_level(&mut self) -> u32 {
        let next = self.levels.next_level();
        self.start_level();
        next
    }

    /// New game after game over. Points earned so far stay spendable.
    pub fn restart(&mut self) {
        let color = self.entities.player.color;
        let total_points = self.entities.player.total_points;
        self.entities.player = Player::spawned(color);
        self.entities.player.total_points = total_points;
        self.levels.reset();
        self.start_level();
    }

    pub fn throw_projectile(&mut self, target: Vec2) -> bool {
        self.entities.throw_projectile(target)
    }

    pub fn throw_at_nearest_enemy(&mut self) -> bool {
        self.entities.throw_at_nearest_enemy()
    }

    pub fn buy(&mut self, item: ShopItem) -> Result<(), ShopError> {
        shop::buy(item, &mut self.entities.player)
    }

    /// Grid route for the current level (empty when unreachable)
    pub fn find_path(&self, from: Vec2, to: Vec2) -> Vec<Vec2> {
        self.nav.find_path(from, to)
    }

    /// Best learned policy among live barrels, or the template
    pub fn export_model(&self) -> QModel {
        self.entities.export_model()
    }

    /// Learning stats for each live barrel
    pub fn agent_stats(&self) -> Vec<AgentStats> {
        self.entities
            .enemies
            .iter()
            .filter_map(|e| e.agent().map(|a| a.stats()))
            .collect()
    }

    /// Snapshot the fields a saved game restores
    pub fn snapshot(&self, timestamp: u64) -> SaveGame {
        let player = &self.entities.player;
        SaveGame::new(
            timestamp,
            PlayerSnapshot {
                lives: player.lives,
                score: player.score,
                total_points: player.total_points,
                bananas: player.bananas,
                color: player.color,
                position: (player.rect().x, player.rect().y),
            },
            LevelSnapshot {
                current_level: self.levels.current_level(),
                collectibles_collected: self.progress.collectibles_collected,
            },
        )
    }

    /// Resume from a saved game
    pub fn restore(&mut self, save: &SaveGame) {
        self.levels.set_current_level(save.level.current_level);
        self.start_level();

        let snapshot = &save.player;
        let player = &mut self.entities.player;
        player.lives = snapshot.lives;
        player.score = snapshot.score;
        player.total_points = snapshot.total_points;
        player.bananas = snapshot.bananas;
        player.color = snapshot.color;
        player.body.rect.x = snapshot.position.0;
        player.body.rect.y = snapshot.position.1;
        self.progress.collectibles_collected = save.level.collectibles_collected;
        self.phase = if player.is_alive() {
            GamePhase::Playing
        } else {
            GamePhase::GameOver
        };
        log::info!(
            "Restored save: level {}, score {}, lives {}",
            save.level.current_level,
            snapshot.score,
            snapshot.lives
        );
    }
}
