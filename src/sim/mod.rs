//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or file I/O

pub mod collectible;
pub mod collision;
pub mod enemy;
pub mod entities;
pub mod geometry;
pub mod level;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod shop;
pub mod state;
pub mod tick;

pub use collectible::Collectible;
pub use collision::{check_all, respawn_enemies};
pub use enemy::{Behavior, Enemy, EnemyKind, MonsterState, PauseCycle};
pub use entities::EntityManager;
pub use geometry::{Rect, intersects, landing_allowed};
pub use level::{EnemySpawn, Level, LevelManager};
pub use physics::{Body, HorizontalBounds, PhysicsWorld};
pub use player::{Player, PlayerInput};
pub use projectile::Projectile;
pub use shop::{ShopError, ShopItem};
pub use state::{GameEvent, GamePhase, GameSession, Progress, Transition};
pub use tick::{FrameInput, tick};
