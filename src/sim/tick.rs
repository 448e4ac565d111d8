//! Fixed-step frame advance
//!
//! One call = one frame: purchases and throws, entity updates, spawning,
//! then the collision pass. The returned `Transition` tells the driver
//! whether to advance, restart or carry on.

use glam::Vec2;

use super::collision;
use super::physics::PhysicsWorld;
use super::player::PlayerInput;
use super::shop::ShopItem;
use super::state::{GameEvent, GamePhase, GameSession, Transition};

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub player: PlayerInput,
    /// Throw a banana toward this point
    pub throw_at: Option<Vec2>,
    /// Throw a banana at the closest enemy (ignored when `throw_at` is set)
    pub throw_nearest: bool,
    /// Buy an item before the frame runs
    pub purchase: Option<ShopItem>,
}

/// Advance the session by one frame
pub fn tick(session: &mut GameSession, input: &FrameInput) -> Transition {
    if session.phase != GamePhase::Playing {
        return Transition::None;
    }
    session.frame += 1;

    if let Some(item) = input.purchase {
        if let Err(err) = session.buy(item) {
            log::debug!("Purchase of {} refused: {err}", item.name());
        }
    }

    if let Some(target) = input.throw_at {
        session.entities.throw_projectile(target);
    } else if input.throw_nearest {
        session.entities.throw_at_nearest_enemy();
    }

    let world = PhysicsWorld::new(&session.config, session.level.platforms());
    session
        .entities
        .update_all(&input.player, &world, session.level.ladders(), &mut session.events);
    session
        .entities
        .spawn_entities(&session.level, &session.config, &mut session.rng);

    let transition = collision::check_all(&mut session.entities, &mut session.progress, &mut session.events);
    match transition {
        Transition::LevelComplete => {
            session.phase = GamePhase::LevelComplete;
            session.events.push(GameEvent::LevelComplete {
                level: session.levels.current_level(),
            });
            log::info!(
                "Level {} complete at frame {} (score {})",
                session.levels.current_level(),
                session.frame,
                session.entities.player.score
            );
        }
        Transition::GameOver => {
            session.phase = GamePhase::GameOver;
            log::info!("Game over with score {}", session.entities.player.score);
        }
        Transition::LifeLost => {
            log::info!("Life lost, {} remaining", session.entities.player.lives);
        }
        Transition::None => {}
    }
    transition
}
