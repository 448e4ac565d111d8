//! The player character

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::physics::{Body, HorizontalBounds, PhysicsWorld};
use super::state::GameEvent;
use crate::config::PlayerColor;
use crate::consts::*;

/// Held controls for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Climb up while touching a ladder
    pub up: bool,
    /// Climb down while touching a ladder
    pub down: bool,
}

/// Result of one player update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStep {
    pub jumped: bool,
    /// Dropped below the world (only possible with the floor disabled)
    pub fell_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub jump_power: f32,
    pub on_ladder: bool,
    pub lives: u32,
    /// Points this run
    pub score: u64,
    /// Persistent currency spent in the shop
    pub total_points: u64,
    pub bananas: u32,
    pub color: PlayerColor,
    /// Absorbs the next enemy hit
    pub shield: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, color: PlayerColor) -> Self {
        let mut body = Body::new(Rect::new(x, y, PLAYER_WIDTH, PLAYER_HEIGHT), PLAYER_GRAVITY);
        // Allow a jump on the very first frame
        body.on_ground = true;
        Self {
            body,
            speed: PLAYER_SPEED,
            jump_power: PLAYER_JUMP_POWER,
            on_ladder: false,
            lives: PLAYER_START_LIVES,
            score: 0,
            total_points: 0,
            bananas: 0,
            color,
            shield: false,
        }
    }

    /// New player at the default spawn point
    pub fn spawned(color: PlayerColor) -> Self {
        Self::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1, color)
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.body.rect
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Apply input, ladders and physics for one frame
    pub fn update(
        &mut self,
        input: &PlayerInput,
        world: &PhysicsWorld<'_>,
        ladders: &[Rect],
        events: &mut Vec<GameEvent>,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();

        self.body.vel.x = 0.0;
        if input.left {
            self.body.vel.x = -self.speed;
        }
        if input.right {
            self.body.vel.x = self.speed;
        }

        let touching_ladder = ladders.iter().any(|l| l.intersects(&self.body.rect));
        if !touching_ladder {
            self.on_ladder = false;
        } else if input.up || input.down {
            self.on_ladder = true;
            self.body.vel.y = if input.up { -PLAYER_CLIMB_SPEED } else { PLAYER_CLIMB_SPEED };
        } else if self.on_ladder {
            // Hang in place
            self.body.vel.y = 0.0;
        }

        if input.jump && (self.body.on_ground || self.on_ladder) {
            self.body.vel.y = self.jump_power;
            self.body.on_ground = false;
            self.on_ladder = false;
            step.jumped = true;
            events.push(GameEvent::Jump);
        }

        if !self.on_ladder {
            self.body.apply_gravity();
        }

        let outcome = self.body.integrate(world, HorizontalBounds::Clamp);
        if outcome.landed {
            self.on_ladder = false;
        }
        step.fell_out = outcome.fell_out;
        step
    }

    pub fn add_points(&mut self, points: u64) {
        self.score += points;
        self.total_points += points;
    }

    /// Lose one life and go back to the spawn point
    pub fn take_damage(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.respawn();
    }

    pub fn respawn(&mut self) {
        self.body.rect.x = PLAYER_SPAWN.0;
        self.body.rect.y = PLAYER_SPAWN.1;
        self.body.vel = glam::Vec2::ZERO;
        self.body.on_ground = true;
        self.on_ladder = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORMS: [Rect; 2] = [
        Rect::new(0.0, 550.0, 800.0, 50.0),
        Rect::new(100.0, 450.0, 600.0, 20.0),
    ];
    const LADDERS: [Rect; 1] = [Rect::new(150.0, 450.0, 20.0, 100.0)];

    fn world(ground: Option<f32>) -> PhysicsWorld<'static> {
        PhysicsWorld {
            width: 800.0,
            height: 600.0,
            ground_y: ground,
            platforms: &PLATFORMS,
        }
    }

    fn settle(player: &mut Player, w: &PhysicsWorld<'_>) {
        let mut events = Vec::new();
        for _ in 0..30 {
            player.update(&PlayerInput::default(), w, &[], &mut events);
        }
    }

    #[test]
    fn test_spawn_lands_on_ground() {
        let w = world(Some(550.0));
        let mut player = Player::spawned(PlayerColor::Blue);
        settle(&mut player, &w);
        assert!(player.body.on_ground);
        assert_eq!(player.rect().bottom(), 550.0);
    }

    #[test]
    fn test_jump_emits_event_and_leaves_ground() {
        let w = world(Some(550.0));
        let mut player = Player::spawned(PlayerColor::Blue);
        settle(&mut player, &w);

        let mut events = Vec::new();
        let input = PlayerInput {
            jump: true,
            ..Default::default()
        };
        let step = player.update(&input, &w, &[], &mut events);
        assert!(step.jumped);
        assert!(!player.body.on_ground);
        assert_eq!(events, vec![GameEvent::Jump]);

        // No double jump mid-air
        let step = player.update(&input, &w, &[], &mut events);
        assert!(!step.jumped);
    }

    #[test]
    fn test_clamped_to_world() {
        let w = world(Some(550.0));
        let mut player = Player::new(2.0, 510.0, PlayerColor::Red);
        let input = PlayerInput {
            left: true,
            ..Default::default()
        };
        player.update(&input, &w, &[], &mut Vec::new());
        assert_eq!(player.rect().left(), 0.0);
    }

    #[test]
    fn test_ladder_climb_suspends_gravity() {
        let w = world(Some(550.0));
        let mut player = Player::new(145.0, 510.0, PlayerColor::Green);
        let up = PlayerInput {
            up: true,
            ..Default::default()
        };
        let y0 = player.rect().y;
        player.update(&up, &w, &LADDERS, &mut Vec::new());
        assert!(player.on_ladder);
        assert_eq!(player.rect().y, y0 - PLAYER_CLIMB_SPEED);

        // Releasing keeps the player hanging
        let y1 = player.rect().y;
        player.update(&PlayerInput::default(), &w, &LADDERS, &mut Vec::new());
        assert_eq!(player.rect().y, y1);
    }

    #[test]
    fn test_climbing_reaches_upper_platform() {
        let w = world(Some(550.0));
        let mut player = Player::new(145.0, 510.0, PlayerColor::Green);
        let up = PlayerInput {
            up: true,
            ..Default::default()
        };
        for _ in 0..80 {
            player.update(&up, &w, &LADDERS, &mut Vec::new());
        }
        assert!(player.body.on_ground);
        assert_eq!(player.rect().bottom(), 450.0);
    }

    #[test]
    fn test_fell_out_without_floor() {
        let w = world(None);
        let mut player = Player::new(20.0, 560.0, PlayerColor::Blue);
        player.body.on_ground = false;
        let mut fell = false;
        for _ in 0..30 {
            if player.update(&PlayerInput::default(), &w, &[], &mut Vec::new()).fell_out {
                fell = true;
                break;
            }
        }
        assert!(fell);
    }

    #[test]
    fn test_damage_and_points() {
        let mut player = Player::spawned(PlayerColor::Blue);
        player.body.rect.x = 500.0;
        player.add_points(20);
        player.take_damage();
        assert_eq!(player.lives, PLAYER_START_LIVES - 1);
        assert_eq!((player.score, player.total_points), (20, 20));
        assert_eq!(player.rect().x, PLAYER_SPAWN.0);

        for _ in 0..5 {
            player.take_damage();
        }
        assert_eq!(player.lives, 0);
        assert!(!player.is_alive());
    }
}
