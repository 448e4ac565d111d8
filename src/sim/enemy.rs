//! Enemies and their behavior
//!
//! Two variants share one body and one motor:
//! - Barrel: hand-written pursuit heuristics with a Q-learning agent that may
//!   override the heuristic at close range, a self-shortening pause cycle and
//!   stuck recovery. Barrels roll off the screen and are removed.
//! - Monster: drops from the sky, waits, then hunts the player directly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::{Rect, platform_under};
use super::physics::{Body, HorizontalBounds, PhysicsWorld, WallSide};
use crate::ai::q_learning::{Action, Observation, QLearningAgent, QLearningParams, QModel};
use crate::consts::*;

/// Player must be this far above (negative dy) for a barrel to jump
pub const BARREL_JUMP_DY: f32 = -40.0;
/// Player must be this far below for a barrel to look for a way down
pub const BARREL_DROP_DY: f32 = 40.0;
/// Horizontal closeness required for a pursuit jump
pub const JUMP_DX: f32 = 60.0;
/// Distance from a platform end that counts as "at the edge"
pub const EDGE_MARGIN: f32 = 15.0;
/// Horizontal distance below which the barrel stops steering toward the player
pub const DEADBAND: f32 = 10.0;
/// Both |dx| and |dy| must be under this for the learned action to override
pub const CLOSE_RANGE: f32 = 50.0;
/// Look-ahead used to detect a missing floor in the travel direction
pub const EDGE_LOOKAHEAD: f32 = 30.0;

/// Grounded frames between pauses
pub const PAUSE_CYCLE_FRAMES: u32 = 180;
pub const INITIAL_PAUSE_FRAMES: u32 = 60;
pub const PAUSE_DECREMENT: u32 = 5;
pub const MIN_PAUSE_FRAMES: u32 = 10;

/// Consecutive near-motionless frames before stuck recovery kicks in
pub const STUCK_FRAMES: u32 = 30;
/// Per-frame displacement treated as "not moving"
pub const STUCK_EPSILON: f32 = 0.5;

/// Monster dwell ranges (frames)
pub const MONSTER_SETTLE_FRAMES: std::ops::RangeInclusive<u32> = 20..=60;
pub const MONSTER_WAIT_FRAMES: std::ops::RangeInclusive<u32> = 30..=90;
/// Player must be this far above for a hunting monster to jump
pub const MONSTER_JUMP_DY: f32 = -60.0;
/// Rebound speed of a monster landing hard after its drop
pub const MONSTER_BOUNCE: f32 = 2.0;

/// Enemy variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Barrel,
    Monster,
}

/// Horizontal drive shared by both variants
#[derive(Debug, Clone, Copy)]
pub struct Motor {
    pub speed: f32,
    /// -1 (left) or 1 (right)
    pub direction: i32,
}

impl Motor {
    fn drive(&self, body: &mut Body) {
        body.vel.x = self.speed * self.direction as f32;
    }

    fn steer(&mut self, body: &mut Body, direction: i32) {
        self.direction = direction;
        self.drive(body);
    }

    fn reverse(&mut self, body: &mut Body) {
        self.steer(body, -self.direction);
    }
}

/// Periodic rest imposed on a barrel. Each completed pause shortens the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseCycle {
    active_frames: u32,
    remaining: u32,
    duration: u32,
    cycles: u32,
}

/// Pause cycle edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseEvent {
    Started,
    Ended,
}

impl Default for PauseCycle {
    fn default() -> Self {
        Self::with_duration(INITIAL_PAUSE_FRAMES)
    }
}

impl PauseCycle {
    pub fn with_duration(duration: u32) -> Self {
        Self {
            active_frames: 0,
            remaining: 0,
            duration,
            cycles: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.remaining > 0
    }

    /// Length of the next (or current) pause
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Completed pauses so far
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Advance one frame. Only grounded frames count toward the next pause.
    pub fn advance(&mut self, grounded: bool) -> Option<PauseEvent> {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.cycles += 1;
                self.active_frames = 0;
                self.duration = self
                    .duration
                    .saturating_sub(PAUSE_DECREMENT)
                    .max(MIN_PAUSE_FRAMES);
                return Some(PauseEvent::Ended);
            }
            return None;
        }

        if grounded {
            self.active_frames += 1;
            if self.active_frames >= PAUSE_CYCLE_FRAMES {
                self.remaining = self.duration;
                return Some(PauseEvent::Started);
            }
        }
        None
    }
}

/// Barrel-only state
#[derive(Debug, Clone)]
pub struct BarrelBrain {
    pub agent: QLearningAgent,
    pub pause: PauseCycle,
    stuck_timer: u32,
    last_x: f32,
}

impl BarrelBrain {
    fn new(agent: QLearningAgent, x: f32) -> Self {
        Self {
            agent,
            pause: PauseCycle::default(),
            stuck_timer: 0,
            last_x: x,
        }
    }
}

/// Monster phases with per-spawn dwell times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterState {
    /// Dropping; once grounded, `settle` frames must pass
    Falling { settle: u32 },
    /// Motionless for `remaining` frames
    Waiting { remaining: u32 },
    /// Chasing the player
    Hunting,
}

/// Variant-specific behavior state
#[derive(Debug, Clone)]
pub enum Behavior {
    Barrel(BarrelBrain),
    Monster(MonsterState),
}

/// A live enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub motor: Motor,
    /// False once the enemy is due for removal
    pub active: bool,
    pub behavior: Behavior,
    rng: Pcg32,
}

impl Enemy {
    /// Barrel with a fresh or restored Q-learning agent
    pub fn barrel(id: u32, x: f32, y: f32, speed: f32, model: Option<&QModel>, seed: u64) -> Self {
        let params = QLearningParams::default();
        let agent = match model {
            Some(model) => QLearningAgent::from_model(params, model),
            None => QLearningAgent::new(params),
        };
        Self::spawn(id, x, y, speed, seed, |_, x| Behavior::Barrel(BarrelBrain::new(agent, x)))
    }

    /// Monster starting in its falling phase
    pub fn monster(id: u32, x: f32, y: f32, speed: f32, seed: u64) -> Self {
        let mut enemy = Self::spawn(id, x, y, speed, seed, |rng, _| {
            Behavior::Monster(MonsterState::Falling {
                settle: rng.random_range(MONSTER_SETTLE_FRAMES),
            })
        });
        enemy.body.bounce = MONSTER_BOUNCE;
        enemy
    }

    fn spawn<F>(id: u32, x: f32, y: f32, speed: f32, seed: u64, behavior: F) -> Self
    where
        F: FnOnce(&mut Pcg32, f32) -> Behavior,
    {
        let mut rng = Pcg32::seed_from_u64(seed);
        let direction = if rng.random_bool(0.5) { 1 } else { -1 };
        let behavior = behavior(&mut rng, x);
        Self {
            id,
            body: Body::new(Rect::new(x, y, ENEMY_SIZE, ENEMY_SIZE), ENEMY_GRAVITY),
            motor: Motor { speed, direction },
            active: true,
            behavior,
            rng,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Barrel(_) => EnemyKind::Barrel,
            Behavior::Monster(_) => EnemyKind::Monster,
        }
    }

    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.body.rect
    }

    pub fn agent(&self) -> Option<&QLearningAgent> {
        match &self.behavior {
            Behavior::Barrel(brain) => Some(&brain.agent),
            Behavior::Monster(_) => None,
        }
    }

    /// Move to a new spot and clear motion and timers
    pub fn reposition(&mut self, x: f32, y: f32) {
        self.body.rect.x = x;
        self.body.rect.y = y;
        self.body.vel = glam::Vec2::ZERO;
        self.body.on_ground = false;
        if let Behavior::Barrel(brain) = &mut self.behavior {
            brain.stuck_timer = 0;
            brain.last_x = x;
        }
    }

    /// Normalized observation fed to the learning agent
    pub fn observe(&self, player: &Rect, world: &PhysicsWorld<'_>) -> Observation {
        observation(&self.body, &self.motor, player, world)
    }

    /// One frame: behavior decision, then physics. Inactive enemies are left untouched.
    pub fn update(&mut self, player: Option<&Rect>, world: &PhysicsWorld<'_>) {
        if !self.active {
            return;
        }

        match self.kind() {
            EnemyKind::Barrel => self.barrel_behavior(player, world),
            EnemyKind::Monster => self.monster_behavior(player),
        }

        self.body.apply_gravity();
        let bounds = match self.kind() {
            EnemyKind::Barrel => HorizontalBounds::Exit,
            EnemyKind::Monster => HorizontalBounds::Reflect,
        };
        let outcome = self.body.integrate(world, bounds);
        match outcome.wall {
            Some(WallSide::Left) => self.motor.direction = 1,
            Some(WallSide::Right) => self.motor.direction = -1,
            None => {}
        }
        if outcome.left_world || outcome.fell_out {
            self.active = false;
        }
    }

    fn barrel_behavior(&mut self, player: Option<&Rect>, world: &PhysicsWorld<'_>) {
        let Some(player) = player else {
            self.motor.drive(&mut self.body);
            return;
        };

        let state = self.observe(player, world);
        let dx = player.center_x() - self.body.rect.center_x();
        let dy = player.center_y() - self.body.rect.center_y();

        let Behavior::Barrel(brain) = &mut self.behavior else {
            return;
        };

        let primary = decide_primary_action(
            &self.body,
            &self.motor,
            brain.pause.is_paused(),
            player,
            dx,
            dy,
            world.platforms,
        );
        let learned = brain.agent.choose_action(&state, &mut self.rng);
        let action = if should_override_action(primary, learned, dx, dy) {
            log::debug!("barrel {} override {:?} -> {:?}", self.id, primary, learned);
            learned
        } else {
            primary
        };
        let jump_power = if action == learned && action != primary {
            ENEMY_LEARNED_JUMP_POWER
        } else {
            ENEMY_JUMP_POWER
        };
        execute_action(&mut self.body, &mut self.motor, action, jump_power);

        let reward = proximity_reward(&self.body.rect, player, world);
        let next_state = observation(&self.body, &self.motor, player, world);
        brain
            .agent
            .learn(&state, action, reward, &next_state, !self.active);

        match brain.pause.advance(self.body.on_ground) {
            Some(PauseEvent::Started) => log::debug!(
                "barrel {} pausing for {} frames",
                self.id,
                brain.pause.duration()
            ),
            Some(PauseEvent::Ended) => {
                log::debug!("barrel {} resumes after pause #{}", self.id, brain.pause.cycles())
            }
            None => {}
        }

        let displacement = (self.body.rect.x - brain.last_x).abs();
        brain.last_x = self.body.rect.x;
        if self.body.on_ground && !brain.pause.is_paused() && displacement < STUCK_EPSILON {
            brain.stuck_timer += 1;
            if brain.stuck_timer > STUCK_FRAMES {
                brain.stuck_timer = 0;
                if self.rng.random_bool(0.5) {
                    self.motor.reverse(&mut self.body);
                } else {
                    self.body.jump(ENEMY_JUMP_POWER);
                }
            }
        } else {
            brain.stuck_timer = 0;
        }
    }

    fn monster_behavior(&mut self, player: Option<&Rect>) {
        let Behavior::Monster(state) = &mut self.behavior else {
            return;
        };

        match *state {
            MonsterState::Falling { settle } => {
                self.body.vel.x = 0.0;
                if self.body.on_ground {
                    *state = match settle.saturating_sub(1) {
                        0 => MonsterState::Waiting {
                            remaining: self.rng.random_range(MONSTER_WAIT_FRAMES),
                        },
                        settle => MonsterState::Falling { settle },
                    };
                }
            }
            MonsterState::Waiting { remaining } => {
                self.body.vel.x = 0.0;
                *state = match remaining.saturating_sub(1) {
                    0 => MonsterState::Hunting,
                    remaining => MonsterState::Waiting { remaining },
                };
            }
            MonsterState::Hunting => match player {
                Some(player) => {
                    let dx = player.center_x() - self.body.rect.center_x();
                    let dy = player.center_y() - self.body.rect.center_y();
                    if dx.abs() > DEADBAND {
                        self.motor.steer(&mut self.body, if dx > 0.0 { 1 } else { -1 });
                    } else {
                        self.body.vel.x = 0.0;
                    }
                    if dy < MONSTER_JUMP_DY && dx.abs() < JUMP_DX {
                        self.body.jump(ENEMY_JUMP_POWER);
                    }
                }
                None => self.motor.drive(&mut self.body),
            },
        }
    }
}

/// Enemy and player positions scaled to the world, plus direction and grounding
pub fn observation(body: &Body, motor: &Motor, player: &Rect, world: &PhysicsWorld<'_>) -> Observation {
    [
        body.rect.x / world.width,
        body.rect.y / world.height,
        player.x / world.width,
        player.y / world.height,
        (motor.direction as f32 + 1.0) / 2.0,
        if body.on_ground { 1.0 } else { 0.0 },
    ]
}

/// Hand-written barrel policy. Rules are checked in priority order.
pub fn decide_primary_action(
    body: &Body,
    motor: &Motor,
    paused: bool,
    player: &Rect,
    dx: f32,
    dy: f32,
    platforms: &[Rect],
) -> Action {
    if paused {
        return Action::Wait;
    }

    if dy < BARREL_JUMP_DY && dx.abs() < JUMP_DX && body.on_ground {
        return Action::Jump;
    }

    let rect = &body.rect;
    let current = platform_under(rect, platforms);

    if let Some(platform) = current {
        if rect.center_x() - platform.left() < EDGE_MARGIN {
            return Action::Left;
        }
        if platform.right() - rect.center_x() < EDGE_MARGIN {
            return Action::Right;
        }
    }

    if dy > BARREL_DROP_DY {
        if let Some(platform) = current {
            let player_lower = platform_under(player, platforms).is_some_and(|p| p.top() > platform.top());
            let at_edge = edge_ahead(rect, motor.direction, platforms);
            if at_edge {
                return direction_action(motor.direction);
            }
            if player_lower {
                // Head for the nearer end of the current platform
                let to_left = rect.center_x() - platform.left();
                let to_right = platform.right() - rect.center_x();
                return if to_left < to_right { Action::Left } else { Action::Right };
            }
        }
    }

    if dx.abs() > DEADBAND {
        return if dx > 0.0 { Action::Right } else { Action::Left };
    }

    Action::Right
}

/// True when there is no floor `EDGE_LOOKAHEAD` pixels ahead
fn edge_ahead(rect: &Rect, direction: i32, platforms: &[Rect]) -> bool {
    let probe_x = rect.center_x() + EDGE_LOOKAHEAD * direction as f32;
    !platforms
        .iter()
        .any(|p| p.contains_x(probe_x) && (p.top() - rect.bottom()).abs() < 10.0)
}

fn direction_action(direction: i32) -> Action {
    if direction < 0 { Action::Left } else { Action::Right }
}

/// The learned action wins only when it disagrees and the player is close on both axes
pub fn should_override_action(primary: Action, learned: Action, dx: f32, dy: f32) -> bool {
    primary != learned && dx.abs() < CLOSE_RANGE && dy.abs() < CLOSE_RANGE
}

/// Apply an action to the body. `Wait` stops horizontal motion.
pub fn execute_action(body: &mut Body, motor: &mut Motor, action: Action, jump_power: f32) {
    match action {
        Action::Left => motor.steer(body, -1),
        Action::Right => motor.steer(body, 1),
        Action::Jump => {
            body.jump(jump_power);
        }
        Action::Wait => body.vel.x = 0.0,
    }
}

/// Normalized closeness to the player in [0, 1]; 1 means touching corners
pub fn proximity_reward(enemy: &Rect, player: &Rect, world: &PhysicsWorld<'_>) -> f32 {
    let max_distance = (world.width * world.width + world.height * world.height).sqrt();
    if max_distance <= 0.0 {
        return 0.0;
    }
    let distance = crate::distance(enemy.position(), player.position());
    ((max_distance - distance) / max_distance).clamp(0.0, 1.0)
}
