//! Barrel Climb - headless driver
//!
//! Runs the simulation at a fixed step with a simple autopilot standing in
//! for keyboard input, then persists the learned barrel policy, a save game
//! and the leaderboard.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use barrel_climb::ai::q_learning::{QLearningParams, QModel};
use barrel_climb::persistence::{ModelStore, SaveStore};
use barrel_climb::sim::{FrameInput, GameEvent, GamePhase, GameSession, PlayerInput, ShopItem, Transition, tick};
use barrel_climb::{GameConfig, Leaderboard, PlayerColor};
use clap::Parser;
use glam::Vec2;

/// Frames between route replans
const REPLAN_INTERVAL: u32 = 30;
/// Horizontal slack before the autopilot starts walking
const STEER_DEADBAND: f32 = 4.0;
/// Waypoints this far above the player's feet are reached by jumping
const JUMP_THRESHOLD: f32 = 25.0;
/// Enemies closer than this get a banana
const THREAT_RANGE: f32 = 120.0;

#[derive(Parser, Debug)]
#[command(name = "barrel-climb", about = "Run the platformer headless with an autopilot")]
struct Cli {
    /// Frames to simulate
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Override the RNG seed from the environment
    #[arg(long)]
    seed: Option<u64>,

    /// Load configuration from a JSON file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for models, saves and the leaderboard
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Player color
    #[arg(long, default_value = "blue", value_parser = parse_color)]
    color: PlayerColor,

    /// Continue from the saved game if one exists
    #[arg(long)]
    resume: bool,

    /// Ignore the stored barrel policy
    #[arg(long)]
    fresh_model: bool,

    /// Stop at the first game over instead of restarting
    #[arg(long)]
    single_game: bool,
}

fn parse_color(s: &str) -> std::result::Result<PlayerColor, String> {
    PlayerColor::parse(s).ok_or_else(|| format!("unknown color {s:?}"))
}

/// Greedy input source: walk the A* route toward the nearest collectible
#[derive(Debug, Default)]
struct Autopilot {
    route: Vec<Vec2>,
    replan_in: u32,
}

impl Autopilot {
    fn next_input(&mut self, session: &GameSession) -> FrameInput {
        let player = session.player();
        let rect = *player.rect();
        let feet = Vec2::new(rect.center_x(), rect.bottom() - 10.0);

        if self.replan_in == 0 {
            self.route = nearest_collectible(session, feet)
                .map(|target| session.find_path(feet, target))
                .unwrap_or_default();
            self.replan_in = REPLAN_INTERVAL;
        }
        self.replan_in -= 1;

        // Drop waypoints already under the player
        while let Some(next) = self.route.first() {
            if rect.contains_point(*next) {
                self.route.remove(0);
            } else {
                break;
            }
        }

        let mut input = PlayerInput::default();
        if let Some(next) = self.route.first() {
            input.left = next.x < rect.center_x() - STEER_DEADBAND;
            input.right = next.x > rect.center_x() + STEER_DEADBAND;
            let above = next.y < feet.y - JUMP_THRESHOLD;
            let on_ladder = session.level.ladders().iter().any(|l| l.intersects(&rect));
            input.up = above && on_ladder;
            input.jump = above && !on_ladder;
        }

        let threatened = player.bananas > 0
            && session
                .entities
                .enemies
                .iter()
                .any(|e| e.rect().center().distance(rect.center()) < THREAT_RANGE);
        let purchase = (player.bananas == 0 && player.total_points >= ShopItem::Banana.price())
            .then_some(ShopItem::Banana);

        FrameInput {
            player: input,
            throw_at: None,
            throw_nearest: threatened,
            purchase,
        }
    }

    fn reset(&mut self) {
        self.route.clear();
        self.replan_in = 0;
    }
}

fn nearest_collectible(session: &GameSession, from: Vec2) -> Option<Vec2> {
    session
        .entities
        .collectibles
        .iter()
        .map(|c| c.rect.center())
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?
        .as_secs())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Barrel Climb (headless) starting...");

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path),
        None => GameConfig::from_env(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let models = ModelStore::new(cli.data_dir.join("models"));
    let saves = SaveStore::new(cli.data_dir.join("saves"));
    let epsilon = QLearningParams::default().initial_epsilon;
    let model = if cli.fresh_model {
        QModel::empty(epsilon)
    } else {
        models.load_or_default(epsilon)
    };

    let mut session = GameSession::new(config, cli.color, model);
    if cli.resume {
        match saves.load() {
            Some(save) => session.restore(&save),
            None => log::info!("No save to resume, starting fresh"),
        }
        if session.phase == GamePhase::GameOver {
            session.restart();
        }
    }
    let mut leaderboard = Leaderboard::load(&cli.data_dir);
    let mut pilot = Autopilot::default();

    let mut games = 1u32;
    let mut kills = 0u32;
    let mut best = 0u64;
    for _ in 0..cli.frames {
        let input = pilot.next_input(&session);
        let transition = tick(&mut session, &input);

        for event in session.drain_events() {
            match event {
                GameEvent::EnemyKilled => kills += 1,
                GameEvent::BestScore { score } | GameEvent::GameOver { score } => best = best.max(score),
                _ => {}
            }
            log::debug!("{event:?}");
        }

        match transition {
            Transition::LevelComplete => {
                let next = session.advance_level();
                log::info!("Advancing to level {next}");
                pilot.reset();
            }
            Transition::GameOver => {
                let score = session.player().score;
                if let Some(rank) = leaderboard.add_score(score, session.current_level(), unix_now()?) {
                    log::info!("New leaderboard entry #{rank} with {score}");
                }
                if cli.single_game {
                    break;
                }
                session.restart();
                games += 1;
                pilot.reset();
            }
            Transition::LifeLost => pilot.reset(),
            Transition::None => {}
        }
    }

    let stats = session.agent_stats();
    models
        .try_save(&session.export_model())
        .with_context(|| format!("saving model to {}", models.path().display()))?;
    saves
        .try_save(&session.snapshot(unix_now()?))
        .with_context(|| format!("saving game to {}", saves.path().display()))?;
    leaderboard
        .try_save(&cli.data_dir)
        .with_context(|| format!("saving leaderboard in {}", cli.data_dir.display()))?;

    let player = session.player();
    println!(
        "frames={} games={} level={} score={} best={} lives={} points={} kills={}",
        session.frame,
        games,
        session.current_level(),
        player.score,
        best.max(player.score),
        player.lives,
        player.total_points,
        kills
    );
    for (i, s) in stats.iter().enumerate() {
        println!(
            "barrel {i}: states={} q_values={} epsilon={:.4}",
            s.states_explored, s.total_q_values, s.epsilon
        );
    }
    Ok(())
}
