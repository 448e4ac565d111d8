//! Game configuration
//!
//! Built once at startup and handed to every constructor by reference.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Player body colors offered by the color selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayerColor {
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::Blue,
        PlayerColor::Red,
        PlayerColor::Green,
        PlayerColor::Yellow,
        PlayerColor::Purple,
        PlayerColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::Blue => "BLUE",
            PlayerColor::Red => "RED",
            PlayerColor::Green => "GREEN",
            PlayerColor::Yellow => "YELLOW",
            PlayerColor::Purple => "PURPLE",
            PlayerColor::Orange => "ORANGE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BLUE" => Some(PlayerColor::Blue),
            "RED" => Some(PlayerColor::Red),
            "GREEN" => Some(PlayerColor::Green),
            "YELLOW" => Some(PlayerColor::Yellow),
            "PURPLE" => Some(PlayerColor::Purple),
            "ORANGE" => Some(PlayerColor::Orange),
            _ => None,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            PlayerColor::Blue => (0, 100, 255),
            PlayerColor::Red => (255, 0, 0),
            PlayerColor::Green => (0, 200, 0),
            PlayerColor::Yellow => (255, 255, 0),
            PlayerColor::Purple => (128, 0, 128),
            PlayerColor::Orange => (255, 165, 0),
        }
    }
}

/// World and runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// World width in pixels
    pub window_width: f32,
    /// World height in pixels
    pub window_height: f32,
    /// Target frame rate of the driver
    pub fps: u32,
    /// Distance of the fallback ground line above the world bottom
    pub ground_margin: f32,
    /// When false there is no fallback ground line and entities can fall out
    pub floor_enabled: bool,
    pub debug_mode: bool,
    /// Seed for every random decision in a session
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 800.0,
            window_height: 600.0,
            fps: 60,
            ground_margin: 50.0,
            floor_enabled: true,
            debug_mode: false,
            seed: 0x5eed,
        }
    }
}

impl GameConfig {
    /// Y coordinate of the fallback ground line, if enabled
    pub fn ground_y(&self) -> Option<f32> {
        self.floor_enabled
            .then_some(self.window_height - self.ground_margin)
    }

    /// Build a config from `WINDOW_WIDTH`, `WINDOW_HEIGHT`, `FPS`, `DEBUG_MODE`
    /// and `GAME_SEED`. Missing or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`] but reading from an arbitrary source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_var(&lookup, "WINDOW_WIDTH") {
            config.window_width = v;
        }
        if let Some(v) = parse_var(&lookup, "WINDOW_HEIGHT") {
            config.window_height = v;
        }
        if let Some(v) = parse_var(&lookup, "FPS") {
            config.fps = v;
        }
        if let Some(v) = lookup("DEBUG_MODE") {
            config.debug_mode = v.eq_ignore_ascii_case("true");
        }
        if let Some(v) = parse_var(&lookup, "GAME_SEED") {
            config.seed = v;
        }
        config.validated()
    }

    /// Replace out-of-range fields with their defaults, logging each one
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.window_width.is_finite() && self.window_width > 0.0) {
            log::warn!("Ignoring invalid window width {}", self.window_width);
            self.window_width = defaults.window_width;
        }
        if !(self.window_height.is_finite() && self.window_height > 0.0) {
            log::warn!("Ignoring invalid window height {}", self.window_height);
            self.window_height = defaults.window_height;
        }
        if !(self.ground_margin.is_finite() && self.ground_margin >= 0.0 && self.ground_margin < self.window_height) {
            log::warn!("Ignoring invalid ground margin {}", self.ground_margin);
            self.ground_margin = defaults.ground_margin.min(self.window_height / 2.0);
        }
        if self.fps == 0 {
            log::warn!("Ignoring zero fps");
            self.fps = defaults.fps;
        }
        self
    }

    /// Load a JSON config file, falling back to defaults on any error
    pub fn from_json_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Self::validated(config)
                }
                Err(e) => {
                    log::warn!("Invalid config {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read config {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring invalid {key}={raw:?}");
            None
        }
    }
}
