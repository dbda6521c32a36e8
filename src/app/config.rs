use anyhow::{anyhow, bail};
use serde::Serialize;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const SPAWN_BELOW_SCREEN: f64 = 50.0;
pub const SHORT_TRAIL_LIFETIME: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy)]
struct DifficultyPreset {
    spawn_interval: f64,
    fruit_velocity: f64,
    min_slash_velocity: f64,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    fn preset(self) -> DifficultyPreset {
        match self {
            Self::Easy => DifficultyPreset {
                spawn_interval: 2.0,
                fruit_velocity: 3.0,
                min_slash_velocity: 0.05,
            },
            Self::Medium => DifficultyPreset {
                spawn_interval: 1.5,
                fruit_velocity: 5.0,
                min_slash_velocity: 0.03,
            },
            Self::Hard => DifficultyPreset {
                spawn_interval: 1.0,
                fruit_velocity: 7.0,
                min_slash_velocity: 0.02,
            },
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(anyhow!("unknown difficulty '{other}'")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerceptionSettings {
    #[serde(rename = "maxHands")]
    pub max_hands: u32,
    #[serde(rename = "detectionConfidence")]
    pub detection_confidence: f64,
    #[serde(rename = "trackingConfidence")]
    pub tracking_confidence: f64,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub fps: u32,
    pub difficulty: Difficulty,
    // Seconds between fruit spawns.
    pub spawn_interval: f64,
    pub fruit_radius: f64,
    // Pixels per tick.
    pub fruit_velocity: f64,
    pub fruit_color: String,
    pub spawn_margin: f64,
    pub offscreen_min_y: f64,
    pub perception: PerceptionSettings,
    pub gesture_history_size: usize,
    // Normalized units per frame.
    pub min_slash_velocity: f64,
    pub trail_max_points: usize,
    pub trail_lifetime: f64,
    pub trail_color: String,
    pub trail_max_thickness: u32,
    pub trail_collision_window: f64,
    pub slice_threshold: f64,
    pub debug_mode: bool,
    pub show_hand_landmarks: bool,
    pub show_fingertip_marker: bool,
    pub spawn_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let preset = Difficulty::Medium.preset();
        Self {
            window_width: 640,
            window_height: 480,
            fps: 30,
            difficulty: Difficulty::Medium,
            spawn_interval: preset.spawn_interval,
            fruit_radius: 20.0,
            fruit_velocity: preset.fruit_velocity,
            fruit_color: "#ffff00".to_string(),
            spawn_margin: 50.0,
            offscreen_min_y: -50.0,
            perception: PerceptionSettings {
                max_hands: 1,
                detection_confidence: 0.7,
                tracking_confidence: 0.7,
            },
            gesture_history_size: 10,
            min_slash_velocity: preset.min_slash_velocity,
            trail_max_points: 50,
            trail_lifetime: 0.5,
            trail_color: "#00ffff".to_string(),
            trail_max_thickness: 8,
            trail_collision_window: 0.3,
            slice_threshold: 20.0,
            debug_mode: false,
            show_hand_landmarks: false,
            show_fingertip_marker: true,
            spawn_seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let mut config = Self::default().with_dimensions(
            env_parse("GAME_WIDTH").unwrap_or(defaults.window_width),
            env_parse("GAME_HEIGHT").unwrap_or(defaults.window_height),
        );
        if let Ok(value) = env::var("GAME_DIFFICULTY") {
            config = config.with_difficulty(value.parse()?);
        }
        if env_flag("GAME_DEBUG") {
            config = config.with_debug();
        }
        if env_flag("GAME_NO_TRAIL") {
            config = config.with_short_trail();
        }
        config.spawn_seed = env_parse("SPAWN_SEED");
        config.validate()?;
        Ok(config)
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        let preset = difficulty.preset();
        self.difficulty = difficulty;
        self.spawn_interval = preset.spawn_interval;
        self.fruit_velocity = preset.fruit_velocity;
        self.min_slash_velocity = preset.min_slash_velocity;
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.debug_mode = true;
        self.show_hand_landmarks = true;
        self.show_fingertip_marker = true;
        self
    }

    pub fn with_short_trail(mut self) -> Self {
        self.trail_lifetime = SHORT_TRAIL_LIFETIME;
        self
    }

    pub fn spawn_start_y(&self) -> f64 {
        self.window_height as f64 + SPAWN_BELOW_SCREEN
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.window_width == 0 || self.window_height == 0 {
            bail!("window dimensions must be positive");
        }
        if (self.window_width as f64) < self.spawn_margin * 2.0 {
            bail!(
                "window width {} is narrower than twice the spawn margin {}",
                self.window_width,
                self.spawn_margin
            );
        }
        if !(self.spawn_interval > 0.0) {
            bail!("spawn_interval must be positive");
        }
        if !(self.fruit_radius > 0.0) || !self.fruit_velocity.is_finite() {
            bail!("fruit radius must be positive and velocity finite");
        }
        if self.gesture_history_size < 2 {
            bail!("gesture_history_size must hold at least two samples");
        }
        if !(self.min_slash_velocity >= 0.0) {
            bail!("min_slash_velocity must not be negative");
        }
        if self.trail_max_points == 0 {
            bail!("trail_max_points must be positive");
        }
        if !(self.trail_lifetime > 0.0) || !(self.trail_collision_window > 0.0) {
            bail!("trail lifetime and collision window must be positive");
        }
        if !(self.slice_threshold >= 0.0) {
            bail!("slice_threshold must not be negative");
        }
        let perception = &self.perception;
        if perception.max_hands == 0 {
            bail!("max_hands must be positive");
        }
        for (name, value) in [
            ("detection_confidence", perception.detection_confidence),
            ("tracking_confidence", perception.tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1]");
            }
        }
        Ok(())
    }
}

pub fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

pub fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_medium() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.spawn_start_y(), 530.0);
    }

    #[test]
    fn difficulty_presets_override_tuning() {
        let hard = GameConfig::default().with_difficulty(Difficulty::Hard);
        assert_eq!(hard.spawn_interval, 1.0);
        assert_eq!(hard.fruit_velocity, 7.0);
        assert_eq!(hard.min_slash_velocity, 0.02);

        let easy = hard.with_difficulty(Difficulty::Easy);
        assert_eq!(easy.spawn_interval, 2.0);
        assert_eq!(easy.fruit_velocity, 3.0);
        assert_eq!(easy.min_slash_velocity, 0.05);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("nightmare".parse::<Difficulty>().is_err());
    }

    #[test]
    fn debug_and_short_trail_toggles() {
        let config = GameConfig::default().with_debug().with_short_trail();
        assert!(config.debug_mode);
        assert!(config.show_hand_landmarks);
        assert_eq!(config.trail_lifetime, SHORT_TRAIL_LIFETIME);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let narrow = GameConfig::default().with_dimensions(80, 480);
        assert!(narrow.validate().is_err());

        let mut tiny_history = GameConfig::default();
        tiny_history.gesture_history_size = 1;
        assert!(tiny_history.validate().is_err());

        let mut confidence = GameConfig::default();
        confidence.perception.tracking_confidence = 1.5;
        assert!(confidence.validate().is_err());
    }
}
