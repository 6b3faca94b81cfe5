use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Difficulty preset, mapped to the base tick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Milliseconds between ticks at the start of a run
    pub fn base_tick_ms(self) -> u32 {
        match self {
            Difficulty::Easy => 140,
            Difficulty::Normal => 110,
            Difficulty::Hard => 85,
        }
    }

    /// Parses a settings string. Unknown values yield `None` and are ignored by callers.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// Board size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BoardSize {
    /// Returns (cols, rows)
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            BoardSize::Small => (28, 20),
            BoardSize::Medium => (40, 30),
            BoardSize::Large => (54, 38),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Some(BoardSize::Small),
            "medium" => Some(BoardSize::Medium),
            "large" => Some(BoardSize::Large),
            _ => None,
        }
    }
}

/// Tuning constants for scoring, speed and collectibles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Length of the snake at the start of a run
    pub initial_snake_length: usize,

    /// Points (and coins) for regular food
    pub food_score: u32,
    /// Points (and coins) for golden fruit
    pub golden_score: u32,

    /// Tick interval reduction after eating food
    pub food_speedup_ms: u32,
    /// Tick interval reduction after eating golden fruit
    pub golden_speedup_ms: u32,
    /// The tick interval never drops below this
    pub min_tick_ms: u32,

    /// Tick interval increase granted by the Slow power-up
    pub slow_step_ms: u32,
    /// Slow never pushes the tick interval past `base + slow_cap_ms`
    pub slow_cap_ms: u32,

    /// How long a collected power-up effect lasts
    pub effect_duration_ms: u64,

    /// Chance per food eaten that golden fruit appears (if none is present)
    pub golden_chance: f64,
    /// Chance per food eaten that a power-up appears (if none is present)
    pub power_up_chance: f64,

    /// Lifetime of uncollected golden fruit
    pub golden_ttl_ms: u32,
    /// Lifetime of an uncollected power-up
    pub power_up_ttl_ms: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            initial_snake_length: 5,
            food_score: 1,
            golden_score: 5,
            food_speedup_ms: 6,
            golden_speedup_ms: 10,
            min_tick_ms: 40,
            slow_step_ms: 40,
            slow_cap_ms: 60,
            effect_duration_ms: 6_000,
            golden_chance: 0.05,
            power_up_chance: 0.08,
            golden_ttl_ms: 8_000,
            power_up_ttl_ms: 12_000,
        }
    }
}

/// Errors produced when a configuration cannot host a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid {cols}x{rows} cannot hold a snake of length {length} plus food")]
    GridTooSmall {
        cols: usize,
        rows: usize,
        length: usize,
    },
    #[error("initial snake length must be at least 1")]
    EmptySnake,
    #[error("tick interval must be greater than zero")]
    ZeroTick,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Tick interval at the start of a run
    pub base_tick_ms: u32,
    /// Leaving the board re-enters on the opposite edge instead of ending the run
    pub wrap: bool,
    pub rules: Rules,
}

impl Default for GameConfig {
    fn default() -> Self {
        let (grid_width, grid_height) = BoardSize::default().dimensions();
        Self {
            grid_width,
            grid_height,
            base_tick_ms: Difficulty::default().base_tick_ms(),
            wrap: false,
            rules: Rules::default(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Build a configuration from the three settings presets
    pub fn from_presets(difficulty: Difficulty, board: BoardSize, wrap: bool) -> Self {
        let (width, height) = board.dimensions();
        Self {
            base_tick_ms: difficulty.base_tick_ms(),
            wrap,
            ..Self::new(width, height)
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_base_tick_ms(mut self, base_tick_ms: u32) -> Self {
        self.base_tick_ms = base_tick_ms;
        self
    }

    /// Check that the grid can hold the initial snake, centered and
    /// trailing left, with at least one free cell left for food.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let length = self.rules.initial_snake_length;
        if length == 0 {
            return Err(ConfigError::EmptySnake);
        }
        if self.base_tick_ms == 0 || self.rules.min_tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }

        let fits_row = self.grid_width / 2 + 1 >= length;
        let has_room = self.grid_width * self.grid_height > length;
        if self.grid_height == 0 || !fits_row || !has_room {
            return Err(ConfigError::GridTooSmall {
                cols: self.grid_width,
                rows: self.grid_height,
                length,
            });
        }

        Ok(())
    }
}
