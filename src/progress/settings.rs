use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::game::{BoardSize, Difficulty, GameConfig};

/// Player-facing settings, persisted between sessions.
///
/// Each field is read on its own: an unknown or mistyped value falls back to
/// that field's default and leaves the others as saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "difficulty_or_default")]
    pub difficulty: Difficulty,
    #[serde(deserialize_with = "board_size_or_default")]
    pub board_size: BoardSize,
    /// Leaving the board re-enters on the opposite edge
    #[serde(deserialize_with = "wrap_or_default")]
    pub wrap: bool,
}

impl Settings {
    /// Game configuration for the next run
    pub fn game_config(&self) -> GameConfig {
        GameConfig::from_presets(self.difficulty, self.board_size, self.wrap)
    }
}

fn difficulty_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Difficulty, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(Difficulty::parse).unwrap_or_else(|| {
        warn!(%value, "ignoring unknown difficulty in settings");
        Difficulty::default()
    }))
}

fn board_size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BoardSize, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(BoardSize::parse).unwrap_or_else(|| {
        warn!(%value, "ignoring unknown board size in settings");
        BoardSize::default()
    }))
}

fn wrap_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or_else(|| {
        warn!(%value, "ignoring non-boolean wrap in settings");
        false
    }))
}
