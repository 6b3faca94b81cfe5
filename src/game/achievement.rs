use serde::{Deserialize, Serialize};

/// Milestones a run can reach. Unlocking (and the coin reward) happens in
/// [`Progress`](crate::progress::Progress) once the run is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    FirstBite,
    #[serde(rename = "score_10")]
    OnARoll,
    #[serde(rename = "score_25")]
    SnakeCharmer,
    #[serde(rename = "score_50")]
    NeoMaster,
    #[serde(rename = "golden_bite")]
    LuckyCatch,
    #[serde(rename = "first_power")]
    PowerPlayer,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstBite,
        Achievement::OnARoll,
        Achievement::SnakeCharmer,
        Achievement::NeoMaster,
        Achievement::LuckyCatch,
        Achievement::PowerPlayer,
    ];

    /// Score milestones checked each time regular food is eaten
    const SCORE_THRESHOLDS: [(u32, Achievement); 4] = [
        (1, Achievement::FirstBite),
        (10, Achievement::OnARoll),
        (25, Achievement::SnakeCharmer),
        (50, Achievement::NeoMaster),
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstBite => "First Bite",
            Achievement::OnARoll => "On a Roll",
            Achievement::SnakeCharmer => "Snake Charmer",
            Achievement::NeoMaster => "Neo Master",
            Achievement::LuckyCatch => "Lucky Catch",
            Achievement::PowerPlayer => "Power Player",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstBite => "Eat your first apple.",
            Achievement::OnARoll => "Reach score 10.",
            Achievement::SnakeCharmer => "Reach score 25.",
            Achievement::NeoMaster => "Reach score 50.",
            Achievement::LuckyCatch => "Eat a golden fruit.",
            Achievement::PowerPlayer => "Collect your first power-up.",
        }
    }

    /// All score milestones at or below `score`
    pub fn reached_at_score(score: u32) -> impl Iterator<Item = Achievement> {
        Self::SCORE_THRESHOLDS
            .into_iter()
            .filter(move |(threshold, _)| score >= *threshold)
            .map(|(_, achievement)| achievement)
    }
}
