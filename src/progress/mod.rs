//! Long-lived player progress: best score, coins, achievements, the local
//! leaderboard and owned skins.
//!
//! The game core never touches this directly. When a run ends, the session
//! hands a [`RunSummary`] to [`Progress::record_run`] and persists the result
//! through a [`ProgressStore`](store::ProgressStore).

pub mod leaderboard;
pub mod settings;
pub mod shop;
pub mod store;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::game::{Achievement, EndReason, GameState};

pub use leaderboard::{LeaderboardEntry, LEADERBOARD_LIMIT};
pub use settings::Settings;
pub use shop::{PurchaseOutcome, Skin};
pub use store::{JsonFileStore, MemoryStore, ProgressStore, StoreError};

/// Coins credited the first time an achievement is unlocked
pub const ACHIEVEMENT_REWARD: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("{0} skin is not owned")]
    SkinNotOwned(Skin),
    #[error("{skin} skin costs {price} coins, only {balance} available")]
    InsufficientCoins { skin: Skin, price: u32, balance: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub best_score: u32,
    pub coins: u32,
    pub achievements: BTreeSet<Achievement>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub owned_skins: BTreeSet<Skin>,
    pub equipped_skin: Skin,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            best_score: 0,
            coins: 0,
            achievements: BTreeSet::new(),
            leaderboard: Vec::new(),
            owned_skins: BTreeSet::from([Skin::Neon]),
            equipped_skin: Skin::Neon,
        }
    }
}

/// What a finished run contributes to progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub score: u32,
    pub coins_earned: u32,
    pub achievements: BTreeSet<Achievement>,
    pub end_reason: Option<EndReason>,
}

impl RunSummary {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            score: state.score,
            coins_earned: state.coins_earned,
            achievements: state.achievements.clone(),
            end_reason: state.end_reason,
        }
    }
}

/// Changes made by [`Progress::record_run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub new_best: bool,
    pub newly_unlocked: Vec<Achievement>,
    pub coins_credited: u32,
}

impl Progress {
    /// Fold a finished run into progress: best score, run coins, and newly
    /// unlocked achievements with their reward.
    pub fn record_run(&mut self, run: &RunSummary) -> RunReport {
        let mut report = RunReport {
            new_best: run.score > self.best_score,
            newly_unlocked: Vec::new(),
            coins_credited: run.coins_earned,
        };

        if report.new_best {
            self.best_score = run.score;
        }

        for achievement in &run.achievements {
            if self.achievements.insert(*achievement) {
                report.newly_unlocked.push(*achievement);
                report.coins_credited += ACHIEVEMENT_REWARD;
            }
        }

        self.coins = self.coins.saturating_add(report.coins_credited);
        report
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }

    /// Forget everything: scores, coins, achievements, leaderboard and skins
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(score: u32, coins: u32, achievements: &[Achievement]) -> RunSummary {
        RunSummary {
            score,
            coins_earned: coins,
            achievements: achievements.iter().copied().collect(),
            end_reason: Some(EndReason::Wall),
        }
    }

    #[test]
    fn test_default_progress() {
        let progress = Progress::default();
        assert_eq!(progress.best_score, 0);
        assert_eq!(progress.coins, 0);
        assert!(progress.owned_skins.contains(&Skin::Neon));
        assert_eq!(progress.equipped_skin, Skin::Neon);
    }

    #[test]
    fn test_record_run_updates_best_and_coins() {
        let mut progress = Progress::default();

        let report = progress.record_run(&run(12, 16, &[Achievement::FirstBite]));
        assert!(report.new_best);
        assert_eq!(report.newly_unlocked, vec![Achievement::FirstBite]);
        assert_eq!(report.coins_credited, 16 + ACHIEVEMENT_REWARD);
        assert_eq!(progress.best_score, 12);
        assert_eq!(progress.coins, 26);

        // Lower score, same achievement: no new best, no second reward
        let report = progress.record_run(&run(3, 3, &[Achievement::FirstBite]));
        assert!(!report.new_best);
        assert!(report.newly_unlocked.is_empty());
        assert_eq!(progress.best_score, 12);
        assert_eq!(progress.coins, 29);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut progress = Progress::default();
        progress.record_run(&run(30, 30, &[Achievement::SnakeCharmer]));
        progress.reset();
        assert_eq!(progress, Progress::default());
    }

    #[test]
    fn test_progress_json_round_trip_keeps_ids() {
        let mut progress = Progress::default();
        progress.record_run(&run(5, 5, &[Achievement::LuckyCatch]));

        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("golden_bite"));
        assert!(json.contains("\"neon\""));

        let restored: Progress = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, progress);
    }
}
