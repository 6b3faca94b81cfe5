use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Progress, ProgressError};

/// Number of entries shown on the local leaderboard
pub const LEADERBOARD_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl Progress {
    /// Add a score under `name`. Names are trimmed; blank names are rejected.
    pub fn submit_score(
        &mut self,
        name: &str,
        score: u32,
        timestamp_ms: u64,
    ) -> Result<&LeaderboardEntry, ProgressError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProgressError::EmptyName);
        }

        self.leaderboard.push(LeaderboardEntry {
            name: name.to_string(),
            score,
            timestamp_ms,
        });
        Ok(&self.leaderboard[self.leaderboard.len() - 1])
    }

    /// Highest scores first. Ties keep submission order.
    pub fn top_scores(&self, limit: usize) -> Vec<&LeaderboardEntry> {
        let mut entries: Vec<&LeaderboardEntry> = self.leaderboard.iter().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(limit);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_rejects_blank_names() {
        let mut progress = Progress::default();
        assert_eq!(
            progress.submit_score("   ", 10, 0),
            Err(ProgressError::EmptyName)
        );
        assert!(progress.leaderboard.is_empty());

        let entry = progress.submit_score("  ada ", 10, 1_700_000_000_000).unwrap();
        assert_eq!(entry.name, "ada");
    }

    #[test]
    fn test_top_scores_sorted_and_limited() {
        let mut progress = Progress::default();
        progress.submit_score("a", 5, 1).unwrap();
        progress.submit_score("b", 12, 2).unwrap();
        progress.submit_score("c", 12, 3).unwrap();
        progress.submit_score("d", 1, 4).unwrap();

        let top = progress.top_scores(3);
        let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);

        for i in 0..30 {
            progress.submit_score("bulk", i, 10 + u64::from(i)).unwrap();
        }
        assert_eq!(progress.top_scores(LEADERBOARD_LIMIT).len(), LEADERBOARD_LIMIT);
        assert_eq!(progress.top_scores(LEADERBOARD_LIMIT)[0].score, 29);
    }
}
