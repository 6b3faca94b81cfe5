use std::time::{Duration, Instant};

/// Play time and per-session tallies shown next to the board
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    /// Time spent paused since the run started
    pub paused_time: Duration,
    pub paused_at: Option<Instant>,
    pub session_best: u32,
    pub games_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            paused_time: Duration::ZERO,
            paused_at: None,
            session_best: 0,
            games_played: 0,
        }
    }

    /// Refresh the elapsed play time. Paused time does not count.
    pub fn update(&mut self) {
        let now = Instant::now();
        let paused = self.paused_time + self.paused_at.map_or(Duration::ZERO, |at| now - at);
        self.elapsed_time = (now - self.start_time).saturating_sub(paused);
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.paused_time = Duration::ZERO;
        self.paused_at = None;
    }

    pub fn on_pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    pub fn on_resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_time += at.elapsed();
        }
    }

    /// Freezes the clock until the next run starts
    pub fn on_game_over(&mut self, final_score: u32) {
        self.update();
        self.paused_at = Some(Instant::now());
        self.games_played += 1;
        if final_score > self.session_best {
            self.session_best = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
