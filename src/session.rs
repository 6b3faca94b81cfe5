//! A play session: one engine, the player's settings and progress, and the
//! store they are persisted to.
//!
//! The session is the only place where a tick is requested. After every
//! command or step it tells the [`TickScheduler`] whether (and how soon) the
//! next tick should happen. Progress is written only when a run ends or an
//! unfinished run is thrown away.

use anyhow::{Context, Result};
use tracing::info;

use crate::game::{
    Command, Direction, GameEngine, GameState, RunPhase, StepResult, TickScheduler,
};
use crate::progress::{
    leaderboard::now_ms, Progress, ProgressStore, RunReport, RunSummary, Settings,
};

/// Outcome of a finished run, as recorded into progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEnd {
    pub summary: RunSummary,
    pub report: RunReport,
}

pub struct Session<S: ProgressStore> {
    engine: GameEngine,
    settings: Settings,
    progress: Progress,
    store: S,
    player_name: Option<String>,
    last_run: Option<RunEnd>,
}

impl<S: ProgressStore> Session<S> {
    /// Open a session with whatever settings and progress `store` holds
    pub fn open(store: S, seed: Option<u64>) -> Result<Self> {
        let settings = store.settings_or_default();
        Self::with_settings(store, settings, seed)
    }

    /// Open a session with explicit settings, leaving the stored ones untouched
    pub fn with_settings(store: S, settings: Settings, seed: Option<u64>) -> Result<Self> {
        let progress = store.progress_or_default();
        let config = settings.game_config();
        let engine = match seed {
            Some(seed) => GameEngine::with_seed(config, seed),
            None => GameEngine::new(config),
        }
        .context("Failed to set up the board")?;

        Ok(Self {
            engine,
            settings,
            progress,
            store,
            player_name: None,
            last_run: None,
        })
    }

    /// Finished runs are submitted to the leaderboard under this name
    pub fn set_player_name(&mut self, name: Option<String>) {
        self.player_name = name.filter(|n| !n.trim().is_empty());
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The most recent finished run, until the next one starts
    pub fn last_run(&self) -> Option<&RunEnd> {
        self.last_run.as_ref()
    }

    pub fn apply(&mut self, command: Command, scheduler: &mut dyn TickScheduler) -> Result<()> {
        match command {
            Command::Turn(direction) => {
                self.turn(direction);
            }
            Command::Start => self.start(scheduler),
            Command::TogglePause => self.toggle_pause(scheduler),
            Command::Restart => self.restart(scheduler)?,
        }
        Ok(())
    }

    pub fn turn(&mut self, direction: Direction) -> bool {
        self.engine.set_direction(direction)
    }

    /// Start the run (or resume it) and ask for the first tick
    pub fn start(&mut self, scheduler: &mut dyn TickScheduler) {
        if self.engine.start() {
            self.last_run = None;
            scheduler.schedule(self.engine.tick_interval());
        }
    }

    pub fn toggle_pause(&mut self, scheduler: &mut dyn TickScheduler) {
        if !self.engine.toggle_pause() {
            return;
        }
        match self.engine.phase() {
            RunPhase::Running => scheduler.schedule(self.engine.tick_interval()),
            _ => scheduler.cancel(),
        }
    }

    /// Put a fresh board up without starting it.
    ///
    /// A run still in progress is recorded first: its coins, reached
    /// achievements and score count even though it never ended.
    pub fn reset(&mut self, scheduler: &mut dyn TickScheduler) -> Result<()> {
        scheduler.cancel();
        self.record_unfinished_run()?;
        self.engine
            .reset(self.settings.game_config())
            .context("Failed to reset the board")
    }

    /// Throw away the current run and start a new one right away
    pub fn restart(&mut self, scheduler: &mut dyn TickScheduler) -> Result<()> {
        self.reset(scheduler)?;
        self.start(scheduler);
        Ok(())
    }

    /// Advance the game by one step. Called when the scheduled tick fires.
    ///
    /// Schedules the next tick while the run continues. When the step ends
    /// the run, progress is updated and saved.
    pub fn tick(&mut self, scheduler: &mut dyn TickScheduler) -> Result<StepResult> {
        let result = self.engine.advance();

        if result.info.end_reason.is_some() {
            scheduler.cancel();
            self.finish_run()?;
        } else if self.engine.phase() == RunPhase::Running {
            scheduler.schedule(self.engine.tick_interval());
        }

        Ok(result)
    }

    fn finish_run(&mut self) -> Result<()> {
        let summary = RunSummary::from_state(self.engine.state());
        let report = self.progress.record_run(&summary);

        if let Some(name) = &self.player_name {
            self.progress
                .submit_score(name, summary.score, now_ms())
                .context("Failed to submit score")?;
        }

        self.save_run(&summary, &report, "run recorded")?;
        self.last_run = Some(RunEnd { summary, report });
        Ok(())
    }

    /// Running or paused runs that are thrown away still pay out.
    /// They are not submitted to the leaderboard.
    fn record_unfinished_run(&mut self) -> Result<()> {
        if !matches!(self.engine.phase(), RunPhase::Running | RunPhase::Paused) {
            return Ok(());
        }

        let summary = RunSummary::from_state(self.engine.state());
        if summary.score == 0 && summary.coins_earned == 0 && summary.achievements.is_empty() {
            return Ok(());
        }

        let report = self.progress.record_run(&summary);
        self.save_run(&summary, &report, "unfinished run recorded")
    }

    fn save_run(&mut self, summary: &RunSummary, report: &RunReport, message: &str) -> Result<()> {
        self.store
            .save_progress(&self.progress)
            .context("Failed to save progress")?;

        info!(
            score = summary.score,
            best = self.progress.best_score,
            new_best = report.new_best,
            coins = report.coins_credited,
            unlocked = report.newly_unlocked.len(),
            "{message}"
        );
        Ok(())
    }
}
