use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, sleep_until};
use tracing::debug;

use crate::game::{Command, RunPhase, TickScheduler};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::progress::ProgressStore;
use crate::render::{Renderer, View};
use crate::session::Session;

/// Tick deadline driven by the tokio clock
#[derive(Debug, Default)]
pub struct TokioScheduler {
    deadline: Option<Instant>,
}

impl TokioScheduler {
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Resolves at the deadline, or never if there is none
async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

pub struct HumanMode<S: ProgressStore> {
    session: Session<S>,
    scheduler: TokioScheduler,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl<S: ProgressStore> HumanMode<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session,
            scheduler: TokioScheduler::default(),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result?;
        self.shutdown()
    }

    /// Quitting mid-run still credits what the run earned
    fn shutdown(&mut self) -> Result<()> {
        self.session.reset(&mut self.scheduler)
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            let deadline = self.scheduler.deadline();

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Game logic tick, at whatever interval the session last asked for
                _ = wait_for(deadline) => {
                    self.scheduler.cancel();
                    self.update_game()?;
                }

                // Render frame
                _ = render_timer.tick() => {
                    if self.session.state().phase == RunPhase::Running {
                        self.metrics.update();
                    }
                    let view = View {
                        state: self.session.state(),
                        progress: self.session.progress(),
                        metrics: &self.metrics,
                        last_run: self.session.last_run(),
                    };
                    let renderer = &self.renderer;
                    terminal.draw(|frame| {
                        renderer.render(frame, &view);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Command(command) => self.apply_command(command)?,
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn apply_command(&mut self, command: Command) -> Result<()> {
        let before = self.session.state().phase;
        self.session.apply(command, &mut self.scheduler)?;
        let after = self.session.state().phase;

        match (command, before, after) {
            (Command::Restart, _, _) | (Command::Start, RunPhase::NotStarted, RunPhase::Running) => {
                self.metrics.on_game_start()
            }
            (_, RunPhase::Running, RunPhase::Paused) => self.metrics.on_pause(),
            (_, RunPhase::Paused, RunPhase::Running) => self.metrics.on_resume(),
            _ => {}
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let result = self.session.tick(&mut self.scheduler)?;

        for event in &result.info.events {
            debug!(?event, "game event");
        }

        if result.info.end_reason.is_some() {
            self.metrics.on_game_over(self.session.state().score);
        }

        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
