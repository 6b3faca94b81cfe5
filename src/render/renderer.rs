use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Position, RunPhase};
use crate::metrics::GameMetrics;
use crate::progress::{Progress, Skin};
use crate::session::RunEnd;

/// Everything a frame shows. The renderer only reads it.
pub struct View<'a> {
    pub state: &'a GameState,
    pub progress: &'a Progress,
    pub metrics: &'a GameMetrics,
    pub last_run: Option<&'a RunEnd>,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &View<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], view);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(5),
                Constraint::Percentage(90),
                Constraint::Percentage(5),
            ])
            .split(chunks[1])[1];

        if view.state.is_alive() {
            if grid_fits(game_area, view.state) {
                let grid = self.render_grid(game_area, view.state, view.progress.equipped_skin);
                frame.render_widget(grid, game_area);
            } else {
                let warning = self.render_too_small(game_area, view.state);
                frame.render_widget(warning, game_area);
            }
        } else {
            let game_over = self.render_game_over(game_area, view);
            frame.render_widget(game_over, game_area);
        }

        let controls = self.render_controls(chunks[2], view.state.phase);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, state: &GameState, skin: Skin) -> Paragraph<'_> {
        let (head_color, body_color) = skin_colors(skin);
        let shielded = state.is_shielded();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    let color = if shielded { Color::LightBlue } else { head_color };
                    Span::styled(
                        "■ ",
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.contains(pos) {
                    Span::styled("□ ", Style::default().fg(body_color))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else if state.golden.is_some_and(|g| g.position == pos) {
                    Span::styled(
                        "$ ",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if let Some(power_up) = state.power_up.filter(|p| p.position == pos) {
                    Span::styled(
                        format!("{} ", power_up.kind.symbol()),
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::LightGreen)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let (title, border) = match state.phase {
            RunPhase::NotStarted => (" Ready: press Space ", Color::Green),
            RunPhase::Paused => (" Paused ", Color::Yellow),
            _ => (" Snake Neo ", Color::White),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_too_small(&self, area: Rect, state: &GameState) -> Paragraph<'_> {
        let (width, height) = grid_size(state);
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Terminal too small",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "Board needs {}x{}, have {}x{}",
                width, height, area.width, area.height
            )),
            Line::from("Enlarge the window or play with --board small"),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_stats(&self, _area: Rect, view: &View<'_>) -> Paragraph<'_> {
        let state = view.state;
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Score: ", label),
            Span::styled(
                state.score.to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(view.progress.best_score.max(state.score).to_string(), value),
            Span::raw("    "),
            Span::styled("Coins: ", label),
            Span::styled(
                (view.progress.coins + state.coins_earned).to_string(),
                value,
            ),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(format_speed(state.speed_multiplier()), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(view.metrics.format_time(), value),
        ];

        if let (Some(effect), Some(remaining)) = (state.active_effect, state.effect_remaining_ms()) {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                format!("{} {:.1}s", effect.kind.label(), remaining as f32 / 1000.0),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, view: &View<'_>) -> Paragraph<'_> {
        let state = view.state;
        let reason = state
            .end_reason
            .map(|reason| format!("The snake {reason}"))
            .unwrap_or_default();

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if let Some(run) = view.last_run {
            if run.report.new_best {
                text.push(Line::from(Span::styled(
                    "New best!",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            text.push(Line::from(format!(
                "+{} coins",
                run.report.coins_credited
            )));
            for achievement in &run.report.newly_unlocked {
                text.push(Line::from(Span::styled(
                    format!("Achievement unlocked: {}", achievement.name()),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }

        text.push(Line::from(vec![
            Span::styled("Session best: ", Style::default().fg(Color::Yellow)),
            Span::raw(view.metrics.session_best.to_string()),
            Span::styled("    Games: ", Style::default().fg(Color::Yellow)),
            Span::raw(view.metrics.games_played.to_string()),
        ]));

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect, phase: RunPhase) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
        ];

        if phase == RunPhase::NotStarted {
            spans.push(Span::styled("Space", Style::default().fg(Color::Green)));
            spans.push(Span::raw(" to start | "));
        } else {
            spans.push(Span::styled("P", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" to pause | "));
        }

        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Columns and rows the bordered grid takes: two columns per cell
fn grid_size(state: &GameState) -> (usize, usize) {
    (state.grid_width * 2 + 2, state.grid_height + 2)
}

fn grid_fits(area: Rect, state: &GameState) -> bool {
    let (width, height) = grid_size(state);
    usize::from(area.width) >= width && usize::from(area.height) >= height
}

/// (head, body) colors for a skin
fn skin_colors(skin: Skin) -> (Color, Color) {
    match skin {
        Skin::Neon => (Color::Cyan, Color::LightCyan),
        Skin::Emerald => (Color::LightGreen, Color::Green),
        Skin::Sunset => (Color::LightRed, Color::Rgb(255, 154, 118)),
    }
}

/// "1x", "1.4x": one decimal, trailing ".0" dropped
fn format_speed(multiplier: f32) -> String {
    let text = format!("{:.1}", multiplier);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}x")
}
