use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info};

use super::{
    achievement::Achievement,
    action::Direction,
    config::{ConfigError, GameConfig},
    spawn::random_free_cell,
    state::{
        ActiveEffect, EndReason, GameState, GoldenFruit, Position, PowerKind, PowerUp, RunPhase,
        Snake,
    },
};

/// Collectible consumed during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pickup {
    Food,
    Golden,
    PowerUp(PowerKind),
}

/// Side effects of a step that a frontend may want to surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The active Shield let the head pass through the body
    ShieldAbsorbed,
    GoldenSpawned(Position),
    PowerUpSpawned { kind: PowerKind, position: Position },
    GoldenExpired,
    PowerUpExpired,
    EffectExpired(PowerKind),
    /// First time this run that a milestone was reached
    AchievementReached(Achievement),
}

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    pub pickup: Option<Pickup>,
    /// Set only on the step that ended the run
    pub end_reason: Option<EndReason>,
    pub events: Vec<GameEvent>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the run is over
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn idle(terminated: bool) -> Self {
        Self {
            terminated,
            info: StepInfo::default(),
        }
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    state: GameState,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a reproducible random sequence
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    /// Resume from a prepared state instead of a fresh board
    pub fn from_state(config: GameConfig, state: GameState, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            state,
        }
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        let state = Self::initial_state(&config, &mut rng)?;
        Ok(Self { config, rng, state })
    }

    fn initial_state(config: &GameConfig, rng: &mut StdRng) -> Result<GameState, ConfigError> {
        config.validate()?;

        let center_x = (config.grid_width / 2) as i32;
        let center_y = (config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            config.rules.initial_snake_length,
        );

        let food = random_free_cell(rng, config.grid_width, config.grid_height, |pos| {
            snake.contains(pos)
        })
        .ok_or(ConfigError::GridTooSmall {
            cols: config.grid_width,
            rows: config.grid_height,
            length: config.rules.initial_snake_length,
        })?;

        Ok(GameState::new(snake, food, config))
    }

    /// Discard the current run and set up a new board for `config`
    pub fn reset(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        self.state = Self::initial_state(&config, &mut self.rng)?;
        self.config = config;
        debug!(
            width = self.config.grid_width,
            height = self.config.grid_height,
            tick_ms = self.config.base_tick_ms,
            wrap = self.config.wrap,
            "board reset"
        );
        Ok(())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    /// Delay the driver should wait before the next [`advance`](Self::advance)
    pub fn tick_interval(&self) -> Duration {
        self.state.tick_interval()
    }

    /// Begin a fresh run or resume a paused one. Returns false if nothing changed.
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            RunPhase::NotStarted | RunPhase::Paused => {
                if self.state.phase == RunPhase::NotStarted {
                    info!(
                        width = self.state.grid_width,
                        height = self.state.grid_height,
                        tick_ms = self.state.tick_ms,
                        wrap = self.state.wrap,
                        "run started"
                    );
                }
                self.state.phase = RunPhase::Running;
                true
            }
            RunPhase::Running | RunPhase::Ended => false,
        }
    }

    /// Pause a running game or resume a paused one. Returns false if nothing changed.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.phase = match self.state.phase {
            RunPhase::Running => RunPhase::Paused,
            RunPhase::Paused => RunPhase::Running,
            RunPhase::NotStarted | RunPhase::Ended => return false,
        };
        true
    }

    /// Queue a direction change for the next step.
    ///
    /// A reversal of the current direction is ignored. The check is against
    /// the direction the snake is moving in now, not the queued one, so the
    /// last accepted request before a step wins.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.state.snake.direction.is_opposite(direction) {
            return false;
        }
        self.state.pending_direction = direction;
        true
    }

    /// Execute one step of the game
    pub fn advance(&mut self) -> StepResult {
        if self.state.phase != RunPhase::Running {
            return StepResult::idle(self.state.phase == RunPhase::Ended);
        }

        let Self { config, rng, state } = self;
        let mut info = StepInfo::default();

        state.steps += 1;
        state.clock_ms += u64::from(state.tick_ms);

        if state.pending_direction.is_turn_from(state.snake.direction) {
            state.snake.direction = state.pending_direction;
        }

        let mut new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if state.wrap {
            new_head = new_head.wrapped(state.grid_width, state.grid_height);
        } else if !state.is_in_bounds(new_head) {
            return Self::end_run(state, EndReason::Wall, info);
        }

        if state.snake.contains(new_head) {
            if !state.is_shielded() {
                return Self::end_run(state, EndReason::SelfCollision, info);
            }
            info.events.push(GameEvent::ShieldAbsorbed);
        }

        state.snake.push_head(new_head);

        if new_head == state.food {
            info.pickup = Some(Pickup::Food);
            if !Self::eat_food(config, rng, state, &mut info.events) {
                return Self::end_run(state, EndReason::BoardFilled, info);
            }
        } else if state.golden.is_some_and(|golden| golden.position == new_head) {
            info.pickup = Some(Pickup::Golden);
            Self::eat_golden(config, state, &mut info.events);
        } else if let Some(power_up) = state.power_up.filter(|p| p.position == new_head) {
            info.pickup = Some(Pickup::PowerUp(power_up.kind));
            state.power_up = None;
            Self::activate_power(config, state, power_up.kind, &mut info.events);
        } else {
            state.snake.pop_tail();
        }

        Self::tick_down(state, &mut info.events);

        StepResult {
            terminated: false,
            info,
        }
    }

    /// Returns false when no free cell was left for the new food
    fn eat_food(
        config: &GameConfig,
        rng: &mut StdRng,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let rules = &config.rules;
        state.score += rules.food_score;
        state.coins_earned += rules.food_score;
        state.tick_ms = speed_up(state.tick_ms, rules.food_speedup_ms, rules.min_tick_ms);

        for achievement in Achievement::reached_at_score(state.score) {
            reach(state, achievement, events);
        }

        // Collectible cells are a last resort for food
        let golden_cell = state.golden.map(|g| g.position);
        let power_cell = state.power_up.map(|p| p.position);
        let food = random_free_cell(rng, state.grid_width, state.grid_height, |pos| {
            state.snake.contains(pos) || Some(pos) == golden_cell || Some(pos) == power_cell
        })
        .or_else(|| {
            random_free_cell(rng, state.grid_width, state.grid_height, |pos| {
                state.snake.contains(pos)
            })
        });
        let Some(food) = food else {
            return false;
        };
        state.food = food;

        if state.golden.is_none() && roll(rng, rules.golden_chance) {
            if let Some(position) =
                random_free_cell(rng, state.grid_width, state.grid_height, |pos| {
                    state.snake.contains(pos) || pos == state.food || Some(pos) == power_cell
                })
            {
                state.golden = Some(GoldenFruit {
                    position,
                    ttl_ms: i64::from(rules.golden_ttl_ms),
                });
                debug!(x = position.x, y = position.y, "golden fruit spawned");
                events.push(GameEvent::GoldenSpawned(position));
            }
        }

        if state.power_up.is_none() && roll(rng, rules.power_up_chance) {
            let kind = PowerKind::ALL[rng.gen_range(0..PowerKind::ALL.len())];
            let golden_cell = state.golden.map(|g| g.position);
            if let Some(position) =
                random_free_cell(rng, state.grid_width, state.grid_height, |pos| {
                    state.snake.contains(pos) || pos == state.food || Some(pos) == golden_cell
                })
            {
                state.power_up = Some(PowerUp {
                    position,
                    kind,
                    ttl_ms: i64::from(rules.power_up_ttl_ms),
                });
                debug!(kind = kind.label(), x = position.x, y = position.y, "power-up spawned");
                events.push(GameEvent::PowerUpSpawned { kind, position });
            }
        }

        true
    }

    fn eat_golden(config: &GameConfig, state: &mut GameState, events: &mut Vec<GameEvent>) {
        let rules = &config.rules;
        state.score += rules.golden_score;
        state.coins_earned += rules.golden_score;
        state.golden = None;
        state.tick_ms = speed_up(state.tick_ms, rules.golden_speedup_ms, rules.min_tick_ms);
        reach(state, Achievement::LuckyCatch, events);
    }

    /// Apply a collected power-up. The new effect replaces whatever was active.
    fn activate_power(
        config: &GameConfig,
        state: &mut GameState,
        kind: PowerKind,
        events: &mut Vec<GameEvent>,
    ) {
        let rules = &config.rules;
        state.active_effect = Some(ActiveEffect {
            kind,
            expires_at_ms: state.clock_ms + rules.effect_duration_ms,
        });

        match kind {
            PowerKind::Slow => {
                let cap = state.base_tick_ms + rules.slow_cap_ms;
                state.tick_ms = (state.tick_ms + rules.slow_step_ms).min(cap);
            }
            PowerKind::Shrink => state.snake.shrink(2),
            // Checked on collision
            PowerKind::Shield => {}
        }

        debug!(kind = kind.label(), tick_ms = state.tick_ms, "power-up collected");
        reach(state, Achievement::PowerPlayer, events);
    }

    /// Count down collectible lifetimes and the active effect
    fn tick_down(state: &mut GameState, events: &mut Vec<GameEvent>) {
        let elapsed = i64::from(state.tick_ms);

        if let Some(golden) = state.golden.as_mut() {
            golden.ttl_ms -= elapsed;
            if golden.ttl_ms <= 0 {
                state.golden = None;
                events.push(GameEvent::GoldenExpired);
            }
        }

        if let Some(power_up) = state.power_up.as_mut() {
            power_up.ttl_ms -= elapsed;
            if power_up.ttl_ms <= 0 {
                state.power_up = None;
                events.push(GameEvent::PowerUpExpired);
            }
        }

        if let Some(effect) = state.active_effect {
            if state.clock_ms > effect.expires_at_ms {
                state.active_effect = None;
                events.push(GameEvent::EffectExpired(effect.kind));
            }
        }
    }

    fn end_run(state: &mut GameState, reason: EndReason, mut info: StepInfo) -> StepResult {
        state.phase = RunPhase::Ended;
        state.end_reason = Some(reason);
        info.end_reason = Some(reason);
        info!(
            score = state.score,
            length = state.snake.len(),
            steps = state.steps,
            %reason,
            "run ended"
        );
        StepResult {
            terminated: true,
            info,
        }
    }
}

fn speed_up(tick_ms: u32, step_ms: u32, min_tick_ms: u32) -> u32 {
    tick_ms.saturating_sub(step_ms).max(min_tick_ms)
}

fn roll(rng: &mut StdRng, chance: f64) -> bool {
    rng.gen::<f64>() < chance
}

fn reach(state: &mut GameState, achievement: Achievement, events: &mut Vec<GameEvent>) {
    if state.achievements.insert(achievement) {
        events.push(GameEvent::AchievementReached(achievement));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Snake of length 5 at (5,5) heading right, food tucked away in a corner
    fn running_engine(config: GameConfig) -> GameEngine {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let state = GameState::new(snake, Position::new(0, 0), &config);
        let mut engine = GameEngine::from_state(config, state, 7);
        engine.start();
        engine
    }

    fn food_ahead(engine: &mut GameEngine) {
        let state = &mut engine.state;
        state.food = state.snake.head().moved_in_direction(state.snake.direction);
    }

    #[test]
    fn test_reset() {
        let engine = GameEngine::with_seed(GameConfig::default(), 1).unwrap();
        let state = engine.state();

        assert!(state.is_alive());
        assert_eq!(state.phase, RunPhase::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.snake.len(), 5);
        assert_eq!(state.snake.head(), Position::new(20, 15));
        assert_eq!(state.snake.tail(), Position::new(16, 15));
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(!state.is_occupied_by_snake(state.food));
        assert!(state.golden.is_none() && state.power_up.is_none());
        assert!(state.active_effect.is_none());
        assert_eq!(state.tick_ms, 110);
    }

    #[test]
    fn test_reset_rejects_tiny_grid() {
        assert!(GameEngine::new(GameConfig::new(4, 4)).is_err());

        let mut engine = GameEngine::with_seed(GameConfig::small(), 3).unwrap();
        assert!(engine.reset(GameConfig::new(3, 3)).is_err());
        // Failed reset leaves the previous board alone
        assert_eq!(engine.config().grid_width, 10);
    }

    #[test]
    fn test_reset_replaces_run() {
        let mut engine = running_engine(GameConfig::small());
        food_ahead(&mut engine);
        engine.advance();
        assert_eq!(engine.state().score, 1);

        engine.reset(GameConfig::small().with_wrap(true)).unwrap();
        let state = engine.state();
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, RunPhase::NotStarted);
        assert!(state.wrap);
        assert!(state.achievements.is_empty());
    }

    #[test]
    fn test_advance_requires_running() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 2).unwrap();
        let before = engine.state().clone();

        let result = engine.advance();
        assert!(!result.terminated);
        assert_eq!(engine.state(), &before);

        engine.start();
        engine.toggle_pause();
        assert_eq!(engine.phase(), RunPhase::Paused);
        engine.advance();
        assert_eq!(engine.state().steps, 0);

        engine.toggle_pause();
        engine.advance();
        assert_eq!(engine.state().steps, 1);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = running_engine(GameConfig::small());
        let initial_head = engine.state().snake.head();

        let result = engine.advance();

        assert!(!result.terminated);
        assert_eq!(result.info.pickup, None);
        assert_eq!(engine.state().steps, 1);
        assert_eq!(engine.state().snake.head(), initial_head.moved_by(1, 0));
        assert_eq!(engine.state().snake.len(), 5);
        assert_eq!(engine.state().clock_ms, 110);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = running_engine(GameConfig::small());
        food_ahead(&mut engine);
        let initial_length = engine.state().snake.len();

        let result = engine.advance();
        let state = engine.state();

        assert_eq!(result.info.pickup, Some(Pickup::Food));
        assert_eq!(state.score, 1);
        assert_eq!(state.coins_earned, 1);
        assert_eq!(state.snake.len(), initial_length + 1);
        assert!(!state.is_occupied_by_snake(state.food));
        assert_eq!(state.tick_ms, 104);
        assert!(result
            .info
            .events
            .contains(&GameEvent::AchievementReached(Achievement::FirstBite)));
    }

    #[test]
    fn test_wall_collision_after_five_steps() {
        let mut engine = running_engine(GameConfig::small());

        for _ in 0..4 {
            assert!(!engine.advance().terminated);
        }
        assert_eq!(engine.state().snake.head(), Position::new(9, 5));

        let result = engine.advance();
        assert!(result.terminated);
        assert_eq!(result.info.end_reason, Some(EndReason::Wall));
        assert!(!engine.state().is_alive());
        // The head never left the board
        assert_eq!(engine.state().snake.head(), Position::new(9, 5));
    }

    #[test]
    fn test_wrap_around() {
        let mut engine = running_engine(GameConfig::small().with_wrap(true));

        for _ in 0..5 {
            assert!(!engine.advance().terminated);
        }
        assert_eq!(engine.state().snake.head(), Position::new(0, 5));

        engine.set_direction(Direction::Up);
        for _ in 0..6 {
            engine.advance();
        }
        assert_eq!(engine.state().snake.head(), Position::new(0, 9));
        assert!(engine.state().is_alive());
    }

    #[test]
    fn test_self_collision() {
        let mut engine = running_engine(GameConfig::small());

        // (5,5) right, body trailing to (1,5): loop down, left, up into (4,5)
        engine.set_direction(Direction::Down);
        engine.advance();
        engine.set_direction(Direction::Left);
        engine.advance();
        engine.set_direction(Direction::Up);
        let result = engine.advance();

        assert!(result.terminated);
        assert_eq!(result.info.end_reason, Some(EndReason::SelfCollision));
    }

    #[test]
    fn test_shield_absorbs_self_collision() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.active_effect = Some(ActiveEffect {
            kind: PowerKind::Shield,
            expires_at_ms: 60_000,
        });

        engine.set_direction(Direction::Down);
        engine.advance();
        engine.set_direction(Direction::Left);
        engine.advance();
        engine.set_direction(Direction::Up);
        let result = engine.advance();

        assert!(!result.terminated);
        assert!(result.info.events.contains(&GameEvent::ShieldAbsorbed));
        assert_eq!(engine.state().snake.head(), Position::new(4, 5));
        assert_eq!(engine.state().snake.len(), 5);
        // Shield stays up until its timer runs out
        assert!(engine.state().is_shielded());

        assert!(!engine.advance().terminated);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = running_engine(GameConfig::small());

        assert!(!engine.set_direction(Direction::Left));
        engine.advance();

        assert_eq!(engine.state().snake.direction, Direction::Right);
        assert_eq!(engine.state().snake.head(), Position::new(6, 5));
    }

    #[test]
    fn test_reversal_checked_against_current_direction() {
        let mut engine = running_engine(GameConfig::small());

        // Within one tick, Up then Left: Left reverses the live direction
        assert!(engine.set_direction(Direction::Up));
        assert!(!engine.set_direction(Direction::Left));
        engine.advance();
        assert_eq!(engine.state().snake.direction, Direction::Up);

        // Across two ticks the reversal goes through
        assert!(engine.set_direction(Direction::Left));
        engine.advance();
        assert_eq!(engine.state().snake.direction, Direction::Left);
        assert_eq!(engine.state().snake.head(), Position::new(4, 4));
    }

    #[test]
    fn test_last_direction_before_tick_wins() {
        let mut engine = running_engine(GameConfig::small());
        engine.set_direction(Direction::Up);
        engine.set_direction(Direction::Down);
        engine.advance();
        assert_eq!(engine.state().snake.head(), Position::new(5, 6));
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = running_engine(GameConfig::small());
        while !engine.advance().terminated {}
        let steps_before = engine.state().steps;

        let result = engine.advance();

        assert!(result.terminated);
        assert_eq!(result.info.end_reason, None);
        assert_eq!(engine.state().steps, steps_before);
        assert!(!engine.start());
        assert!(!engine.toggle_pause());
    }

    #[test]
    fn test_golden_fruit_pickup() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.golden = Some(GoldenFruit {
            position: Position::new(6, 5),
            ttl_ms: 8_000,
        });

        let result = engine.advance();
        let state = engine.state();

        assert_eq!(result.info.pickup, Some(Pickup::Golden));
        assert_eq!(state.score, 5);
        assert_eq!(state.coins_earned, 5);
        assert_eq!(state.snake.len(), 6);
        assert_eq!(state.tick_ms, 100);
        assert!(state.golden.is_none());
        assert!(state.achievements.contains(&Achievement::LuckyCatch));
    }

    #[test]
    fn test_food_takes_priority_over_golden() {
        let mut engine = running_engine(GameConfig::small());
        food_ahead(&mut engine);
        engine.state.golden = Some(GoldenFruit {
            position: Position::new(6, 5),
            ttl_ms: 8_000,
        });

        let result = engine.advance();
        assert_eq!(result.info.pickup, Some(Pickup::Food));
        assert_eq!(engine.state().score, 1);
    }

    #[test]
    fn test_tick_interval_clamped_at_floor() {
        let mut engine = running_engine(GameConfig::small().with_wrap(true));
        engine.state.tick_ms = 43;

        food_ahead(&mut engine);
        engine.advance();
        assert_eq!(engine.state().tick_ms, 40);

        food_ahead(&mut engine);
        engine.advance();
        assert_eq!(engine.state().tick_ms, 40);
    }

    #[test]
    fn test_slow_power_up_is_bounded() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.tick_ms = 100;
        engine.state.power_up = Some(PowerUp {
            position: Position::new(6, 5),
            kind: PowerKind::Slow,
            ttl_ms: 12_000,
        });

        let result = engine.advance();
        assert_eq!(result.info.pickup, Some(Pickup::PowerUp(PowerKind::Slow)));
        assert_eq!(engine.state().tick_ms, 140);
        assert!(engine.state().power_up.is_none());
        assert!(engine.state().achievements.contains(&Achievement::PowerPlayer));

        engine.state.tick_ms = 150;
        engine.state.power_up = Some(PowerUp {
            position: Position::new(7, 5),
            kind: PowerKind::Slow,
            ttl_ms: 12_000,
        });
        engine.advance();
        assert_eq!(engine.state().tick_ms, 170);
    }

    #[test]
    fn test_shrink_power_up() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.power_up = Some(PowerUp {
            position: Position::new(6, 5),
            kind: PowerKind::Shrink,
            ttl_ms: 12_000,
        });

        engine.advance();

        // Head added, two tail cells removed
        assert_eq!(engine.state().snake.len(), 4);
        assert_eq!(engine.state().snake.head(), Position::new(6, 5));
        assert_eq!(engine.state().snake.tail(), Position::new(3, 5));
    }

    #[test]
    fn test_new_power_up_replaces_effect() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.active_effect = Some(ActiveEffect {
            kind: PowerKind::Shield,
            expires_at_ms: 60_000,
        });
        engine.state.power_up = Some(PowerUp {
            position: Position::new(6, 5),
            kind: PowerKind::Slow,
            ttl_ms: 12_000,
        });

        engine.advance();

        let effect = engine.state().active_effect.unwrap();
        assert_eq!(effect.kind, PowerKind::Slow);
        assert_eq!(effect.expires_at_ms, 110 + 6_000);
        assert!(!engine.state().is_shielded());
    }

    #[test]
    fn test_effect_expires_on_game_clock() {
        let mut engine = running_engine(GameConfig::small().with_wrap(true));
        engine.state.active_effect = Some(ActiveEffect {
            kind: PowerKind::Shield,
            expires_at_ms: 300,
        });

        engine.advance(); // clock 110
        engine.advance(); // clock 220
        assert!(engine.state().is_shielded());

        let result = engine.advance(); // clock 330
        assert!(engine.state().active_effect.is_none());
        assert!(result
            .info
            .events
            .contains(&GameEvent::EffectExpired(PowerKind::Shield)));
    }

    #[test]
    fn test_collectibles_expire() {
        let mut engine = running_engine(GameConfig::small().with_wrap(true));
        engine.state.golden = Some(GoldenFruit {
            position: Position::new(0, 0),
            ttl_ms: 220,
        });
        engine.state.food = Position::new(9, 9);
        engine.state.power_up = Some(PowerUp {
            position: Position::new(0, 9),
            kind: PowerKind::Shield,
            ttl_ms: 250,
        });

        engine.advance();
        assert!(engine.state().golden.is_some());
        let result = engine.advance();
        assert!(engine.state().golden.is_none());
        assert!(result.info.events.contains(&GameEvent::GoldenExpired));
        assert!(engine.state().power_up.is_some());

        let result = engine.advance();
        assert!(engine.state().power_up.is_none());
        assert!(result.info.events.contains(&GameEvent::PowerUpExpired));
    }

    #[test]
    fn test_spawned_collectibles_avoid_snake_and_food() {
        for seed in 0..50 {
            let mut config = GameConfig::small();
            config.rules.golden_chance = 1.0;
            config.rules.power_up_chance = 1.0;

            let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
            let mut state = GameState::new(snake, Position::new(6, 5), &config);
            state.phase = RunPhase::Running;
            let mut engine = GameEngine::from_state(config, state, seed);

            let result = engine.advance();
            let state = engine.state();

            let golden = state.golden.expect("golden fruit always spawns");
            let power_up = state.power_up.expect("power-up always spawns");
            assert!(!state.is_occupied_by_snake(golden.position));
            assert!(!state.is_occupied_by_snake(power_up.position));
            assert_ne!(golden.position, state.food);
            assert_ne!(power_up.position, state.food);
            assert_ne!(golden.position, power_up.position);
            assert!(result
                .info
                .events
                .contains(&GameEvent::GoldenSpawned(golden.position)));
        }
    }

    #[test]
    fn test_score_achievements() {
        let mut engine = running_engine(GameConfig::small().with_wrap(true));
        engine.state.score = 9;

        food_ahead(&mut engine);
        let result = engine.advance();

        assert_eq!(engine.state().score, 10);
        assert!(result
            .info
            .events
            .contains(&GameEvent::AchievementReached(Achievement::OnARoll)));

        // Milestones are reported once per run
        food_ahead(&mut engine);
        let result = engine.advance();
        assert!(!result
            .info
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::AchievementReached(_))));
    }

    #[test]
    fn test_board_filled_ends_run() {
        let mut config = GameConfig::new(3, 1);
        config.rules.initial_snake_length = 2;
        let snake = Snake::new(Position::new(1, 0), Direction::Right, 2);
        let mut state = GameState::new(snake, Position::new(2, 0), &config);
        state.phase = RunPhase::Running;
        let mut engine = GameEngine::from_state(config, state, 0);

        let result = engine.advance();

        assert!(result.terminated);
        assert_eq!(result.info.pickup, Some(Pickup::Food));
        assert_eq!(result.info.end_reason, Some(EndReason::BoardFilled));
        assert_eq!(engine.state().score, 1);
        // The food that filled the board still counts
        assert!(engine.state().achievements.contains(&Achievement::FirstBite));
    }

    #[test]
    fn test_shield_does_not_absorb_wall() {
        let mut engine = running_engine(GameConfig::small());
        engine.state.active_effect = Some(ActiveEffect {
            kind: PowerKind::Shield,
            expires_at_ms: 60_000,
        });

        for _ in 0..4 {
            assert!(!engine.advance().terminated);
        }
        let result = engine.advance();

        assert!(result.terminated);
        assert_eq!(result.info.end_reason, Some(EndReason::Wall));
        assert!(!result.info.events.contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_every_power_kind_spawns() {
        let mut seen = Vec::new();

        for seed in 0..60 {
            let mut config = GameConfig::small();
            config.rules.power_up_chance = 1.0;
            config.rules.golden_chance = 0.0;
            let mut engine = running_engine(config);
            engine.rng = StdRng::seed_from_u64(seed);
            food_ahead(&mut engine);

            engine.advance();
            let kind = engine.state().power_up.expect("power-up always spawns").kind;
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }

        for kind in PowerKind::ALL {
            assert!(seen.contains(&kind), "{kind:?} never spawned");
        }
    }

    fn one_row_engine(width: usize, golden_x: i32, seed: u64) -> GameEngine {
        let mut config = GameConfig::new(width, 1);
        config.rules.initial_snake_length = 2;
        config.rules.golden_chance = 0.0;
        config.rules.power_up_chance = 0.0;
        let snake = Snake::new(Position::new(1, 0), Direction::Right, 2);
        let mut state = GameState::new(snake, Position::new(2, 0), &config);
        state.golden = Some(GoldenFruit {
            position: Position::new(golden_x, 0),
            ttl_ms: 8_000,
        });
        state.phase = RunPhase::Running;
        GameEngine::from_state(config, state, seed)
    }

    #[test]
    fn test_food_respawn_avoids_collectibles() {
        for seed in 0..20 {
            let mut engine = one_row_engine(5, 3, seed);
            assert_eq!(engine.advance().info.pickup, Some(Pickup::Food));
            assert_eq!(engine.state().food, Position::new(4, 0));
        }

        // With no other free cell the food may share the golden fruit's cell
        let mut engine = one_row_engine(4, 3, 0);
        let result = engine.advance();
        assert!(!result.terminated);
        assert_eq!(engine.state().food, Position::new(3, 0));
    }
}
