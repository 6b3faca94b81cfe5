use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::Duration;

use super::{achievement::Achievement, action::Direction, config::GameConfig};

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Bring each coordinate back onto a `width x height` torus
    pub fn wrapped(&self, width: usize, height: usize) -> Self {
        Self {
            x: self.x.rem_euclid(width as i32),
            y: self.y.rem_euclid(height as i32),
        }
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    pub body: VecDeque<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Check if any segment, head included, occupies `pos`
    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }

    /// Drop up to `count` tail segments, always keeping the head
    pub fn shrink(&mut self, count: usize) {
        let keep = self.body.len().saturating_sub(count).max(1);
        self.body.truncate(keep);
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// No free cell was left for food
    BoardFilled,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EndReason::Wall => "hit the wall",
            EndReason::SelfCollision => "bit itself",
            EndReason::BoardFilled => "filled the board",
        };
        f.write_str(label)
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerKind {
    /// Slows the game down for a while
    Slow,
    /// Cuts two segments off the tail
    Shrink,
    /// Self-collisions are tolerated while active
    Shield,
}

impl PowerKind {
    pub const ALL: [PowerKind; 3] = [PowerKind::Slow, PowerKind::Shrink, PowerKind::Shield];

    pub fn label(&self) -> &'static str {
        match self {
            PowerKind::Slow => "Slow",
            PowerKind::Shrink => "Shrink",
            PowerKind::Shield => "Shield",
        }
    }

    /// Single-letter marker drawn on the board
    pub fn symbol(&self) -> char {
        match self {
            PowerKind::Slow => 'S',
            PowerKind::Shrink => 'R',
            PowerKind::Shield => 'H',
        }
    }
}

/// Bonus fruit worth extra points, disappears when its countdown runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldenFruit {
    pub position: Position,
    pub ttl_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub position: Position,
    pub kind: PowerKind,
    pub ttl_ms: i64,
}

/// The one effect currently in force. Collecting another power-up replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEffect {
    pub kind: PowerKind,
    /// Game clock value after which the effect is cleared
    pub expires_at_ms: u64,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Direction applied at the start of the next tick
    pub pending_direction: Direction,
    pub food: Position,
    pub golden: Option<GoldenFruit>,
    pub power_up: Option<PowerUp>,
    pub active_effect: Option<ActiveEffect>,
    pub grid_width: usize,
    pub grid_height: usize,
    pub wrap: bool,
    pub score: u32,
    /// Coins collected during this run, credited to progress when it ends
    pub coins_earned: u32,
    /// Current delay between ticks
    pub tick_ms: u32,
    /// Delay between ticks at the start of the run
    pub base_tick_ms: u32,
    /// Simulated time, advanced by the tick interval on every step
    pub clock_ms: u64,
    pub steps: u32,
    pub phase: RunPhase,
    pub end_reason: Option<EndReason>,
    /// Milestones reached during this run
    pub achievements: BTreeSet<Achievement>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Position, config: &GameConfig) -> Self {
        Self {
            pending_direction: snake.direction,
            snake,
            food,
            golden: None,
            power_up: None,
            active_effect: None,
            grid_width: config.grid_width,
            grid_height: config.grid_height,
            wrap: config.wrap,
            score: 0,
            coins_earned: 0,
            tick_ms: config.base_tick_ms,
            base_tick_ms: config.base_tick_ms,
            clock_ms: 0,
            steps: 0,
            phase: RunPhase::NotStarted,
            end_reason: None,
            achievements: BTreeSet::new(),
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }

    pub fn is_alive(&self) -> bool {
        self.phase != RunPhase::Ended
    }

    pub fn is_shielded(&self) -> bool {
        matches!(
            self.active_effect,
            Some(ActiveEffect {
                kind: PowerKind::Shield,
                ..
            })
        )
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_ms))
    }

    /// How much faster than the base speed the game currently runs
    pub fn speed_multiplier(&self) -> f32 {
        self.base_tick_ms as f32 / self.tick_ms.max(1) as f32
    }

    /// Milliseconds left on the active effect, if any
    pub fn effect_remaining_ms(&self) -> Option<u64> {
        self.active_effect
            .map(|effect| effect.expires_at_ms.saturating_sub(self.clock_ms))
    }
}
