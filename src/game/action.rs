/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Returns true if `self` moves along a different axis than `current`.
    ///
    /// Continuing straight (or reversing) is not a turn.
    pub fn is_turn_from(&self, current: Direction) -> bool {
        let (dx, dy) = self.delta();
        let (cx, cy) = current.delta();
        dx.abs() != cx.abs() || dy.abs() != cy.abs()
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Commands an input source can issue to a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Queue a direction change for the next tick
    Turn(Direction),
    /// Start a fresh run, or resume a paused one
    Start,
    /// Pause a running game, resume a paused one
    TogglePause,
    /// Throw away the current run and start a new one
    Restart,
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Command::Turn(direction)
    }
}
