//! Placement of food, golden fruit and power-ups.
//!
//! Cells are drawn uniformly with rejection sampling. Sampling is capped at one
//! attempt per grid cell; after that the free cells are enumerated and one is
//! picked directly, so a crowded board never spins.

use rand::seq::SliceRandom;
use rand::Rng;

use super::state::Position;

/// Pick a uniformly random cell of the `width x height` grid for which
/// `is_blocked` returns false. Returns `None` only when every cell is blocked.
pub fn random_free_cell<R, F>(rng: &mut R, width: usize, height: usize, is_blocked: F) -> Option<Position>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> bool,
{
    if width == 0 || height == 0 {
        return None;
    }

    let max_attempts = width * height;
    for _ in 0..max_attempts {
        let pos = Position::new(
            rng.gen_range(0..width) as i32,
            rng.gen_range(0..height) as i32,
        );
        if !is_blocked(pos) {
            return Some(pos);
        }
    }

    let free: Vec<Position> = (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
        .filter(|pos| !is_blocked(*pos))
        .collect();
    free.choose(rng).copied()
}
