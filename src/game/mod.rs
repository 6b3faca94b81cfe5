//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The engine is advanced one step at a time by whoever owns the clock; see
//! [`scheduler`] for the port it is driven through.

pub mod achievement;
pub mod action;
pub mod config;
pub mod engine;
pub mod scheduler;
pub mod spawn;
pub mod state;

// Re-export commonly used types
pub use achievement::Achievement;
pub use action::{Command, Direction};
pub use config::{BoardSize, ConfigError, Difficulty, GameConfig, Rules};
pub use engine::{GameEngine, GameEvent, Pickup, StepInfo, StepResult};
pub use scheduler::{ManualScheduler, TickScheduler};
pub use state::{
    ActiveEffect, EndReason, GameState, GoldenFruit, Position, PowerKind, PowerUp, RunPhase, Snake,
};
