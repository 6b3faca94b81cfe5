//! Snake Neo - a terminal Snake with golden fruit, power-ups and achievements
//!
//! This library provides:
//! - Core game logic, free of I/O and timers (game module)
//! - Player progress, settings and their persistence (progress module)
//! - A session tying the engine to a tick scheduler and a store (session module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive terminal frontend (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod progress;
pub mod render;
pub mod session;
