//! # Tic-Tac-Grow
//!
//! Tic-tac-toe against an unbeatable minimax opponent, with one twist: when
//! the 3x3 board fills without a winner, the computer may add a fourth column
//! on either side and try to convert the draw into a win.
//!
//! ## Modules
//!
//! - [`game`]: Board, cells, sides and symbols, win detection
//! - [`ai`]: Minimax solver and the board-extension planner
//! - [`round`]: Round state machine, scheduling, observer callbacks, score
//! - [`ui`]: Terminal UI
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod round;
pub mod ui;
