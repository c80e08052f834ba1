//! The computer opponent: exhaustive minimax for the 3x3 phase and the
//! heuristic that decides how to play a grown board.

pub mod extension;
mod minimax;

pub use extension::{plan_extension, ExtensionPlan, Strategy, StrategyKind};
pub use minimax::{evaluate, MinimaxSolver, WIN_SCORE};
