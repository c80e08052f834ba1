//! Round orchestration: the turn state machine, the steps it asks a driver to
//! schedule, the callbacks a front end receives, and the persisted score.

mod controller;
mod observer;
mod score;
mod state;

pub use controller::{Action, RoundController, Scheduled};
pub use observer::{EventLog, RoundEvent, RoundObserver};
pub use score::{JsonFileScoreStore, MemoryScoreStore, Score, ScoreKeeper, ScoreStore, SCORE_KEY};
pub use state::{Outcome, Phase, RoundState};
