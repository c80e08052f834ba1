//! Terminal UI: a playable board driven by the round controller. The app owns
//! the timer for the controller's scheduled steps.

mod app;
mod game_view;

pub use app::App;
