//! Core game logic: board representation, sides and symbols, and
//! three-in-a-row detection over a board that may grow by one column.

mod board;
mod player;
mod win;

pub use board::{Board, Cell, Direction, Position, BASE_COLS, EXTENDED_COLS, ROWS};
pub use player::{Side, Symbol};
pub use win::{find_winning_line, winner, Line};
