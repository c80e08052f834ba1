use std::path::PathBuf;

use crate::game::Position;

/// Reasons a placement is refused. The board and round state are left
/// untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("position {0} is outside the board")]
    OutOfRange(Position),

    #[error("position {0} is already occupied")]
    Occupied(Position),

    #[error("cannot place an empty mark")]
    EmptyMark,

    #[error("it is not the player's turn")]
    NotYourTurn,

    #[error("no placement is accepted in the current phase")]
    WrongPhase,
}

/// Errors from reshaping or building a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("the board has already been extended this round")]
    AlreadyExtended,

    #[error("cannot parse board: {0}")]
    Parse(String),
}

/// Errors that can occur while loading or saving the score tally.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("failed to read score file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse score file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::Occupied(Position::new(1, 2));
        assert_eq!(err.to_string(), "position (1, 2) is already occupied");
        let err = MoveError::OutOfRange(Position::new(3, 0));
        assert_eq!(err.to_string(), "position (3, 0) is outside the board");
    }

    #[test]
    fn test_board_error_display() {
        assert_eq!(
            BoardError::AlreadyExtended.to_string(),
            "the board has already been extended this round"
        );
    }

    #[test]
    fn test_score_error_display() {
        let err = ScoreError::Read {
            path: PathBuf::from("score.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read score file score.json: denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("pacing.two_step_ms must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: pacing.two_step_ms must be > 0"
        );
    }
}
