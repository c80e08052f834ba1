use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Upper bound for any single presentation delay.
const MAX_DELAY_MS: u64 = 10_000;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pacing: PacingConfig,
    pub score: ScoreConfig,
    pub logging: LoggingConfig,
}

/// Delays between the steps of the computer's turn, in milliseconds. They only
/// pace the presentation; the driver owns the actual timer.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Before the computer answers a human move.
    pub opponent_move_ms: u64,
    /// Before the computer opens a round it moves first in.
    pub first_move_ms: u64,
    /// Before a drawn board is analysed for an extension.
    pub extension_analysis_ms: u64,
    /// Between widening the board and the first extension move.
    pub extension_move_ms: u64,
    /// Between the two marks of a two-step strategy.
    pub two_step_ms: u64,
    /// Before the winning line is revealed.
    pub win_line_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            opponent_move_ms: 120,
            first_move_ms: 150,
            extension_analysis_ms: 150,
            extension_move_ms: 150,
            two_step_ms: 160,
            win_line_ms: 50,
        }
    }
}

impl PacingConfig {
    pub fn opponent_move(&self) -> Duration {
        Duration::from_millis(self.opponent_move_ms)
    }

    pub fn first_move(&self) -> Duration {
        Duration::from_millis(self.first_move_ms)
    }

    pub fn extension_analysis(&self) -> Duration {
        Duration::from_millis(self.extension_analysis_ms)
    }

    pub fn extension_move(&self) -> Duration {
        Duration::from_millis(self.extension_move_ms)
    }

    pub fn two_step(&self) -> Duration {
        Duration::from_millis(self.two_step_ms)
    }

    pub fn win_line(&self) -> Duration {
        Duration::from_millis(self.win_line_ms)
    }

    fn named(&self) -> [(&'static str, u64); 6] {
        [
            ("opponent_move_ms", self.opponent_move_ms),
            ("first_move_ms", self.first_move_ms),
            ("extension_analysis_ms", self.extension_analysis_ms),
            ("extension_move_ms", self.extension_move_ms),
            ("two_step_ms", self.two_step_ms),
            ("win_line_ms", self.win_line_ms),
        ]
    }
}

/// Where the score tally is kept between runs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub path: PathBuf,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            path: PathBuf::from("score.json"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Log file. Without one no subscriber is installed, since the terminal
    /// belongs to the UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, ms) in self.pacing.named() {
            if ms > MAX_DELAY_MS {
                return Err(ConfigError::Validation(format!(
                    "pacing.{name} must be <= {MAX_DELAY_MS}"
                )));
            }
        }
        if self.pacing.two_step_ms == 0 {
            return Err(ConfigError::Validation(
                "pacing.two_step_ms must be > 0".into(),
            ));
        }
        if self.score.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "score.path must not be empty".into(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.filter must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
