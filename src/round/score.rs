use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::state::Outcome;
use crate::error::ScoreError;

/// Key the tally is stored under in a shared key-value file.
pub const SCORE_KEY: &str = "xoScore";

/// Running tally across rounds, serialized as `{"you":n,"ai":n,"draw":n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub you: u64,
    pub ai: u64,
    pub draw: u64,
}

impl Score {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::PlayerWin => self.you += 1,
            Outcome::OpponentWin => self.ai += 1,
            Outcome::Draw => self.draw += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.you + self.ai + self.draw
    }
}

/// Somewhere a [`Score`] survives between runs.
pub trait ScoreStore {
    /// Stored tally, or zeros if nothing has been stored yet.
    fn load(&mut self) -> Result<Score, ScoreError>;

    fn save(&mut self, score: &Score) -> Result<(), ScoreError>;
}

/// Keeps the tally in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    stored: Option<Score>,
    saves: usize,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: Score) -> Self {
        MemoryScoreStore {
            stored: Some(score),
            saves: 0,
        }
    }

    pub fn stored(&self) -> Option<Score> {
        self.stored
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&mut self) -> Result<Score, ScoreError> {
        Ok(self.stored.unwrap_or_default())
    }

    fn save(&mut self, score: &Score) -> Result<(), ScoreError> {
        self.stored = Some(*score);
        self.saves += 1;
        Ok(())
    }
}

/// A JSON object of key → record in one file, with the tally under
/// [`SCORE_KEY`]. Other keys in the file are preserved.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileScoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, ScoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| ScoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&text).map_err(|e| ScoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load(&mut self) -> Result<Score, ScoreError> {
        let mut entries = self.read_entries()?;
        match entries.remove(SCORE_KEY) {
            Some(value) => serde_json::from_value(value).map_err(|e| ScoreError::Parse {
                path: self.path.clone(),
                source: e,
            }),
            None => Ok(Score::default()),
        }
    }

    fn save(&mut self, score: &Score) -> Result<(), ScoreError> {
        // A corrupt file is replaced rather than blocking every later save.
        // One that cannot be read is left alone.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(ScoreError::Parse { .. }) => Map::new(),
            Err(err) => return Err(err),
        };
        entries.insert(SCORE_KEY.to_string(), serde_json::to_value(score)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(entries))?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// The tally plus the store it is mirrored to.
///
/// Storage failures never interrupt play: they are logged and the in-memory
/// tally carries on.
#[derive(Debug)]
pub struct ScoreKeeper<S: ScoreStore> {
    store: S,
    score: Score,
}

impl<S: ScoreStore> ScoreKeeper<S> {
    pub fn new(mut store: S) -> Self {
        let score = store.load().unwrap_or_else(|err| {
            warn!(%err, "could not load score, starting from zero");
            Score::default()
        });
        ScoreKeeper { store, score }
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Count one more round with this outcome.
    pub fn increment(&mut self, outcome: Outcome) -> Score {
        self.score.record(outcome);
        self.persist();
        self.score
    }

    /// Set every counter back to zero.
    pub fn reset(&mut self) -> Score {
        self.score = Score::default();
        self.persist();
        self.score
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.score) {
            warn!(%err, "could not save score");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_json_shape() {
        let score = Score { you: 1, ai: 2, draw: 3 };
        assert_eq!(
            serde_json::to_string(&score).unwrap(),
            r#"{"you":1,"ai":2,"draw":3}"#
        );
    }

    #[test]
    fn test_record() {
        let mut score = Score::default();
        score.record(Outcome::PlayerWin);
        score.record(Outcome::Draw);
        score.record(Outcome::Draw);
        assert_eq!(score, Score { you: 1, ai: 0, draw: 2 });
        assert_eq!(score.total(), 3);
    }

    #[test]
    fn test_keeper_increments_and_persists() {
        let mut keeper = ScoreKeeper::new(MemoryScoreStore::new());
        keeper.increment(Outcome::OpponentWin);
        keeper.increment(Outcome::Draw);
        assert_eq!(keeper.score(), Score { you: 0, ai: 1, draw: 1 });
        assert_eq!(keeper.store().stored(), Some(keeper.score()));
        assert_eq!(keeper.store().saves(), 2);
    }

    #[test]
    fn test_keeper_reset() {
        let store = MemoryScoreStore::with_score(Score { you: 4, ai: 5, draw: 6 });
        let mut keeper = ScoreKeeper::new(store);
        assert_eq!(keeper.score().total(), 15);
        assert_eq!(keeper.reset(), Score::default());
        assert_eq!(keeper.store().stored(), Some(Score::default()));
    }

    #[test]
    fn test_file_store_missing_file_loads_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileScoreStore::new(dir.path().join("score.json"));
        assert_eq!(store.load().unwrap(), Score::default());
    }

    #[test]
    fn test_file_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("score.json");
        let mut store = JsonFileScoreStore::new(&path);
        store.save(&Score { you: 2, ai: 7, draw: 1 }).unwrap();

        let mut reopened = JsonFileScoreStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Score { you: 2, ai: 7, draw: 1 });

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[SCORE_KEY]["ai"], 7);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let mut store = JsonFileScoreStore::new(&path);
        store.save(&Score { you: 1, ai: 0, draw: 0 }).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[SCORE_KEY]["you"], 1);
    }

    #[test]
    fn test_file_store_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.json");
        fs::write(&path, "not json").unwrap();
        let mut store = JsonFileScoreStore::new(&path);
        assert!(matches!(store.load(), Err(ScoreError::Parse { .. })));
    }

    #[test]
    fn test_keeper_survives_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.json");
        fs::write(&path, "{{{").unwrap();
        let mut keeper = ScoreKeeper::new(JsonFileScoreStore::new(&path));
        assert_eq!(keeper.score(), Score::default());
        keeper.increment(Outcome::PlayerWin);

        let mut reopened = JsonFileScoreStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Score { you: 1, ai: 0, draw: 0 });
    }

    #[test]
    fn test_file_store_unreadable_file_is_not_replaced() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        let path = dir.path().join("score.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "other data").unwrap();

        let mut store = JsonFileScoreStore::new(&path);
        let err = store.save(&Score { you: 1, ai: 0, draw: 0 }).unwrap_err();
        assert!(matches!(err, ScoreError::Read { .. }));
        assert!(path.is_dir());
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "other data");
    }
}
