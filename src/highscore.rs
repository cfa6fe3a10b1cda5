/// High-score persistence: a single number in a small text file.

use std::path::{Path, PathBuf};

use crate::error::{GameError, Result};

const DEFAULT_FILE_NAME: &str = ".squadron_shooter_score";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl HighScoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreFile { path: path.into() }
    }

    /// `~/.squadron_shooter_score`, or the working directory without a home.
    pub fn default_location() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self::new(PathBuf::from(home).join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<u32> {
        let text = std::fs::read_to_string(&self.path)?;
        text.trim()
            .parse()
            .map_err(|e| GameError::HighScore(format!("{}: {e}", self.path.display())))
    }

    /// The stored score; a missing or unreadable file counts as 0.
    pub fn load(&self) -> u32 {
        match self.read() {
            Ok(score) => score,
            Err(GameError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring stored high score");
                0
            }
        }
    }

    pub fn save(&self, score: u32) -> Result<()> {
        std::fs::write(&self.path, score.to_string())?;
        tracing::info!(score, path = %self.path.display(), "high score saved");
        Ok(())
    }
}
