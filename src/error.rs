/// Errors raised by the outer I/O surfaces (config, persistence, audio device).
///
/// The per-frame update never fails; these only come out of loading and
/// saving things.

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// IO error from the filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a config or theme file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config values that parse but make no sense
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Stored high score could not be read or written
    #[error("High score error: {0}")]
    HighScore(String),

    /// Audio output could not be opened
    #[error("Audio device error: {0}")]
    AudioDevice(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GameError>;
