//! Squadron Shooter: a wave-based arcade shoot-'em-up core.
//!
//! The library holds the whole simulation (entities, per-tick update, state
//! machine, procedural audio); the binary is a thin terminal host around it.

pub mod audio;
pub mod background;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod floating_text;
pub mod game;
pub mod geometry;
pub mod highscore;
pub mod hud;
pub mod input;
pub mod particles;
pub mod theme;
pub mod timers;
pub mod wave;

pub use audio::{Audio, AudioBackend, AudioControl, Mixer, Sfx, Silent};
pub use config::GameConfig;
pub use entities::{GameStatus, Session};
pub use error::{GameError, Result};
pub use game::{Game, GameOverInfo};
pub use geometry::{overlaps, Rect};
pub use input::{Command, InputState};
pub use theme::{PowerUpId, Theme};
