/// Gameplay tunables.
///
/// Everything here has a sensible default; a JSON file may override any
/// subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Play field ───────────────────────────────────────────────────────────
    pub width: f32,
    pub height: f32,
    /// Band at the top reserved for the HUD.
    pub hud_height: f32,

    // ── Entity sizes ─────────────────────────────────────────────────────────
    pub player_w: f32,
    pub player_h: f32,
    pub bullet_w: f32,
    pub bullet_h: f32,
    pub enemy_w: f32,
    pub enemy_h: f32,
    pub bomb_w: f32,
    pub bomb_h: f32,
    pub drop_size: f32,
    pub bonus_w: f32,
    pub bonus_h: f32,

    // ── Speeds ───────────────────────────────────────────────────────────────
    pub player_speed: f32,
    pub bullet_speed: f32,
    /// Bomb fall speed at wave 0; each wave adds `bomb_speed_per_wave`.
    pub bomb_speed: f32,
    pub bomb_speed_per_wave: f32,
    pub drop_speed: f32,

    // ── Timing ───────────────────────────────────────────────────────────────
    /// Milliseconds one update tick stands for.
    pub frame_ms: f32,
    pub shoot_cooldown_ms: f32,
    /// Shoot cooldown is divided by this under rapid fire.
    pub rapid_fire_divisor: f32,
    pub invincible_frames: u32,
    pub level_clear_delay_ms: u64,
    pub building_spawn_ticks: u32,

    // ── Rules ────────────────────────────────────────────────────────────────
    pub starting_lives: u32,
    /// Chance that a regular enemy leaves a power-up behind.
    pub drop_chance: f64,
    pub level_clear_bonus_per_wave: u32,
    pub bonus_target_score: u32,
    pub star_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 480.0,
            height: 640.0,
            hud_height: 36.0,

            player_w: 32.0,
            player_h: 24.0,
            bullet_w: 3.0,
            bullet_h: 12.0,
            enemy_w: 34.0,
            enemy_h: 28.0,
            bomb_w: 8.0,
            bomb_h: 14.0,
            drop_size: 16.0,
            bonus_w: 28.0,
            bonus_h: 32.0,

            player_speed: 4.5,
            bullet_speed: 9.0,
            bomb_speed: 2.8,
            bomb_speed_per_wave: 0.1,
            drop_speed: 1.5,

            frame_ms: 16.0,
            shoot_cooldown_ms: 180.0,
            rapid_fire_divisor: 3.0,
            invincible_frames: 120,
            level_clear_delay_ms: 2800,
            building_spawn_ticks: 80,

            starting_lives: 3,
            drop_chance: 0.15,
            level_clear_bonus_per_wave: 500,
            bonus_target_score: 1000,
            star_count: 80,
        }
    }
}

impl GameConfig {
    /// Load a (possibly partial) config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= self.enemy_w || self.width <= self.player_w {
            return Err(GameError::Config(format!(
                "field width {} is narrower than the sprites",
                self.width
            )));
        }
        if self.height <= self.hud_height + self.player_h + 20.0 {
            return Err(GameError::Config(format!(
                "field height {} leaves no room below the HUD",
                self.height
            )));
        }
        if self.frame_ms <= 0.0 || self.rapid_fire_divisor <= 0.0 {
            return Err(GameError::Config(
                "frame_ms and rapid_fire_divisor must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.drop_chance) {
            return Err(GameError::Config(format!(
                "drop_chance {} is not a probability",
                self.drop_chance
            )));
        }
        Ok(())
    }

    /// Lowest y the player may reach (keeps clear of the HUD band).
    pub fn player_min_y(&self) -> f32 {
        self.hud_height + 10.0
    }

    /// Highest y the player may reach (bottom margin).
    pub fn player_max_y(&self) -> f32 {
        self.height - self.player_h - 10.0
    }
}
