/// All game entity types: pure data, no logic.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::background::Background;
use crate::floating_text::FloatingText;
use crate::geometry::Rect;
use crate::theme::{PowerUpId, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Play,
    Paused,
    LevelClear,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementPattern {
    /// Linear drift, bouncing off the side walls.
    Straight,
    /// Sinusoidal sideways sway on top of the downward drift.
    Zigzag,
    /// Drifts down, then homes in on the player once past 30% of the field.
    Dive,
    /// Slow combined sway in both axes.
    Boss,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Ticks of post-hit grace left.
    pub invincible: u32,
    /// Milliseconds until the next shot is allowed.
    pub shoot_cooldown_ms: f32,
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A player shot.
#[derive(Clone, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// An enemy projectile.
#[derive(Clone, Debug)]
pub struct Bomb {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
}

impl Bomb {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    /// Index into the theme's enemy table.
    pub tier: usize,
    pub hp: u32,
    pub max_hp: u32,
    pub alive: bool,
    /// Ticks of white hit-flash left.
    pub hit_flash: u32,
    pub pattern: MovementPattern,
    pub pattern_t: f32,
    pub bomb_timer: i32,
    pub bomb_cooldown: i32,
    pub quote: String,
    pub quote_timer: i32,
    pub quote_alpha: f32,
    pub is_boss: bool,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

// ── Pickups ───────────────────────────────────────────────────────────────────

/// A falling power-up gem.
#[derive(Clone, Debug)]
pub struct PowerUpDrop {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub size: f32,
    pub kind: PowerUpId,
}

impl PowerUpDrop {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// A friendly figure drifting down the field; catching it pays a bonus.
#[derive(Clone, Debug)]
pub struct BonusTarget {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vy: f32,
}

impl BonusTarget {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub color: Rgb,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    /// Linear fade-out.
    pub fn alpha(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

/// Currently active power-ups with the time each one runs out.
#[derive(Clone, Debug, Default)]
pub struct PowerUps {
    expires_at: BTreeMap<PowerUpId, Duration>,
}

impl PowerUps {
    pub fn is_active(&self, id: PowerUpId) -> bool {
        self.expires_at.contains_key(&id)
    }

    /// Activating an already active power-up moves its expiry, it never stacks.
    pub fn activate(&mut self, id: PowerUpId, expires_at: Duration) {
        self.expires_at.insert(id, expires_at);
    }

    pub fn deactivate(&mut self, id: PowerUpId) {
        self.expires_at.remove(&id);
    }

    pub fn expires_at(&self, id: PowerUpId) -> Option<Duration> {
        self.expires_at.get(&id).copied()
    }

    pub fn active(&self) -> impl Iterator<Item = PowerUpId> + '_ {
        self.expires_at.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.expires_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expires_at.is_empty()
    }

    /// 2 while `Score2x` runs, 1 otherwise.
    pub fn score_multiplier(&self) -> u32 {
        if self.is_active(PowerUpId::Score2x) {
            2
        } else {
            1
        }
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Everything that lives for one wave of one game.  Score, lives and the
/// wave number are carried into the next wave's session; all collections
/// start empty again.
#[derive(Clone, Debug)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    pub wave: u32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    pub drops: Vec<PowerUpDrop>,
    pub bonus_targets: Vec<BonusTarget>,
    pub particles: Vec<Particle>,
    pub floats: Vec<FloatingText>,
    pub power_ups: PowerUps,
    pub background: Background,
    pub bonus_spawn_timer: i32,
    pub bonus_spawn_cooldown: i32,
}

impl Session {
    pub fn score_multiplier(&self) -> u32 {
        self.power_ups.score_multiplier()
    }

    /// A wave is cleared once nothing in it is left alive.
    pub fn wave_cleared(&self) -> bool {
        self.enemies.iter().all(|e| !e.alive)
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }
}
