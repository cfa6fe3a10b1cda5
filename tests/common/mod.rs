#![allow(dead_code)]

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use squadron_shooter::audio::{AudioControl, Sfx};
use squadron_shooter::entities::{Enemy, MovementPattern};
use squadron_shooter::{Game, GameConfig, Theme};

/// Audio fake that remembers what the game asked for.
#[derive(Debug, Default)]
pub struct Recorder {
    pub played: Vec<Sfx>,
    pub music: bool,
    pub music_starts: usize,
    pub muted: bool,
}

impl Recorder {
    pub fn count(&self, sfx: Sfx) -> usize {
        self.played.iter().filter(|s| **s == sfx).count()
    }
}

impl AudioControl for Recorder {
    fn play(&mut self, sfx: Sfx) {
        self.played.push(sfx);
    }

    fn start_music(&mut self) {
        self.music = true;
        self.music_starts += 1;
    }

    fn stop_music(&mut self) {
        self.music = false;
    }

    fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn new_game() -> Game {
    Game::with_rng(GameConfig::default(), Theme::default(), seeded_rng())
}

/// A still, harmless enemy: no movement, no bombs, no quotes.
pub fn enemy_at(x: f32, y: f32, hp: u32) -> Enemy {
    Enemy {
        x,
        y,
        w: 34.0,
        h: 28.0,
        vx: 0.0,
        vy: 0.0,
        tier: 0,
        hp,
        max_hp: hp,
        alive: true,
        hit_flash: 0,
        pattern: MovementPattern::Straight,
        pattern_t: 0.0,
        bomb_timer: 1_000_000,
        bomb_cooldown: 1_000_000,
        quote: String::new(),
        quote_timer: 1_000_000,
        quote_alpha: 0.0,
        is_boss: false,
    }
}

/// Keeps a wave from counting as cleared while sitting far above the field.
pub fn parked_enemy() -> Enemy {
    enemy_at(0.0, -500.0, 5)
}

/// A started game with a quiet field: one parked enemy and no bonus
/// targets on the way, so each test places exactly what it needs.
pub fn quiet_game(audio: &mut Recorder) -> Game {
    let mut game = new_game();
    game.start_game(audio);
    let session = game.session_mut().expect("session after start");
    session.enemies = vec![parked_enemy()];
    session.bonus_spawn_timer = 1_000_000;
    game
}
