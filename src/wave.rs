/// Enemy formations.
///
/// A wave is a grid whose size and enemy strength grow with the wave number
/// up to wave 10, after which only the boss keeps getting tougher.  Every
/// fifth wave appends a single boss at the top centre.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Enemy, MovementPattern};
use crate::theme::Theme;

/// Waves beyond this no longer grow the grid.
pub const MAX_DIFFICULTY: u32 = 10;
pub const BOSS_EVERY: u32 = 5;
const COLUMN_SPACING: f32 = 52.0;
const ROW_SPACING: f32 = 60.0;
const LEFT_MARGIN: f32 = 30.0;
/// How far above the field the first row starts.
const ENTRY_OFFSET: f32 = 80.0;

const GRID_PATTERNS: [MovementPattern; 3] = [
    MovementPattern::Straight,
    MovementPattern::Zigzag,
    MovementPattern::Dive,
];

pub fn difficulty(wave: u32) -> u32 {
    wave.min(MAX_DIFFICULTY)
}

/// `(rows, cols)` of the regular grid for a wave.
pub fn grid_size(wave: u32) -> (u32, u32) {
    let d = difficulty(wave);
    (2 + d / 3, 4 + d / 4)
}

pub fn has_boss(wave: u32) -> bool {
    wave > 0 && wave % BOSS_EVERY == 0
}

pub fn boss_hp(wave: u32) -> u32 {
    20 + 2 * wave
}

/// Tier for a grid cell: later rows and harder waves pick stronger types.
pub fn tier_for(row: u32, wave: u32, tier_count: usize) -> usize {
    let d = difficulty(wave);
    let raw = (row as f32 / 2.0 + d as f32 / 4.0).floor() as usize;
    raw.min(tier_count.saturating_sub(1))
}

pub fn build_wave(wave: u32, theme: &Theme, config: &GameConfig, rng: &mut impl Rng) -> Vec<Enemy> {
    let d = difficulty(wave);
    let (rows, cols) = grid_size(wave);
    let mut formation = Vec::with_capacity((rows * cols) as usize + 1);

    for row in 0..rows {
        for col in 0..cols {
            let tier = tier_for(row, wave, theme.tier_count());
            let kind = theme.enemy_type(tier);
            let hp = kind.hp + d / 4;
            let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            formation.push(Enemy {
                x: LEFT_MARGIN + col as f32 * COLUMN_SPACING,
                y: -(row as f32 * ROW_SPACING + ENTRY_OFFSET),
                w: config.enemy_w,
                h: config.enemy_h,
                vx: direction * kind.speed,
                vy: kind.speed * 0.5,
                tier,
                hp,
                max_hp: hp,
                alive: true,
                hit_flash: 0,
                pattern: *GRID_PATTERNS.choose(rng).unwrap_or(&MovementPattern::Straight),
                pattern_t: 0.0,
                bomb_timer: rng.gen_range(180..=500) + row as i32 * 60,
                bomb_cooldown: (300 - d as i32 * 15).max(120),
                quote: theme.enemy_quotes.choose(rng).cloned().unwrap_or_default(),
                quote_timer: rng.gen_range(200..=600),
                quote_alpha: 0.0,
                is_boss: false,
            });
        }
    }

    if has_boss(wave) {
        let hp = boss_hp(wave);
        let tier = theme.boss_tier();
        tracing::debug!(wave, hp, "boss joins the formation");
        formation.push(Enemy {
            x: config.width / 2.0 - config.enemy_w / 2.0,
            y: -ENTRY_OFFSET,
            w: config.enemy_w,
            h: config.enemy_h,
            vx: 1.2,
            vy: 0.3,
            tier,
            hp,
            max_hp: hp,
            alive: true,
            hit_flash: 0,
            pattern: MovementPattern::Boss,
            pattern_t: 0.0,
            bomb_timer: 60,
            bomb_cooldown: 60,
            quote: theme.boss_quote.clone(),
            quote_timer: 150,
            quote_alpha: 0.0,
            is_boss: true,
        });
    }

    formation
}
