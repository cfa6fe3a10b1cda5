/// Per-tick game logic.
///
/// A [`Tick`] borrows the running session together with everything one
/// update needs (tables, tunables, RNG, audio, the game's timer queue) and
/// runs the update steps in their fixed order.  All randomness comes through
/// the injected RNG so tests can drive it with a seeded one.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::audio::{AudioControl, Sfx};
use crate::config::GameConfig;
use crate::entities::{BonusTarget, Bomb, Bullet, MovementPattern, PowerUpDrop, Session};
use crate::floating_text::{update_floats, FloatingText};
use crate::geometry::overlaps;
use crate::input::InputState;
use crate::particles::{spawn_explosion, update_particles};
use crate::theme::{PowerUpId, Theme, BONUS_COLOR, HIT_COLOR, PLAYER_COLOR, SHIELD_COLOR};
use crate::timers::TimerQueue;

// ── Tuning constants ─────────────────────────────────────────────────────────

/// Vertical movement is slower than horizontal.
const VERTICAL_SPEED_FACTOR: f32 = 0.7;
/// Twin shots leave this far left and right of the ship's centre.
const TWIN_OFFSET: f32 = 8.0;
const SPREAD_VX: f32 = 1.5;
const HIT_FLASH_TICKS: u32 = 8;
const BOSS_SCORE_FACTOR: u32 = 5;
const PATTERN_STEP: f32 = 0.02;
/// Divers start homing once past this fraction of the field height.
const DIVE_THRESHOLD: f32 = 0.3;
const QUOTE_FADE: f32 = 0.008;
const BOMB_AIM_BIAS: f32 = 0.01;

/// Burst sizes.
const BOSS_EXPLOSION: usize = 30;
const ENEMY_EXPLOSION: usize = 14;
const CONTACT_EXPLOSION: usize = 16;
const PLAYER_DEATH_BURST: usize = 18;
const SHIELD_BURST: usize = 8;
const BOMB_HIT_BURST: usize = 12;
const BONUS_BURST: usize = 20;

/// Deferred actions of a running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameTimer {
    PowerUpExpired(PowerUpId),
    NextWave,
}

/// What a call to [`Tick::lose_life`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifeLoss {
    /// Invincible, or no lives left to lose.
    Ignored,
    Lost,
    GameOver,
}

/// How a full update ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    WaveCleared,
    GameOver,
}

pub struct Tick<'a, R: Rng, A: AudioControl + ?Sized> {
    pub session: &'a mut Session,
    pub theme: &'a Theme,
    pub config: &'a GameConfig,
    pub rng: &'a mut R,
    pub audio: &'a mut A,
    pub timers: &'a mut TimerQueue<GameTimer, GameTimer>,
    /// Game clock at this tick.
    pub now: Duration,
    game_over: bool,
}

impl<'a, R: Rng, A: AudioControl + ?Sized> Tick<'a, R, A> {
    pub fn new(
        session: &'a mut Session,
        theme: &'a Theme,
        config: &'a GameConfig,
        rng: &'a mut R,
        audio: &'a mut A,
        timers: &'a mut TimerQueue<GameTimer, GameTimer>,
        now: Duration,
    ) -> Self {
        Tick {
            session,
            theme,
            config,
            rng,
            audio,
            timers,
            now,
            game_over: false,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// One full update.  Stops after the step in which the last life went.
    pub fn run(&mut self, input: &InputState) -> TickOutcome {
        self.update_player(input);
        self.update_bullets();
        self.update_enemies();
        if self.game_over {
            return TickOutcome::GameOver;
        }
        self.update_bombs();
        if self.game_over {
            return TickOutcome::GameOver;
        }
        self.update_drops();
        self.update_bonus_targets();
        update_particles(&mut self.session.particles);
        update_floats(&mut self.session.floats);

        if self.session.wave_cleared() {
            TickOutcome::WaveCleared
        } else {
            TickOutcome::Continue
        }
    }

    // ── Score / lives ────────────────────────────────────────────────────────

    /// Add `points` through the current multiplier; returns what was awarded.
    pub fn add_score(&mut self, points: u32) -> u32 {
        let awarded = points.saturating_mul(self.session.score_multiplier());
        self.session.score = self.session.score.saturating_add(awarded);
        awarded
    }

    pub fn lose_life(&mut self) -> LifeLoss {
        let s = &mut *self.session;
        if s.player.invincible > 0 || s.lives == 0 {
            return LifeLoss::Ignored;
        }
        s.lives -= 1;
        if s.lives == 0 {
            self.game_over = true;
            return LifeLoss::GameOver;
        }
        s.player.invincible = self.config.invincible_frames;
        let rect = s.player.rect();
        spawn_explosion(
            &mut s.particles,
            rect.center_x(),
            rect.center_y(),
            PLAYER_COLOR,
            PLAYER_DEATH_BURST,
            self.rng,
        );
        self.audio.play(Sfx::PlayerHit);
        tracing::debug!(lives = s.lives, "life lost");
        LifeLoss::Lost
    }

    // ── Power-ups ────────────────────────────────────────────────────────────

    /// Switch a power-up on, restarting its expiry if it already runs.
    pub fn activate_power_up(&mut self, id: PowerUpId) {
        let theme = self.theme;
        let Some(kind) = theme.power_up(id) else {
            tracing::warn!(?id, "theme has no such power-up");
            return;
        };
        let expires = self.now + Duration::from_millis(kind.duration_ms);
        self.session.power_ups.activate(id, expires);
        self.timers
            .schedule_keyed(GameTimer::PowerUpExpired(id), expires, GameTimer::PowerUpExpired(id));

        let p = &self.session.player;
        self.session.floats.push(FloatingText::new(
            format!("{}!", kind.label),
            p.x,
            p.y - 10.0,
            kind.color,
            true,
        ));
        self.audio.play(Sfx::PowerUp);
        tracing::debug!(?id, expires_ms = expires.as_millis() as u64, "power-up on");
    }

    // ── Player ───────────────────────────────────────────────────────────────

    pub fn update_player(&mut self, input: &InputState) {
        let cfg = self.config;
        let p = &mut self.session.player;
        if input.left {
            p.x -= cfg.player_speed;
        }
        if input.right {
            p.x += cfg.player_speed;
        }
        if input.up {
            p.y -= cfg.player_speed * VERTICAL_SPEED_FACTOR;
        }
        if input.down {
            p.y += cfg.player_speed * VERTICAL_SPEED_FACTOR;
        }
        p.x = p.x.clamp(0.0, cfg.width - p.w);
        p.y = p.y.clamp(cfg.player_min_y(), cfg.player_max_y());

        p.shoot_cooldown_ms = (p.shoot_cooldown_ms - cfg.frame_ms).max(0.0);
        p.invincible = p.invincible.saturating_sub(1);

        if input.fire {
            self.try_shoot();
        }
    }

    /// Fire if the gun is ready.  Returns whether anything was fired.
    pub fn try_shoot(&mut self) -> bool {
        let cfg = self.config;
        let s = &mut *self.session;
        if s.player.shoot_cooldown_ms > 0.0 {
            return false;
        }
        s.player.shoot_cooldown_ms = if s.power_ups.is_active(PowerUpId::RapidFire) {
            cfg.shoot_cooldown_ms / cfg.rapid_fire_divisor
        } else {
            cfg.shoot_cooldown_ms
        };

        let cx = s.player.x + s.player.w / 2.0 - cfg.bullet_w / 2.0;
        let y = s.player.y;
        let bullet = |x: f32, vx: f32| Bullet {
            x,
            y,
            vx,
            vy: -cfg.bullet_speed,
            w: cfg.bullet_w,
            h: cfg.bullet_h,
        };
        if s.power_ups.is_active(PowerUpId::Spread) {
            for dir in -2..=2 {
                s.bullets.push(bullet(cx, dir as f32 * SPREAD_VX));
            }
        } else {
            s.bullets.push(bullet(cx - TWIN_OFFSET, 0.0));
            s.bullets.push(bullet(cx + TWIN_OFFSET, 0.0));
        }
        self.audio.play(Sfx::Shoot);
        true
    }

    // ── Bullets vs enemies ───────────────────────────────────────────────────

    pub fn update_bullets(&mut self) {
        let (top, width) = (self.config.hud_height, self.config.width);
        let mut bullets = std::mem::take(&mut self.session.bullets);
        bullets.retain_mut(|b| {
            b.x += b.vx;
            b.y += b.vy;
            b.y >= top && b.x >= -10.0 && b.x <= width + 10.0
        });
        // First live enemy hit wins; the bullet is spent either way.
        bullets.retain(|b| {
            let rect = b.rect();
            let target = self
                .session
                .enemies
                .iter()
                .position(|e| e.alive && overlaps(&rect, &e.rect()));
            match target {
                Some(i) => {
                    self.hit_enemy(i);
                    false
                }
                None => true,
            }
        });
        self.session.bullets = bullets;
    }

    fn hit_enemy(&mut self, index: usize) {
        let e = &mut self.session.enemies[index];
        e.hp = e.hp.saturating_sub(1);
        e.hit_flash = HIT_FLASH_TICKS;
        if e.hp > 0 {
            self.audio.play(Sfx::EnemyBomb);
            return;
        }
        e.alive = false;
        let (rect, tier, is_boss) = (e.rect(), e.tier, e.is_boss);
        let theme = self.theme;
        let kind = theme.enemy_type(tier);

        spawn_explosion(
            &mut self.session.particles,
            rect.center_x(),
            rect.center_y(),
            kind.color,
            if is_boss { BOSS_EXPLOSION } else { ENEMY_EXPLOSION },
            self.rng,
        );
        let points = kind.score * if is_boss { BOSS_SCORE_FACTOR } else { 1 };
        let awarded = self.add_score(points);
        self.session.floats.push(FloatingText::new(
            format!("+{awarded}"),
            rect.x.clamp(4.0, self.config.width - 80.0),
            rect.y,
            kind.color,
            true,
        ));
        self.audio.play(Sfx::Explosion);

        if is_boss || self.rng.gen_bool(self.config.drop_chance) {
            if let Some(power_up) = theme.power_ups.choose(self.rng) {
                let size = self.config.drop_size;
                self.session.drops.push(PowerUpDrop {
                    x: rect.center_x() - size / 2.0,
                    y: rect.y,
                    vy: self.config.drop_speed,
                    size,
                    kind: power_up.id,
                });
            }
        }
    }

    // ── Enemies ──────────────────────────────────────────────────────────────

    pub fn update_enemies(&mut self) {
        let cfg = self.config;
        let bomb_vy = cfg.bomb_speed + self.session.wave as f32 * cfg.bomb_speed_per_wave;

        for i in 0..self.session.enemies.len() {
            if !self.session.enemies[i].alive {
                continue;
            }
            let player = self.session.player.rect();
            let speed = self.theme.enemy_type(self.session.enemies[i].tier).speed;

            let e = &mut self.session.enemies[i];
            e.pattern_t += PATTERN_STEP;
            match e.pattern {
                MovementPattern::Straight => {
                    e.x += e.vx;
                    e.y += e.vy;
                }
                MovementPattern::Zigzag => {
                    e.x += (e.pattern_t * 3.0).sin() * 2.0;
                    e.y += e.vy;
                }
                MovementPattern::Dive => {
                    if e.y < cfg.height * DIVE_THRESHOLD {
                        e.y += e.vy;
                    } else {
                        let dx = player.center_x() - e.rect().center_x();
                        if dx != 0.0 {
                            e.x += dx.signum() * speed * 1.5;
                        }
                        e.y += e.vy * 1.5;
                    }
                }
                MovementPattern::Boss => {
                    e.x += (e.pattern_t * 0.8).sin() * 3.0;
                    e.y += (e.pattern_t * 0.3).sin() * 0.8 + 0.2;
                }
            }

            if e.x < 0.0 {
                e.x = 0.0;
                e.vx = e.vx.abs();
            }
            if e.x + e.w > cfg.width {
                e.x = cfg.width - e.w;
                e.vx = -e.vx.abs();
            }

            // The swarm got through: back to the top, and it costs a life.
            let reached_bottom = e.y + e.h > cfg.height;
            if reached_bottom {
                e.y = -e.h;
            }

            e.hit_flash = e.hit_flash.saturating_sub(1);

            e.quote_timer -= 1;
            if e.quote_timer <= 0 {
                e.quote_alpha = 1.0;
                if let Some(q) = self.theme.enemy_quotes.choose(self.rng) {
                    e.quote = q.clone();
                }
                e.quote_timer = self.rng.gen_range(250..=500);
            }
            e.quote_alpha = (e.quote_alpha - QUOTE_FADE).max(0.0);

            e.bomb_timer -= 1;
            let fire_bomb = e.bomb_timer <= 0;
            if fire_bomb {
                e.bomb_timer = e.bomb_cooldown + self.rng.gen_range(-30..=30);
                self.session.bombs.push(Bomb {
                    x: e.x + e.w / 2.0 - cfg.bomb_w / 2.0,
                    y: e.y + e.h,
                    vx: (player.x - e.x) * BOMB_AIM_BIAS,
                    vy: bomb_vy,
                    w: cfg.bomb_w,
                    h: cfg.bomb_h,
                });
            }

            if reached_bottom {
                self.lose_life();
            }
            if fire_bomb {
                self.audio.play(Sfx::EnemyBomb);
            }

            // Contact always destroys the enemy; the shield only saves the life.
            let e = &self.session.enemies[i];
            if overlaps(&e.rect(), &self.session.player.rect()) {
                let (rect, color) = (e.rect(), self.theme.enemy_type(e.tier).color);
                self.session.enemies[i].alive = false;
                spawn_explosion(
                    &mut self.session.particles,
                    rect.center_x(),
                    rect.center_y(),
                    color,
                    CONTACT_EXPLOSION,
                    self.rng,
                );
                if !self.session.power_ups.is_active(PowerUpId::Shield) {
                    self.lose_life();
                }
            }
        }
    }

    // ── Bombs ────────────────────────────────────────────────────────────────

    pub fn update_bombs(&mut self) {
        let height = self.config.height;
        let mut bombs = std::mem::take(&mut self.session.bombs);
        bombs.retain_mut(|b| {
            b.x += b.vx;
            b.y += b.vy;
            if b.y > height {
                return false;
            }
            let player = self.session.player.rect();
            if self.session.player.invincible > 0 || !overlaps(&b.rect(), &player) {
                return true;
            }
            if self.session.power_ups.is_active(PowerUpId::Shield) {
                spawn_explosion(&mut self.session.particles, b.x, b.y, SHIELD_COLOR, SHIELD_BURST, self.rng);
            } else {
                spawn_explosion(
                    &mut self.session.particles,
                    player.center_x(),
                    player.center_y(),
                    HIT_COLOR,
                    BOMB_HIT_BURST,
                    self.rng,
                );
                self.lose_life();
            }
            false
        });
        self.session.bombs = bombs;
    }

    // ── Power-up drops ───────────────────────────────────────────────────────

    pub fn update_drops(&mut self) {
        let height = self.config.height;
        let mut drops = std::mem::take(&mut self.session.drops);
        drops.retain_mut(|d| {
            d.y += d.vy;
            if d.y > height {
                return false;
            }
            if overlaps(&d.rect(), &self.session.player.rect()) {
                self.activate_power_up(d.kind);
                return false;
            }
            true
        });
        self.session.drops = drops;
    }

    // ── Bonus targets ────────────────────────────────────────────────────────

    pub fn update_bonus_targets(&mut self) {
        let cfg = self.config;
        self.session.bonus_spawn_timer -= 1;
        if self.session.bonus_spawn_timer <= 0 {
            self.session.bonus_spawn_timer =
                self.session.bonus_spawn_cooldown + self.rng.gen_range(200..=400);
            let max_x = (cfg.width - cfg.bonus_w - 20.0).max(20.0 + f32::EPSILON);
            self.session.bonus_targets.push(BonusTarget {
                x: self.rng.gen_range(20.0..max_x),
                y: cfg.hud_height - cfg.bonus_h,
                w: cfg.bonus_w,
                h: cfg.bonus_h,
                vy: self.rng.gen_range(0.8..1.6),
            });
        }

        let mut targets = std::mem::take(&mut self.session.bonus_targets);
        targets.retain_mut(|t| {
            t.y += t.vy;
            if t.y > cfg.height + t.h {
                return false;
            }
            let rect = t.rect();
            let shot = self
                .session
                .bullets
                .iter()
                .rposition(|b| overlaps(&b.rect(), &rect));
            let caught = match shot {
                Some(bi) => {
                    self.session.bullets.remove(bi);
                    true
                }
                None => overlaps(&rect, &self.session.player.rect()),
            };
            if caught {
                self.catch_bonus(t);
            }
            !caught
        });
        self.session.bonus_targets = targets;
    }

    fn catch_bonus(&mut self, target: &BonusTarget) {
        let awarded = self.add_score(self.config.bonus_target_score);
        let rect = target.rect();
        self.session.floats.push(FloatingText::new(
            format!("{} +{awarded}", self.theme.bonus_label),
            (rect.x - 20.0).clamp(4.0, self.config.width - 140.0),
            rect.y,
            BONUS_COLOR,
            true,
        ));
        spawn_explosion(
            &mut self.session.particles,
            rect.center_x(),
            rect.center_y(),
            BONUS_COLOR,
            BONUS_BURST,
            self.rng,
        );
        self.audio.play(Sfx::BonusCatch);
        tracing::debug!(awarded, "bonus target caught");
    }
}
