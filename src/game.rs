/// The game state machine.
///
/// `Game` owns the running session, the tables and tunables, the RNG and the
/// timer queue.  The host feeds it one [`Game::frame`] per display refresh
/// and forwards discrete commands through [`Game::command`]; rendering reads
/// the session back through the accessors and never mutates anything.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::audio::{AudioControl, Sfx};
use crate::background::Background;
use crate::compute::{GameTimer, LifeLoss, Tick, TickOutcome};
use crate::config::GameConfig;
use crate::entities::{GameStatus, Player, PowerUps, Session};
use crate::input::{Command, InputState};
use crate::theme::{PowerUpId, Theme};
use crate::timers::TimerQueue;
use crate::wave::build_wave;

/// Idle background speed behind the menu-like screens.
const MENU_SCROLL: f32 = 0.5;
/// How long each flavor line stays on the menu.
const FLAVOR_PERIOD: Duration = Duration::from_secs(4);
/// Touch drags move the ship by this fraction of the finger's travel.
const TOUCH_DRAG_FACTOR: f32 = 0.5;
/// The ship starts this far above the bottom edge.
const PLAYER_START_MARGIN: f32 = 30.0;

/// What the game-over screen shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameOverInfo {
    pub score: u32,
    pub high_score: u32,
    pub wave: u32,
    pub reason: String,
    pub quote: String,
}

pub struct Game {
    status: GameStatus,
    config: GameConfig,
    theme: Theme,
    rng: StdRng,
    session: Option<Session>,
    timers: TimerQueue<GameTimer, GameTimer>,
    menu_background: Background,
    high_score: u32,
    /// Set when a game ends above the stored high score, until taken.
    new_high_score: Option<u32>,
    game_over: Option<GameOverInfo>,
    /// Bonus paid for the wave just cleared.
    level_clear_bonus: Option<u32>,
    /// Game clock as of the last frame.
    now: Duration,
}

impl Game {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        Self::with_rng(config, theme, StdRng::from_entropy())
    }

    pub fn with_rng(config: GameConfig, theme: Theme, mut rng: StdRng) -> Self {
        let menu_background = Background::new(&config, &mut rng);
        Game {
            status: GameStatus::Menu,
            config,
            theme,
            rng,
            session: None,
            timers: TimerQueue::new(),
            menu_background,
            high_score: 0,
            new_high_score: None,
            game_over: None,
            level_clear_bonus: None,
            now: Duration::ZERO,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// The running session; `None` on the menu.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn menu_background(&self) -> &Background {
        &self.menu_background
    }

    pub fn score(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    pub fn lives(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.lives)
    }

    pub fn wave(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.wave)
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn set_high_score(&mut self, score: u32) {
        self.high_score = score;
    }

    /// A high score set since the last call, for the host to persist.
    pub fn take_new_high_score(&mut self) -> Option<u32> {
        self.new_high_score.take()
    }

    pub fn game_over_info(&self) -> Option<&GameOverInfo> {
        self.game_over.as_ref()
    }

    pub fn level_clear_bonus(&self) -> Option<u32> {
        self.level_clear_bonus
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time at which the pending wave transition fires, if any.
    pub fn next_wave_due(&self) -> Option<Duration> {
        self.timers.deadline_of(&GameTimer::NextWave)
    }

    /// The menu tagline for the given moment.
    pub fn flavor_text(&self, now: Duration) -> Option<&str> {
        let texts = &self.theme.flavor_texts;
        if texts.is_empty() {
            return None;
        }
        let slot = (now.as_millis() / FLAVOR_PERIOD.as_millis()) as usize;
        Some(texts[slot % texts.len()].as_str())
    }

    // ── Per-frame driver ─────────────────────────────────────────────────────

    /// Advance the game by one frame at game-clock time `now`.
    pub fn frame<A: AudioControl + ?Sized>(&mut self, now: Duration, input: &InputState, audio: &mut A) {
        self.now = now;
        for timer in self.timers.drain_due(now) {
            self.fire_timer(timer, audio);
        }

        match self.status {
            GameStatus::Play => self.update_play(input, audio),
            GameStatus::Paused => {}
            GameStatus::Menu | GameStatus::LevelClear | GameStatus::GameOver => {
                self.menu_background.update(MENU_SCROLL, &mut self.rng);
            }
        }
    }

    fn update_play<A: AudioControl + ?Sized>(&mut self, input: &InputState, audio: &mut A) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let scroll = 1.0 + session.wave as f32 * 0.05;
        session.background.update(scroll, &mut self.rng);

        let outcome = Tick::new(
            session,
            &self.theme,
            &self.config,
            &mut self.rng,
            audio,
            &mut self.timers,
            self.now,
        )
        .run(input);

        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::GameOver => self.enter_game_over(audio),
            TickOutcome::WaveCleared => self.enter_level_clear(audio),
        }
    }

    fn fire_timer<A: AudioControl + ?Sized>(&mut self, timer: GameTimer, audio: &mut A) {
        match timer {
            GameTimer::PowerUpExpired(id) => {
                if let Some(session) = self.session.as_mut() {
                    session.power_ups.deactivate(id);
                    tracing::debug!(?id, "power-up expired");
                }
            }
            GameTimer::NextWave => {
                if self.status == GameStatus::LevelClear {
                    self.next_wave(audio);
                }
            }
        }
    }

    fn tick<'a, A: AudioControl + ?Sized>(&'a mut self, audio: &'a mut A) -> Option<Tick<'a, StdRng, A>> {
        let session = self.session.as_mut()?;
        Some(Tick::new(
            session,
            &self.theme,
            &self.config,
            &mut self.rng,
            audio,
            &mut self.timers,
            self.now,
        ))
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    pub fn command<A: AudioControl + ?Sized>(&mut self, command: Command, audio: &mut A) {
        match command {
            Command::Start => {
                if matches!(self.status, GameStatus::Menu | GameStatus::GameOver) {
                    self.start_game(audio);
                }
            }
            Command::TogglePause => match self.status {
                GameStatus::Play => self.pause(audio),
                GameStatus::Paused => self.resume(audio),
                _ => {}
            },
            Command::ToggleMute => {
                let muted = audio.toggle_mute();
                tracing::info!(muted, "mute toggled");
            }
            Command::ReturnToMenu => self.return_to_menu(audio),
        }
    }

    // ── State transitions ────────────────────────────────────────────────────

    pub fn start_game<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        self.timers.bump_generation();
        self.game_over = None;
        self.level_clear_bonus = None;
        self.new_high_score = None;
        let session = self.new_session(1, 0, self.config.starting_lives);
        self.session = Some(session);
        self.status = GameStatus::Play;
        audio.start_music();
        audio.play(Sfx::MenuBlip);
        tracing::info!("game started");
    }

    pub fn pause<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        if self.status != GameStatus::Play {
            return;
        }
        self.status = GameStatus::Paused;
        audio.stop_music();
        tracing::info!(wave = self.wave(), "paused");
    }

    pub fn resume<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        if self.status != GameStatus::Paused {
            return;
        }
        self.status = GameStatus::Play;
        audio.start_music();
        tracing::info!(wave = self.wave(), "resumed");
    }

    pub fn return_to_menu<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        if self.status == GameStatus::Menu {
            return;
        }
        self.timers.bump_generation();
        self.session = None;
        self.level_clear_bonus = None;
        self.status = GameStatus::Menu;
        audio.stop_music();
        tracing::info!("back to menu");
    }

    fn enter_level_clear<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        let now = self.now;
        let per_wave = self.config.level_clear_bonus_per_wave;
        let delay = Duration::from_millis(self.config.level_clear_delay_ms);
        let Some(mut tick) = self.tick(audio) else {
            return;
        };
        let wave = tick.session.wave;
        let bonus = tick.add_score(wave.saturating_mul(per_wave));
        drop(tick);

        self.status = GameStatus::LevelClear;
        self.level_clear_bonus = Some(bonus);
        audio.play(Sfx::LevelUp);
        audio.stop_music();
        self.timers.schedule_keyed(GameTimer::NextWave, now + delay, GameTimer::NextWave);
        tracing::info!(wave, bonus, score = self.score(), "wave cleared");
    }

    fn next_wave<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        let Some(old) = self.session.as_ref() else {
            return;
        };
        let (wave, score, lives) = (old.wave + 1, old.score, old.lives);
        self.timers.bump_generation();
        let session = self.new_session(wave, score, lives);
        self.session = Some(session);
        self.level_clear_bonus = None;
        self.status = GameStatus::Play;
        audio.start_music();
        tracing::info!(wave, "next wave");
    }

    fn enter_game_over<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        self.timers.bump_generation();
        self.status = GameStatus::GameOver;
        audio.stop_music();
        audio.play(Sfx::GameOver);

        let (score, wave) = (self.score(), self.wave());
        if score > self.high_score {
            self.high_score = score;
            self.new_high_score = Some(score);
        }
        self.game_over = Some(GameOverInfo {
            score,
            high_score: self.high_score,
            wave,
            reason: self.theme.death_reasons.choose(&mut self.rng).cloned().unwrap_or_default(),
            quote: self.theme.game_over_quotes.choose(&mut self.rng).cloned().unwrap_or_default(),
        });
        tracing::info!(score, wave, high_score = self.high_score, "game over");
    }

    fn new_session(&mut self, wave: u32, score: u32, lives: u32) -> Session {
        let cfg = &self.config;
        let rng = &mut self.rng;
        Session {
            score,
            lives,
            wave,
            player: Player {
                x: cfg.width / 2.0 - cfg.player_w / 2.0,
                y: cfg.height - cfg.player_h - PLAYER_START_MARGIN,
                w: cfg.player_w,
                h: cfg.player_h,
                invincible: 0,
                shoot_cooldown_ms: 0.0,
            },
            bullets: Vec::new(),
            enemies: build_wave(wave, &self.theme, cfg, rng),
            bombs: Vec::new(),
            drops: Vec::new(),
            bonus_targets: Vec::new(),
            particles: Vec::new(),
            floats: Vec::new(),
            power_ups: PowerUps::default(),
            background: Background::new(cfg, rng),
            bonus_spawn_timer: rng.gen_range(300..=600),
            bonus_spawn_cooldown: rng.gen_range(300..=600),
        }
    }

    // ── Direct actions ───────────────────────────────────────────────────────

    /// Take a hit outside the normal update (the update calls this itself).
    pub fn lose_life<A: AudioControl + ?Sized>(&mut self, audio: &mut A) -> LifeLoss {
        if self.status != GameStatus::Play {
            return LifeLoss::Ignored;
        }
        let Some(mut tick) = self.tick(audio) else {
            return LifeLoss::Ignored;
        };
        let loss = tick.lose_life();
        drop(tick);
        if loss == LifeLoss::GameOver {
            self.enter_game_over(audio);
        }
        loss
    }

    pub fn activate_power_up<A: AudioControl + ?Sized>(&mut self, id: PowerUpId, audio: &mut A) {
        if let Some(mut tick) = self.tick(audio) {
            tick.activate_power_up(id);
        }
    }

    /// Fire if the gun is ready; only while playing.
    pub fn try_shoot<A: AudioControl + ?Sized>(&mut self, audio: &mut A) -> bool {
        if self.status != GameStatus::Play {
            return false;
        }
        self.tick(audio).is_some_and(|mut tick| tick.try_shoot())
    }

    /// Horizontal finger drag of `dx` pixels.
    pub fn touch_drag(&mut self, dx: f32) {
        if self.status != GameStatus::Play {
            return;
        }
        let width = self.config.width;
        if let Some(s) = self.session.as_mut() {
            let p = &mut s.player;
            p.x = (p.x + dx * TOUCH_DRAG_FACTOR).clamp(0.0, width - p.w);
        }
    }

    /// A tap starts a game from the menu screens and fires while playing.
    pub fn touch_tap<A: AudioControl + ?Sized>(&mut self, audio: &mut A) {
        match self.status {
            GameStatus::Menu | GameStatus::GameOver => self.start_game(audio),
            GameStatus::Play => {
                self.try_shoot(audio);
            }
            GameStatus::Paused | GameStatus::LevelClear => {}
        }
    }
}
