//! Procedural chiptune audio.
//!
//! Two layers share one audio clock:
//! - one-shot sound effects, each a fixed recipe of tones and noise bursts
//! - a background loop that queues one bar at a time
//!
//! The loop is re-armed from a coarse wall-clock deadline (fired by
//! [`Audio::pump`]) slightly before the current bar ends, but every bar is
//! placed at the audio clock's *current* time, so lateness of the wall-clock
//! side never accumulates from bar to bar.

#[cfg(feature = "streaming")]
pub mod device;
pub mod mixer;
pub mod music;
pub mod voice;

use std::time::Duration;

use crate::timers::TimerQueue;

#[cfg(feature = "streaming")]
pub use device::AudioDevice;
pub use mixer::{Mixer, DEFAULT_SAMPLE_RATE};
pub use voice::{NoiseSpec, ToneSpec, Voice, Waveform};

pub const MASTER_GAIN: f32 = 0.35;
/// The next bar is queued this long before the current one ends.
pub const BAR_LEAD: Duration = Duration::from_millis(50);

/// Something that can play voices at absolute times on its own clock.
pub trait AudioBackend {
    /// Seconds on the backend's clock.
    fn current_time(&self) -> f64;
    fn schedule(&mut self, at: f64, voice: Voice);
    fn set_master_gain(&mut self, gain: f32);
    /// Wake a suspended output; most backends never suspend.
    fn resume(&mut self) {}
}

/// What the game needs from the audio service.
pub trait AudioControl {
    fn play(&mut self, sfx: Sfx);
    fn start_music(&mut self);
    fn stop_music(&mut self);
    /// Returns the new muted state.
    fn toggle_mute(&mut self) -> bool;
    fn is_muted(&self) -> bool;
}

/// An audio service that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl AudioControl for Silent {
    fn play(&mut self, _sfx: Sfx) {}
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
    fn toggle_mute(&mut self) -> bool {
        false
    }
    fn is_muted(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sfx {
    Shoot,
    Explosion,
    PlayerHit,
    LevelUp,
    GameOver,
    PowerUp,
    MenuBlip,
    /// Enemy fires a bomb, or takes a non-lethal hit.
    EnemyBomb,
    BonusCatch,
}

impl Sfx {
    /// The voices making up this effect, as `(offset seconds, voice)`.
    pub fn recipe(self) -> Vec<(f64, Voice)> {
        use Waveform::*;
        let now = |v: Voice| (0.0, v);
        match self {
            Sfx::Shoot => vec![now(ToneSpec::new(880.0, Square, 0.18, 0.08)
                .sweep_to(220.0)
                .attack(0.001)
                .into())],
            Sfx::Explosion => vec![
                now(NoiseSpec::new(0.6, 0.35, 200.0, 0.3).into()),
                now(ToneSpec::new(80.0, Sawtooth, 0.4, 0.3)
                    .sweep_to(40.0)
                    .attack(0.01)
                    .into()),
            ],
            Sfx::PlayerHit => vec![
                now(NoiseSpec::new(0.5, 0.5, 400.0, 0.2).into()),
                now(ToneSpec::new(200.0, Sawtooth, 0.5, 0.45)
                    .sweep_to(60.0)
                    .attack(0.01)
                    .into()),
                (
                    0.05,
                    ToneSpec::new(150.0, Square, 0.3, 0.5)
                        .sweep_to(50.0)
                        .attack(0.02)
                        .into(),
                ),
            ],
            Sfx::LevelUp => arpeggio(&[523.0, 659.0, 784.0, 880.0, 1047.0, 880.0, 784.0, 659.0, 523.0], 0.08, |f| {
                ToneSpec::new(f, Square, 0.22, 0.1)
            }),
            Sfx::GameOver => arpeggio(&[440.0, 392.0, 349.0, 330.0, 294.0, 262.0], 0.15, |f| {
                ToneSpec::new(f, Sawtooth, 0.3, 0.18).attack(0.01)
            }),
            Sfx::PowerUp => arpeggio(&[523.0, 784.0, 1047.0, 1319.0], 0.09, |f| {
                ToneSpec::new(f, Triangle, 0.2, 0.15)
            }),
            Sfx::MenuBlip => vec![now(ToneSpec::new(660.0, Square, 0.1, 0.05).attack(0.001).into())],
            Sfx::EnemyBomb => vec![now(ToneSpec::new(300.0, Triangle, 0.15, 0.12)
                .sweep_to(150.0)
                .attack(0.01)
                .into())],
            Sfx::BonusCatch => arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.1, |f| {
                ToneSpec::new(f, Square, 0.25, 0.12).attack(0.005)
            }),
        }
    }
}

fn arpeggio(freqs: &[f32], spacing: f64, tone: impl Fn(f32) -> ToneSpec) -> Vec<(f64, Voice)> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, f)| (i as f64 * spacing, tone(*f).into()))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum MusicTimer {
    NextBar,
}

/// The audio service.  Without a backend (no device, or audio failed to
/// come up) every call is a no-op and the game runs on unaffected.
pub struct Audio<B: AudioBackend = Mixer> {
    backend: Option<B>,
    muted: bool,
    /// Someone wants music (cleared only by `stop_music`).
    music_requested: bool,
    /// Bars are actually being scheduled.
    music_running: bool,
    timers: TimerQueue<MusicTimer, MusicTimer>,
    /// Last wall-clock time seen by `pump`.
    wall_now: Duration,
    bars_scheduled: u64,
    last_bar_start: Option<f64>,
}

impl<B: AudioBackend> Audio<B> {
    pub fn new(backend: B) -> Self {
        let mut audio = Self::disabled();
        audio.backend = Some(backend);
        audio
    }

    pub fn disabled() -> Self {
        Audio {
            backend: None,
            muted: false,
            music_requested: false,
            music_running: false,
            timers: TimerQueue::new(),
            wall_now: Duration::ZERO,
            bars_scheduled: 0,
            last_bar_start: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn resume(&mut self) {
        if let Some(b) = self.backend.as_mut() {
            b.resume();
        }
    }

    /// Stop the loop and let go of the backend for good.
    pub fn teardown(&mut self) {
        self.stop_music();
        self.backend = None;
    }

    pub fn is_music_running(&self) -> bool {
        self.music_running
    }

    pub fn bars_scheduled(&self) -> u64 {
        self.bars_scheduled
    }

    /// Audio-clock start of the most recently queued bar.
    pub fn last_bar_start(&self) -> Option<f64> {
        self.last_bar_start
    }

    /// Wall-clock time at which the next bar gets queued, if the loop runs.
    pub fn next_bar_due(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn bar_interval() -> Duration {
        Duration::from_secs_f64(music::BAR_SECONDS).saturating_sub(BAR_LEAD)
    }

    /// Advance the wall clock; queues the next bar when its deadline passed.
    pub fn pump(&mut self, wall_now: Duration) {
        self.wall_now = wall_now;
        for _ in self.timers.drain_due(wall_now) {
            if self.music_running {
                self.queue_bar();
            }
        }
    }

    fn queue_bar(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let start = backend.current_time();
        let voices = music::schedule_bar(backend, start);
        self.bars_scheduled += 1;
        self.last_bar_start = Some(start);
        tracing::trace!(bar = self.bars_scheduled, start, voices, "music bar queued");
        let due = self.wall_now + Self::bar_interval();
        self.timers.schedule_keyed(MusicTimer::NextBar, due, MusicTimer::NextBar);
    }

    fn start_loop(&mut self) {
        if self.backend.is_none() || self.muted || self.music_running {
            return;
        }
        self.music_running = true;
        self.timers.bump_generation();
        tracing::debug!("music loop started");
        self.queue_bar();
    }

    fn stop_loop(&mut self) {
        if self.music_running {
            tracing::debug!("music loop stopped");
        }
        self.music_running = false;
        self.timers.cancel(&MusicTimer::NextBar);
        self.timers.bump_generation();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_loop();
            if let Some(b) = self.backend.as_mut() {
                b.set_master_gain(0.0);
            }
        } else {
            if let Some(b) = self.backend.as_mut() {
                b.set_master_gain(MASTER_GAIN);
            }
            if self.music_requested {
                self.start_loop();
            }
        }
        tracing::debug!(muted, "mute changed");
    }
}

impl<B: AudioBackend> AudioControl for Audio<B> {
    fn play(&mut self, sfx: Sfx) {
        if self.muted {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let now = backend.current_time();
        for (offset, voice) in sfx.recipe() {
            backend.schedule(now + offset, voice);
        }
    }

    fn start_music(&mut self) {
        self.music_requested = true;
        self.start_loop();
    }

    fn stop_music(&mut self) {
        self.music_requested = false;
        self.stop_loop();
    }

    fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    fn is_muted(&self) -> bool {
        self.muted
    }
}
