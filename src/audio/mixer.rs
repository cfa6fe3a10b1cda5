//! Sample-accurate software mixer.
//!
//! Voices are queued at absolute times on the mixer's own clock, which only
//! advances as samples are rendered (by the output thread, or by a test
//! pulling buffers directly).  Handles are cheap clones sharing one state.

use std::f32::consts::PI;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::voice::{NoiseSpec, ToneSpec, Voice};
use super::AudioBackend;

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Envelope floor that exponential fades aim for.
const FADE_FLOOR: f32 = 0.001;

/// Band-pass biquad, constant 0 dB peak gain.
#[derive(Clone, Copy, Debug)]
struct BiquadBandPass {
    b0: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadBandPass {
    fn new(center: f32, q: f32, sample_rate: f32) -> Self {
        let nyquist_safe = center.clamp(10.0, sample_rate * 0.45);
        let w0 = 2.0 * PI * (nyquist_safe / sample_rate);
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q.max(0.05));
        let a0 = 1.0 + alpha;
        BiquadBandPass {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b2 * self.x2 - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Exponential fade from `from` down to the floor over `span` seconds.
fn exp_fade(from: f32, elapsed: f32, span: f32) -> f32 {
    if from <= FADE_FLOOR || span <= 0.0 {
        return from.min(FADE_FLOOR);
    }
    from * (FADE_FLOOR / from).powf((elapsed / span).clamp(0.0, 1.0))
}

fn tone_envelope(t: &ToneSpec, elapsed: f32) -> f32 {
    if elapsed >= t.duration {
        return 0.0;
    }
    if elapsed < t.attack {
        return t.volume * elapsed / t.attack;
    }
    exp_fade(t.volume, elapsed - t.attack, t.duration - t.attack)
}

fn tone_freq(t: &ToneSpec, elapsed: f32) -> f32 {
    match t.freq_end {
        Some(end) if t.freq > 0.0 && end > 0.0 && t.duration > 0.0 => {
            t.freq * (end / t.freq).powf((elapsed / t.duration).clamp(0.0, 1.0))
        }
        _ => t.freq,
    }
}

struct ActiveVoice {
    voice: Voice,
    /// First sample index on the mixer clock.
    start: u64,
    /// Sample index at which the voice is dropped.
    end: u64,
    phase: f32,
    filter: Option<BiquadBandPass>,
}

impl ActiveVoice {
    fn new(voice: Voice, start: u64, sample_rate: f32) -> Self {
        let end = start + (voice.lifetime() * sample_rate).ceil() as u64;
        let filter = match voice {
            Voice::Noise(NoiseSpec { center_freq, q, .. }) => {
                Some(BiquadBandPass::new(center_freq, q, sample_rate))
            }
            Voice::Tone(_) => None,
        };
        ActiveVoice {
            voice,
            start,
            end,
            phase: 0.0,
            filter,
        }
    }

    fn sample(&mut self, index: u64, sample_rate: f32, rng: &mut StdRng) -> f32 {
        if index < self.start || index >= self.end {
            return 0.0;
        }
        let elapsed = (index - self.start) as f32 / sample_rate;
        match self.voice {
            Voice::Tone(t) => {
                let out = t.waveform.sample(self.phase) * tone_envelope(&t, elapsed);
                self.phase = (self.phase + tone_freq(&t, elapsed) / sample_rate).fract();
                out
            }
            Voice::Noise(n) => {
                if elapsed >= n.duration {
                    return 0.0;
                }
                let white: f32 = rng.gen_range(-1.0..1.0);
                let filtered = match self.filter.as_mut() {
                    Some(f) => f.process(white),
                    None => white,
                };
                filtered * exp_fade(n.volume, elapsed, n.duration)
            }
        }
    }
}

struct MixerState {
    sample_rate: u32,
    /// Samples rendered so far; this is the audio clock.
    rendered: u64,
    gain: f32,
    voices: Vec<ActiveVoice>,
    noise: StdRng,
}

#[derive(Clone)]
pub struct Mixer {
    state: Arc<Mutex<MixerState>>,
}

impl Mixer {
    pub fn new(sample_rate: u32) -> Self {
        Mixer {
            state: Arc::new(Mutex::new(MixerState {
                sample_rate: sample_rate.max(1),
                rendered: 0,
                gain: super::MASTER_GAIN,
                voices: Vec::new(),
                noise: StdRng::from_entropy(),
            })),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.state.lock().sample_rate
    }

    pub fn gain(&self) -> f32 {
        self.state.lock().gain
    }

    /// Voices queued or still sounding.
    pub fn voice_count(&self) -> usize {
        self.state.lock().voices.len()
    }

    /// Start times (seconds, audio clock) of every queued voice.
    pub fn voice_starts(&self) -> Vec<f64> {
        let state = self.state.lock();
        let sr = state.sample_rate as f64;
        state.voices.iter().map(|v| v.start as f64 / sr).collect()
    }

    /// Render the next `out.len()` mono samples and advance the clock.
    pub fn render(&self, out: &mut [f32]) {
        let mut state = self.state.lock();
        let MixerState {
            sample_rate,
            rendered,
            gain,
            voices,
            noise,
        } = &mut *state;
        let sr = *sample_rate as f32;

        for (k, slot) in out.iter_mut().enumerate() {
            let index = *rendered + k as u64;
            let mut sum = 0.0;
            for v in voices.iter_mut() {
                sum += v.sample(index, sr, noise);
            }
            *slot = (sum * *gain).clamp(-1.0, 1.0);
        }

        *rendered += out.len() as u64;
        let now = *rendered;
        voices.retain(|v| v.end > now);
    }

    /// Render and discard `seconds` of audio.
    pub fn advance(&self, seconds: f64) {
        let frames = (seconds * self.sample_rate() as f64).round() as usize;
        let mut scratch = vec![0.0f32; 1024];
        let mut left = frames;
        while left > 0 {
            let n = left.min(scratch.len());
            self.render(&mut scratch[..n]);
            left -= n;
        }
    }
}

impl AudioBackend for Mixer {
    fn current_time(&self) -> f64 {
        let state = self.state.lock();
        state.rendered as f64 / state.sample_rate as f64
    }

    fn schedule(&mut self, at: f64, voice: Voice) {
        let mut state = self.state.lock();
        let sr = state.sample_rate as f32;
        let start = (at.max(0.0) * sr as f64).round() as u64;
        let v = ActiveVoice::new(voice, start, sr);
        if v.end > state.rendered {
            state.voices.push(v);
        }
    }

    fn set_master_gain(&mut self, gain: f32) {
        self.state.lock().gain = gain;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::voice::Waveform;

    #[test]
    fn clock_advances_only_when_rendering() {
        let mixer = Mixer::new(1000);
        assert_eq!(mixer.current_time(), 0.0);
        let mut buf = [0.0f32; 500];
        mixer.render(&mut buf);
        assert!((mixer.current_time() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn scheduled_tone_is_audible_then_retired() {
        let mut mixer = Mixer::new(8000);
        mixer.schedule(0.01, ToneSpec::new(440.0, Waveform::Square, 0.3, 0.05).into());
        assert_eq!(mixer.voice_count(), 1);

        let mut buf = vec![0.0f32; 800];
        mixer.render(&mut buf);
        let silent_lead = buf[..80].iter().all(|s| *s == 0.0);
        let energy: f32 = buf[80..].iter().map(|s| s.abs()).sum();
        assert!(silent_lead);
        assert!(energy > 0.0);
        assert_eq!(mixer.voice_count(), 0);
    }

    #[test]
    fn noise_burst_produces_signal() {
        let mut mixer = Mixer::new(8000);
        mixer.schedule(0.0, NoiseSpec::new(0.5, 0.05, 800.0, 0.5).into());
        let mut buf = vec![0.0f32; 400];
        mixer.render(&mut buf);
        assert!(buf.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn voices_in_the_past_are_dropped() {
        let mut mixer = Mixer::new(1000);
        mixer.advance(1.0);
        mixer.schedule(0.1, ToneSpec::new(440.0, Waveform::Sine, 0.3, 0.1).into());
        assert_eq!(mixer.voice_count(), 0);
    }

    #[test]
    fn zero_gain_silences_output() {
        let mut mixer = Mixer::new(8000);
        mixer.set_master_gain(0.0);
        mixer.schedule(0.0, ToneSpec::new(440.0, Waveform::Square, 0.3, 0.05).into());
        let mut buf = vec![1.0f32; 400];
        mixer.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn sweep_reaches_end_frequency() {
        let t = ToneSpec::new(880.0, Waveform::Square, 0.2, 0.1).sweep_to(220.0);
        assert!((tone_freq(&t, 0.0) - 880.0).abs() < 1e-3);
        assert!((tone_freq(&t, 0.1) - 220.0).abs() < 1e-2);
    }
}
