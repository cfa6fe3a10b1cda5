//! Sound building blocks: enveloped oscillator tones and filtered noise bursts.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sawtooth,
    Triangle,
    Sine,
}

impl Waveform {
    /// One sample of the waveform at `phase` (cycles, 0..1).
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            Waveform::Sine => (std::f32::consts::TAU * phase).sin(),
        }
    }
}

/// An oscillator note: linear attack to `volume`, then an exponential fade
/// that reaches 0.001 at `duration`.  With `freq_end` set the pitch glides
/// exponentially over the whole duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub freq: f32,
    pub freq_end: Option<f32>,
    pub waveform: Waveform,
    pub volume: f32,
    /// Seconds.
    pub duration: f32,
    /// Seconds.
    pub attack: f32,
}

impl ToneSpec {
    pub fn new(freq: f32, waveform: Waveform, volume: f32, duration: f32) -> Self {
        ToneSpec {
            freq,
            freq_end: None,
            waveform,
            volume,
            duration,
            attack: 0.005,
        }
    }

    pub fn sweep_to(mut self, freq_end: f32) -> Self {
        self.freq_end = Some(freq_end);
        self
    }

    pub fn attack(mut self, attack: f32) -> Self {
        self.attack = attack;
        self
    }
}

/// White noise through a band-pass filter, fading from `volume` to 0.001.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSpec {
    pub volume: f32,
    /// Seconds.
    pub duration: f32,
    pub center_freq: f32,
    pub q: f32,
}

impl NoiseSpec {
    pub fn new(volume: f32, duration: f32, center_freq: f32, q: f32) -> Self {
        NoiseSpec {
            volume,
            duration,
            center_freq,
            q,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Voice {
    Tone(ToneSpec),
    Noise(NoiseSpec),
}

/// Voices keep sounding this long past their nominal duration.
pub const RELEASE_TAIL: f32 = 0.01;

impl Voice {
    pub fn duration(&self) -> f32 {
        match self {
            Voice::Tone(t) => t.duration,
            Voice::Noise(n) => n.duration,
        }
    }

    /// Seconds from start until the voice is silent for good.
    pub fn lifetime(&self) -> f32 {
        self.duration() + RELEASE_TAIL
    }
}

impl From<ToneSpec> for Voice {
    fn from(t: ToneSpec) -> Self {
        Voice::Tone(t)
    }
}

impl From<NoiseSpec> for Voice {
    fn from(n: NoiseSpec) -> Self {
        Voice::Noise(n)
    }
}

/// Frequency of `semitone` in `octave`, counted up from A0 = 27.5 Hz.
pub fn note_freq(semitone: i32, octave: i32) -> f32 {
    27.5 * 2f32.powf((semitone + octave * 12) as f32 / 12.0)
}
