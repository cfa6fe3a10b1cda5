//! The background groove: one 16-step bar of bass, lead, arpeggio and drums,
//! queued in full against the audio clock each time it is scheduled.

use super::voice::{note_freq, NoiseSpec, ToneSpec, Waveform};
use super::AudioBackend;

/// Seconds per 16th-note step.
pub const STEP_SECONDS: f64 = 0.135;
pub const STEPS_PER_BAR: usize = 16;
pub const BAR_SECONDS: f64 = STEP_SECONDS * STEPS_PER_BAR as f64;

/// (semitone, octave) per step.
#[rustfmt::skip]
const BASS: [(i32, i32); STEPS_PER_BAR] = [
    (0, 2), (0, 2), (12, 2), (0, 2),
    (7, 2), (7, 2), (5, 2), (7, 2),
    (3, 2), (3, 2), (10, 2), (3, 2),
    (5, 2), (5, 2), (5, 2), (7, 2),
];

/// `None` is a rest.
#[rustfmt::skip]
const LEAD: [Option<i32>; STEPS_PER_BAR] = [
    Some(12), None, Some(12), Some(15),
    Some(19), None, Some(17), Some(15),
    Some(10), Some(12), None, Some(10),
    Some(7), Some(10), Some(12), None,
];
const LEAD_OCTAVE: i32 = 4;

/// Chord roots, read on every fourth step.
const ARP: [i32; STEPS_PER_BAR] = [0, 4, 7, 12, 0, 4, 7, 12, 3, 7, 10, 15, 3, 7, 10, 15];
const ARP_OCTAVE: i32 = 4;

/// Queue every voice of one bar starting at `bar_start` (audio clock
/// seconds).  Returns how many voices were queued.
pub fn schedule_bar<B: AudioBackend + ?Sized>(backend: &mut B, bar_start: f64) -> usize {
    let step = STEP_SECONDS as f32;
    let mut queued = 0;
    let mut put = |backend: &mut B, at: f64, voice: super::Voice| {
        backend.schedule(at, voice);
        queued += 1;
    };

    for i in 0..STEPS_PER_BAR {
        let t = bar_start + i as f64 * STEP_SECONDS;

        let (n, oct) = BASS[i];
        put(
            backend,
            t,
            ToneSpec::new(note_freq(n, oct), Waveform::Sawtooth, 0.12, step * 0.7)
                .attack(0.01)
                .into(),
        );

        if let Some(n) = LEAD[i] {
            put(
                backend,
                t,
                ToneSpec::new(note_freq(n, LEAD_OCTAVE), Waveform::Square, 0.1, step * 0.85)
                    .attack(0.005)
                    .into(),
            );
        }

        if i % 4 == 0 {
            let root = ARP[i];
            for (ai, n) in [root, root + 4, root + 7].into_iter().enumerate() {
                put(
                    backend,
                    t + ai as f64 * STEP_SECONDS * 0.33,
                    ToneSpec::new(note_freq(n, ARP_OCTAVE), Waveform::Triangle, 0.06, step * 0.5)
                        .attack(0.003)
                        .into(),
                );
            }
        }

        // Kick
        if i == 0 || i == 8 {
            put(backend, t, NoiseSpec::new(0.25, 0.06, 120.0, 0.3).into());
            put(
                backend,
                t,
                ToneSpec::new(80.0, Waveform::Sine, 0.35, 0.1)
                    .sweep_to(30.0)
                    .attack(0.002)
                    .into(),
            );
        }

        // Snare
        if i == 4 || i == 12 {
            put(backend, t, NoiseSpec::new(0.3, 0.08, 900.0, 0.4).into());
            put(
                backend,
                t,
                ToneSpec::new(220.0, Waveform::Triangle, 0.12, 0.08)
                    .sweep_to(110.0)
                    .attack(0.002)
                    .into(),
            );
        }

        // Hi-hat
        if i % 2 == 0 {
            put(backend, t, NoiseSpec::new(0.08, 0.025, 8000.0, 1.5).into());
        }
    }

    queued
}
