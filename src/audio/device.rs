//! Plays a [`Mixer`] through the system audio device using rodio.
//!
//! The output thread pulls samples from the mixer in blocks; that pull is
//! what advances the mixer's clock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::{OutputStream, Sink, Source};

use super::Mixer;
use crate::error::{GameError, Result};

/// Samples rendered per lock of the mixer.
const BLOCK: usize = 512;

/// Endless mono source rendering from the mixer.
struct MixerSource {
    mixer: Mixer,
    sample_rate: u32,
    block: Vec<f32>,
    pos: usize,
    finished: Arc<AtomicBool>,
}

impl MixerSource {
    fn new(mixer: Mixer, finished: Arc<AtomicBool>) -> Self {
        let sample_rate = mixer.sample_rate();
        MixerSource {
            mixer,
            sample_rate,
            block: vec![0.0; BLOCK],
            pos: BLOCK,
            finished,
        }
    }
}

impl Iterator for MixerSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.finished.load(Ordering::Relaxed) {
            return None;
        }
        if self.pos >= self.block.len() {
            self.mixer.render(&mut self.block);
            self.pos = 0;
        }
        let sample = self.block[self.pos];
        self.pos += 1;
        Some(sample)
    }
}

impl Source for MixerSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.block.len() - self.pos.min(self.block.len()))
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Keeps the output stream open for as long as it lives.
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    finished: Arc<AtomicBool>,
}

impl AudioDevice {
    pub fn open(mixer: Mixer) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| GameError::AudioDevice(format!("no output stream: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| GameError::AudioDevice(format!("no sink: {e}")))?;
        let finished = Arc::new(AtomicBool::new(false));
        sink.append(MixerSource::new(mixer, Arc::clone(&finished)));
        tracing::info!("audio device open");
        Ok(AudioDevice {
            _stream: stream,
            sink,
            finished,
        })
    }

    pub fn pause(&self) {
        self.sink.pause();
    }

    pub fn play(&self) {
        self.sink.play();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.finished.store(true, Ordering::Relaxed);
        self.sink.pause();
    }
}
