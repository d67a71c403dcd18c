//! Sample-accurate sine synthesis of scheduled tones.

use std::f64::consts::TAU;

use super::tone::ScheduledTone;

/// One sounding oscillator
#[derive(Debug, Clone)]
struct Voice {
    tone: ScheduledTone,
    phase: f64,
}

/// Renders scheduled tones against a frame-counted clock
///
/// The clock only advances as frames are rendered, so tone start times are
/// sample-accurate regardless of how the callback chunks its buffers.
#[derive(Debug)]
pub struct ToneMixer {
    sample_rate_hz: u32,
    frames_rendered: u64,
    voices: Vec<Voice>,
    scheduled: Vec<ScheduledTone>,
    closed: bool,
}

impl ToneMixer {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz: sample_rate_hz.max(1),
            frames_rendered: 0,
            voices: Vec::new(),
            scheduled: Vec::new(),
            closed: false,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Current clock position (seconds)
    pub fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / self.sample_rate_hz as f64
    }

    /// Register a tone; ignored once the mixer is closed
    pub fn schedule(&mut self, tone: ScheduledTone) {
        if self.closed {
            return;
        }
        self.scheduled.push(tone);
        self.voices.push(Voice { tone, phase: 0.0 });
    }

    /// Every tone accepted since creation, in scheduling order
    pub fn scheduled(&self) -> &[ScheduledTone] {
        &self.scheduled
    }

    /// Number of voices not yet finished
    pub fn pending_voices(&self) -> usize {
        self.voices.len()
    }

    /// Stop all voices; subsequent renders produce silence
    pub fn close(&mut self) {
        self.closed = true;
        self.voices.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Fill an interleaved buffer, writing the same sample to every channel
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let dt = 1.0 / self.sample_rate_hz as f64;

        for frame in data.chunks_mut(channels) {
            let time_s = self.current_time();
            let mut sample = 0.0;

            for voice in self.voices.iter_mut() {
                if !voice.tone.is_active(time_s) {
                    continue;
                }
                sample += voice.tone.gain_at(time_s) * voice.phase.sin();
                voice.phase = (voice.phase + TAU * voice.tone.frequency_at(time_s) * dt) % TAU;
            }

            // Hard limiter: two overlapping tones can exceed full scale
            let sample = sample.clamp(-1.0, 1.0) as f32;
            frame.fill(sample);

            self.frames_rendered += 1;
        }

        let now = self.current_time();
        self.voices.retain(|voice| voice.tone.end_s() > now);
    }
}
