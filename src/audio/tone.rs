//! Tone envelopes: exponential pitch and amplitude decay.

use crate::params::{BeatEvent, SessionConfig};

/// A beat event placed on an output's clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTone {
    /// Absolute start time on the output clock (seconds)
    pub start_s: f64,

    /// Tone length (seconds)
    pub duration_s: f64,

    /// Pitch at start (Hz)
    pub start_frequency_hz: f64,

    /// Pitch at end (Hz)
    pub end_frequency_hz: f64,

    /// Amplitude at start (linear gain)
    pub peak_gain: f64,

    /// Amplitude at end (linear gain, > 0)
    pub floor_gain: f64,
}

impl ScheduledTone {
    /// Place a beat event relative to `clock_start_s`
    pub fn from_beat(clock_start_s: f64, beat: &BeatEvent, config: &SessionConfig) -> Self {
        Self {
            start_s: clock_start_s + beat.start_offset_s,
            duration_s: beat.duration_s,
            start_frequency_hz: beat.base_frequency_hz,
            end_frequency_hz: beat.base_frequency_hz * config.end_frequency_ratio,
            peak_gain: beat.peak_gain,
            floor_gain: config.gain_floor,
        }
    }

    pub fn end_s(&self) -> f64 {
        self.start_s + self.duration_s
    }

    /// Whether the oscillator is sounding at `time_s` (stops at end)
    pub fn is_active(&self, time_s: f64) -> bool {
        time_s >= self.start_s && time_s < self.end_s()
    }

    /// Instantaneous pitch at `time_s` (Hz)
    pub fn frequency_at(&self, time_s: f64) -> f64 {
        exponential_ramp(
            self.start_frequency_hz,
            self.end_frequency_hz,
            self.progress(time_s),
        )
    }

    /// Instantaneous amplitude at `time_s` (linear gain)
    pub fn gain_at(&self, time_s: f64) -> f64 {
        exponential_ramp(self.peak_gain, self.floor_gain, self.progress(time_s))
    }

    /// Fraction of the tone elapsed, clamped to [0, 1]
    fn progress(&self, time_s: f64) -> f64 {
        ((time_s - self.start_s) / self.duration_s).clamp(0.0, 1.0)
    }
}

/// Exponential interpolation `from * (to / from)^progress`
///
/// Both endpoints must be strictly positive and share a sign.
pub fn exponential_ramp(from: f64, to: f64, progress: f64) -> f64 {
    if progress >= 1.0 {
        return to;
    }
    from * (to / from).powf(progress)
}
