//! Heartbeat pattern: the fixed tone sequence of one heartbeat.

use crate::error::{Result, RevealError};

/// One tone placed at a fixed offset within a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatEvent {
    /// Start time relative to session clock start (seconds, >= 0)
    pub start_offset_s: f64,

    /// Starting pitch (Hz, > 0); decays to half over the duration
    pub base_frequency_hz: f64,

    /// Tone length (seconds, > 0)
    pub duration_s: f64,

    /// Initial amplitude (linear gain, 0 < gain <= 1)
    pub peak_gain: f64,
}

impl BeatEvent {
    pub const fn new(
        start_offset_s: f64,
        base_frequency_hz: f64,
        duration_s: f64,
        peak_gain: f64,
    ) -> Self {
        Self {
            start_offset_s,
            base_frequency_hz,
            duration_s,
            peak_gain,
        }
    }

    /// Validate parameter ranges (NaN fails every check)
    pub fn validate(&self) -> Result<()> {
        if !(self.start_offset_s >= 0.0 && self.start_offset_s.is_finite()) {
            return Err(RevealError::InvalidBeat(format!(
                "start offset must be >= 0, got {}",
                self.start_offset_s
            )));
        }
        if !(self.base_frequency_hz > 0.0 && self.base_frequency_hz.is_finite()) {
            return Err(RevealError::InvalidBeat(format!(
                "base frequency must be > 0, got {}",
                self.base_frequency_hz
            )));
        }
        if !(self.duration_s > 0.0 && self.duration_s.is_finite()) {
            return Err(RevealError::InvalidBeat(format!(
                "duration must be > 0, got {}",
                self.duration_s
            )));
        }
        if !(self.peak_gain > 0.0 && self.peak_gain <= 1.0) {
            return Err(RevealError::InvalidBeat(format!(
                "peak gain must be in (0, 1], got {}",
                self.peak_gain
            )));
        }
        Ok(())
    }
}

/// Three beats of two simultaneous tones each (higher + lower)
pub const HEARTBEAT_PATTERN: [BeatEvent; 6] = [
    // First beat (lub)
    BeatEvent::new(0.0, 80.0, 0.15, 0.4),
    BeatEvent::new(0.0, 40.0, 0.2, 0.3),
    // Second beat (dub), slightly delayed
    BeatEvent::new(0.22, 70.0, 0.12, 0.3),
    BeatEvent::new(0.22, 35.0, 0.18, 0.25),
    // Third, gentler beat
    BeatEvent::new(0.7, 60.0, 0.1, 0.2),
    BeatEvent::new(0.7, 30.0, 0.15, 0.15),
];
