//! Audio session timing and envelope configuration.

use std::time::Duration;

use crate::error::{Result, RevealError};

/// Session lifetime and tone envelope parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wall-clock time from session creation to unconditional release
    /// Tones still sounding at this point are cut off
    pub teardown_after: Duration,

    /// Final pitch as a fraction of the base frequency (dimensionless)
    pub end_frequency_ratio: f64,

    /// Final amplitude of every tone (linear gain, must be > 0)
    /// Exponential ramps cannot reach zero, so tones fade to this floor
    pub gain_floor: f64,

    /// Sample rate for offline rendering (Hz)
    /// Device output uses the device's own rate
    pub sample_rate_hz: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            teardown_after: Duration::from_millis(2000),
            end_frequency_ratio: 0.5,
            gain_floor: 0.001,
            sample_rate_hz: 44100,
        }
    }
}

impl SessionConfig {
    /// Validate configuration (ramp endpoints must stay positive, etc.)
    pub fn validate(&self) -> Result<()> {
        if !(self.gain_floor > 0.0 && self.gain_floor < 1.0) {
            return Err(RevealError::InvalidConfig(format!(
                "gain floor must be in (0, 1), got {}",
                self.gain_floor
            )));
        }
        if !(self.end_frequency_ratio > 0.0 && self.end_frequency_ratio < 1.0) {
            return Err(RevealError::InvalidConfig(format!(
                "end frequency ratio must be in (0, 1), got {}",
                self.end_frequency_ratio
            )));
        }
        if self.teardown_after.is_zero() {
            return Err(RevealError::InvalidConfig(
                "teardown window must be > 0".to_string(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(RevealError::InvalidConfig(
                "sample rate must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of sample frames covered by the teardown window
    pub fn teardown_frames(&self, sample_rate_hz: u32) -> usize {
        (self.teardown_after.as_secs_f64() * sample_rate_hz as f64).round() as usize
    }
}
