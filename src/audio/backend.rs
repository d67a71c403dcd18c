//! Audio output seam and the device-free offline backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::mixer::ToneMixer;
use super::tone::ScheduledTone;
use crate::error::Result;

/// Source of audio outputs (one output per session)
pub trait AudioBackend: Send + Sync {
    /// Acquire an output; failure is `RevealError::AudioUnavailable`
    fn open(&self) -> Result<Box<dyn AudioOutput>>;
}

/// An acquired audio output with its own clock
pub trait AudioOutput: Send {
    /// Output clock position (seconds)
    fn current_time(&self) -> f64;

    /// Register a tone against the output clock
    fn schedule(&mut self, tone: ScheduledTone);

    /// Release the underlying resource; idempotent
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Mixer shared between an output and whoever renders it
pub type SharedMixer = Arc<Mutex<ToneMixer>>;

pub(crate) fn lock_mixer(mixer: &SharedMixer) -> MutexGuard<'_, ToneMixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Backend that renders into memory instead of a device
///
/// Every opened output is retained so its tones can be inspected or rendered
/// (e.g. to a WAV file) after the session has scheduled them.
pub struct OfflineBackend {
    sample_rate_hz: u32,
    sessions: Mutex<Vec<SharedMixer>>,
}

impl OfflineBackend {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz,
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Mixers of every output opened so far, oldest first
    pub fn sessions(&self) -> Vec<SharedMixer> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&self) -> Result<Box<dyn AudioOutput>> {
        let mixer = Arc::new(Mutex::new(ToneMixer::new(self.sample_rate_hz)));
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&mixer));
        Ok(Box::new(OfflineOutput { mixer }))
    }
}

struct OfflineOutput {
    mixer: SharedMixer,
}

impl AudioOutput for OfflineOutput {
    fn current_time(&self) -> f64 {
        lock_mixer(&self.mixer).current_time()
    }

    fn schedule(&mut self, tone: ScheduledTone) {
        lock_mixer(&self.mixer).schedule(tone);
    }

    fn close(&mut self) {
        lock_mixer(&self.mixer).close();
    }

    fn is_closed(&self) -> bool {
        lock_mixer(&self.mixer).is_closed()
    }
}
