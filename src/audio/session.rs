//! Heartbeat audio sessions: acquire, schedule, tear down.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::{AudioBackend, AudioOutput};
use super::timer::TeardownTimer;
use super::tone::ScheduledTone;
use crate::error::{Result, RevealError};
use crate::params::{BeatEvent, SessionConfig};

/// Anything able to play the heartbeat; never fails outward
pub trait HeartbeatPlayer: Send + Sync {
    fn play_heartbeat(&self, pattern: &[BeatEvent]);
}

impl<T: HeartbeatPlayer + ?Sized> HeartbeatPlayer for Arc<T> {
    fn play_heartbeat(&self, pattern: &[BeatEvent]) {
        (**self).play_heartbeat(pattern)
    }
}

/// Exclusive ownership of one audio output for one heartbeat
///
/// The output is released when the session is dropped.
pub struct AudioSession {
    id: u64,
    output: Box<dyn AudioOutput>,
    clock_start_s: f64,
}

impl AudioSession {
    /// Acquire an output and pin the session clock start to its current time
    pub fn open(id: u64, backend: &dyn AudioBackend) -> Result<Self> {
        let output = backend.open()?;
        let clock_start_s = output.current_time();
        Ok(Self {
            id,
            output,
            clock_start_s,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn clock_start_s(&self) -> f64 {
        self.clock_start_s
    }

    /// Schedule one tone per valid beat; returns how many were scheduled
    pub fn schedule_pattern(&mut self, pattern: &[BeatEvent], config: &SessionConfig) -> usize {
        let mut scheduled = 0;
        for beat in pattern {
            if let Err(e) = beat.validate() {
                tracing::debug!(session = self.id, error = %e, "skipping beat");
                continue;
            }
            self.output
                .schedule(ScheduledTone::from_beat(self.clock_start_s, beat, config));
            scheduled += 1;
        }
        scheduled
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.output.close();
        tracing::debug!(session = self.id, "audio session released");
    }
}

type LiveSlot = Arc<Mutex<Option<AudioSession>>>;

fn lock_slot(slot: &LiveSlot) -> MutexGuard<'_, Option<AudioSession>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates heartbeat sessions and schedules their teardown
pub struct AudioSessionManager {
    backend: Arc<dyn AudioBackend>,
    timer: Arc<dyn TeardownTimer>,
    config: SessionConfig,
    live: LiveSlot,
    sessions_started: AtomicU64,
}

impl AudioSessionManager {
    pub fn new(backend: Arc<dyn AudioBackend>, timer: Arc<dyn TeardownTimer>) -> Self {
        Self::with_config(backend, timer, SessionConfig::default())
    }

    pub fn with_config(
        backend: Arc<dyn AudioBackend>,
        timer: Arc<dyn TeardownTimer>,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            timer,
            config,
            live: Arc::new(Mutex::new(None)),
            sessions_started: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a session currently owns the audio output
    pub fn has_live_session(&self) -> bool {
        lock_slot(&self.live).is_some()
    }

    /// Number of sessions successfully opened since creation
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::SeqCst)
    }

    /// Open a session, schedule the pattern and arm the teardown timer
    ///
    /// Returns the number of tones scheduled.
    pub fn try_play(&self, pattern: &[BeatEvent]) -> Result<usize> {
        self.config.validate()?;

        let mut slot = lock_slot(&self.live);
        if slot.is_some() {
            return Err(RevealError::SessionActive);
        }

        let id = self.sessions_started.load(Ordering::SeqCst) + 1;
        let mut session = AudioSession::open(id, self.backend.as_ref())?;
        self.sessions_started.store(id, Ordering::SeqCst);

        let scheduled = session.schedule_pattern(pattern, &self.config);
        tracing::debug!(
            session = id,
            tones = scheduled,
            clock_start_s = session.clock_start_s(),
            "heartbeat scheduled"
        );
        *slot = Some(session);
        drop(slot);

        // Release is unconditional: tones still sounding are cut off
        let live = Arc::clone(&self.live);
        self.timer.schedule(
            self.config.teardown_after,
            Box::new(move || {
                let released = lock_slot(&live).take();
                drop(released);
            }),
        );

        Ok(scheduled)
    }
}

impl HeartbeatPlayer for AudioSessionManager {
    fn play_heartbeat(&self, pattern: &[BeatEvent]) {
        if let Err(e) = self.try_play(pattern) {
            tracing::debug!(error = %e, "heartbeat skipped");
        }
    }
}
