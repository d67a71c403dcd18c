//! Heartbeat synthesis and audio session management.
//!
//! Sessions acquire an output on demand, schedule the heartbeat tones
//! against the output clock, and are released after a fixed wall-clock
//! window.

mod backend;
#[cfg(feature = "playback")]
mod device;
mod mixer;
mod session;
mod timer;
mod tone;

// Re-export public types
pub(crate) use backend::lock_mixer;
pub use backend::{AudioBackend, AudioOutput, OfflineBackend, SharedMixer};
#[cfg(feature = "playback")]
pub use device::CpalBackend;
pub use mixer::ToneMixer;
pub use session::{AudioSession, AudioSessionManager, HeartbeatPlayer};
pub use timer::{ManualTimer, TeardownTimer, ThreadTimer, TimerTask};
pub use tone::{exponential_ramp, ScheduledTone};
