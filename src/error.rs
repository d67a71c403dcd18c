//! Error types for the heartbeat session and reveal transition.
//!
//! None of these ever escape `trigger()` or `play_heartbeat()`: each one is
//! consumed at the boundary of the component that produces it.

/// Error type for audio session and playback operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    /// Audio output could not be acquired (no backend, device or permission)
    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    /// Companion video playback start was rejected
    #[error("Playback denied: {0}")]
    PlaybackDenied(String),

    /// A heartbeat session already owns the audio output
    #[error("A heartbeat session is already live")]
    SessionActive,

    /// Offline render could not be written
    #[error("WAV output error: {0}")]
    Wav(String),

    /// Session configuration out of range
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    /// Beat event parameters out of range
    #[error("Invalid beat event: {0}")]
    InvalidBeat(String),
}

/// Result type for session and playback operations
pub type Result<T> = std::result::Result<T, RevealError>;
