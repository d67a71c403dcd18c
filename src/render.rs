//! Offline rendering of one heartbeat session to samples or a WAV file.

use std::path::Path;
use std::sync::Arc;

use crate::audio::{lock_mixer, AudioSessionManager, ManualTimer, OfflineBackend};
use crate::error::{Result, RevealError};
use crate::params::{BeatEvent, SessionConfig};

/// Render exactly one teardown window of a session as mono samples
///
/// Runs the same session path as device playback, with the offline backend
/// standing in for the device and a virtual clock for the teardown timer.
pub fn render_heartbeat(pattern: &[BeatEvent], config: &SessionConfig) -> Result<Vec<f32>> {
    config.validate()?;

    let backend = Arc::new(OfflineBackend::new(config.sample_rate_hz));
    let timer = Arc::new(ManualTimer::new());
    let manager = AudioSessionManager::with_config(backend.clone(), timer.clone(), config.clone());

    manager.try_play(pattern)?;
    let mixer = backend
        .sessions()
        .into_iter()
        .next()
        .ok_or_else(|| RevealError::AudioUnavailable("offline session missing".into()))?;

    let mut guard = lock_mixer(&mixer);
    let mut samples = vec![0.0f32; config.teardown_frames(guard.sample_rate_hz())];
    guard.render(&mut samples, 1);
    drop(guard);

    // Rendered time has reached the teardown point
    timer.advance(manager.config().teardown_after);
    tracing::debug!(
        frames = samples.len(),
        released = !manager.has_live_session(),
        "offline render complete"
    );

    Ok(samples)
}

/// Write mono samples as 32-bit float WAV
pub fn write_wav(path: &Path, samples: &[f32], sample_rate_hz: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate_hz,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let wav_err = |e: hound::Error| RevealError::Wav(format!("{}: {}", path.display(), e));

    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    for sample in samples {
        writer.write_sample(*sample).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}
