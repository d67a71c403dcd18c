//! Audio device output via cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use super::backend::{lock_mixer, AudioBackend, AudioOutput, SharedMixer};
use super::mixer::ToneMixer;
use super::tone::ScheduledTone;
use crate::error::{Result, RevealError};

/// Backend opening the host's default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    fn open(&self) -> Result<Box<dyn AudioOutput>> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<SharedMixer>>(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        // cpal streams are not Send: the stream lives and dies on this thread
        let worker = thread::Builder::new()
            .name("heartbeat-audio".into())
            .spawn(move || {
                let (stream, mixer) = match build_stream() {
                    Ok(opened) => opened,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if ready_tx.send(Ok(mixer)).is_err() {
                    return;
                }

                // Blocks until close() sends or the output is dropped
                let _ = stop_rx.recv();
                drop(stream);
                tracing::debug!("audio stream released");
            })
            .map_err(|e| RevealError::AudioUnavailable(format!("audio thread: {}", e)))?;

        let mixer = ready_rx.recv().map_err(|_| {
            RevealError::AudioUnavailable("audio thread exited before start".to_string())
        })??;

        Ok(Box::new(DeviceOutput {
            mixer,
            stop: Some(stop_tx),
            worker: Some(worker),
        }))
    }
}

/// Build and start an output stream rendering a fresh mixer
fn build_stream() -> Result<(cpal::Stream, SharedMixer)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| RevealError::AudioUnavailable("No audio output device found".into()))?;

    let config = device
        .default_output_config()
        .map_err(|e| RevealError::AudioUnavailable(format!("Failed to get audio config: {}", e)))?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    tracing::debug!(
        device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate,
        channels,
        "audio output acquired"
    );

    let mixer = Arc::new(Mutex::new(ToneMixer::new(sample_rate)));
    let callback_mixer = Arc::clone(&mixer);

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                lock_mixer(&callback_mixer).render(data, channels);
            },
            |err| tracing::debug!(error = %err, "audio stream error"),
            None,
        )
        .map_err(|e| {
            RevealError::AudioUnavailable(format!("Failed to build audio stream: {}", e))
        })?;

    stream
        .play()
        .map_err(|e| RevealError::AudioUnavailable(format!("Failed to start audio stream: {}", e)))?;

    Ok((stream, mixer))
}

/// Output whose stream is owned by a dedicated audio thread
struct DeviceOutput {
    mixer: SharedMixer,
    stop: Option<mpsc::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl AudioOutput for DeviceOutput {
    fn current_time(&self) -> f64 {
        lock_mixer(&self.mixer).current_time()
    }

    fn schedule(&mut self, tone: ScheduledTone) {
        lock_mixer(&self.mixer).schedule(tone);
    }

    fn close(&mut self) {
        lock_mixer(&self.mixer).close();
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn is_closed(&self) -> bool {
        self.stop.is_none()
    }
}

impl Drop for DeviceOutput {
    fn drop(&mut self) {
        self.close();
    }
}
