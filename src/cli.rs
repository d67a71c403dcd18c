//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

use crate::params::SessionConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "heartbeat-reveal")]
#[command(about = "Tap the heart: heartbeat sound and companion media reveal", long_about = None)]
pub struct Args {
    /// Trigger once on the default audio device without opening a window
    #[arg(long, conflicts_with = "render")]
    pub headless: bool,

    /// Render the heartbeat to a WAV file instead of playing it
    #[arg(long, value_name = "PATH")]
    pub render: Option<PathBuf>,

    /// Sample rate for offline rendering (Hz)
    #[arg(long, value_name = "HZ", default_value_t = 44100)]
    pub sample_rate: u32,
}

/// What the binary does with one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Window with a clickable heart
    Windowed,
    /// Single trigger on the audio device, no window
    Headless,
    /// Offline render to a WAV file
    Render(PathBuf),
}

impl Args {
    pub fn run_mode(&self) -> RunMode {
        match (&self.render, self.headless) {
            (Some(path), _) => RunMode::Render(path.clone()),
            (None, true) => RunMode::Headless,
            (None, false) => RunMode::Windowed,
        }
    }

    /// Session configuration with command-line overrides applied
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_rate_hz: self.sample_rate.max(1),
            ..SessionConfig::default()
        }
    }
}
