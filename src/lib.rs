//! Heartbeat Reveal library - one-shot heartbeat sound with a single-fire reveal

pub mod audio;
pub mod cli;
pub mod error;
pub mod params;
pub mod render;
pub mod reveal;

pub use error::{Result, RevealError};
