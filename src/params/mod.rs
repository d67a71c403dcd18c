//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (seconds, Hz, linear gain)
//! - Documented ranges and meanings

mod pattern;
mod session;

// Re-export all types
pub use pattern::{BeatEvent, HEARTBEAT_PATTERN};
pub use session::SessionConfig;
