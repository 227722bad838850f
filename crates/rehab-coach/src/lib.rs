//! # Rehab-Coach
//!
//! Real-time coaching on top of the exercise detectors: spoken feedback with
//! throttling and translation, session aggregation with history hand-off,
//! and the per-frame loop that ties them together.

pub mod coach;
pub mod config;
pub mod locale;
pub mod session;
pub mod voice;

pub use coach::*;
pub use config::*;
pub use locale::{translate, Locale};
pub use session::*;
pub use voice::{SpeechSink, VoiceThrottle};
