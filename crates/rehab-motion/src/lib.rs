//! # Rehab-Motion
//!
//! Exercise repetition detectors, accuracy scoring and safety rules for
//! landmark-based rehabilitation coaching.
//!
//! Every detector is a pure function of the current frame and the previous
//! [`DetectorState`]; the caller owns the state and threads it through.

pub mod angle;
pub mod detector;
pub mod hand;
pub mod injury;
pub mod phrase;
pub mod positional;
pub mod registry;
pub mod safety;
pub mod state;

pub use angle::{AngleExercise, Band, Crossing};
pub use detector::{ExerciseDetector, MIN_VISIBILITY};
pub use hand::FistClench;
pub use injury::{recommended_exercises, Guidance, InjuryKind};
pub use phrase::Phrase;
pub use positional::{ArmCircle, CalfRaise, NeckTilt, WristRotation};
pub use registry::{Category, ExerciseInfo, ExerciseKind};
pub use safety::{ColorToken, IdealBand, SafetyLevel, SafetyMonitor, SafetyStatus};
pub use state::{CirclePosition, DetectorState, Stage, Status};
