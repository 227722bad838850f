//! Per-exercise detector state threaded from frame to frame.

use serde::{Deserialize, Serialize};

use crate::phrase::Phrase;

/// Phase of a repetition cycle.
///
/// Each detector uses its own subset: `up`/`down` for most strength
/// exercises, `start`/`top`/`bottom` for arm circles, `center`/`left`/`right`
/// for wrist rotation, `neutral`/`up`/`down` for neck tilt and
/// `open`/`closed` for the hand detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Start,
    Up,
    Down,
    Top,
    Bottom,
    Center,
    Left,
    Right,
    Neutral,
    Open,
    Closed,
}

/// Form classification of the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Neutral,
    Correct,
    Incorrect,
}

/// Last extreme crossed by the wrists during arm circles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CirclePosition {
    Top,
    Bottom,
}

/// Mutable record owned by the active exercise session.
///
/// `reps` never decreases while the same exercise stays selected; the whole
/// record is replaced by a fresh one when the exercise changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorState {
    pub reps: u32,
    pub stage: Stage,
    pub feedback: Phrase,
    /// Form accuracy of this frame, 0 to 100
    pub accuracy: u8,
    /// Primary joint angle in whole degrees, 0 for positional exercises
    pub angle: f64,
    pub status: Status,
    /// Accuracy samples of the repetition in progress
    pub rep_accuracy: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_position: Option<CirclePosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_y: Option<f64>,
}

impl DetectorState {
    /// Fresh state for an exercise resting in `stage`
    pub fn resting(stage: Stage, feedback: Phrase) -> Self {
        Self {
            stage,
            feedback,
            ..Self::default()
        }
    }

    /// Low-confidence frame: progress is kept, nothing advances
    pub fn reposition(previous: &DetectorState, stage: Stage, feedback: Phrase) -> Self {
        Self {
            reps: previous.reps,
            stage,
            feedback,
            accuracy: 0,
            angle: 0.0,
            status: Status::Incorrect,
            rep_accuracy: previous.rep_accuracy.clone(),
            last_position: previous.last_position,
            baseline_y: previous.baseline_y,
        }
    }

    /// Mean of the collected repetition samples, rounded
    pub fn mean_rep_accuracy(&self) -> Option<u8> {
        if self.rep_accuracy.is_empty() {
            return None;
        }
        let sum: u32 = self.rep_accuracy.iter().map(|&a| a as u32).sum();
        let mean = sum as f64 / self.rep_accuracy.len() as f64;
        Some(mean.round().clamp(0.0, 100.0) as u8)
    }
}

impl Default for DetectorState {
    fn default() -> Self {
        Self {
            reps: 0,
            stage: Stage::default(),
            feedback: Phrase::PositionInFrame,
            accuracy: 0,
            angle: 0.0,
            status: Status::Neutral,
            rep_accuracy: Vec::new(),
            last_position: None,
            baseline_y: None,
        }
    }
}
