//! Detectors driven by landmark positions rather than a joint angle.

use rehab_core::{angle_at, BodyLandmark, BodyPose, Frame};
use tracing::debug;

use crate::detector::{mean, stage_in_graph, visible_sides, ExerciseDetector, Side, MIN_VISIBILITY};
use crate::phrase::Phrase;
use crate::registry::ExerciseKind;
use crate::state::{CirclePosition, DetectorState, Stage, Status};

const TRANSITION_ACCURACY: u8 = 100;
const CORRECTION_ACCURACY: u8 = 70;
const IDLE_ACCURACY: u8 = 75;
const CIRCLE_ACCURACY: u8 = 85;

/// Wrist distance above or below the shoulder that marks a circle extreme
const CIRCLE_REACH: f64 = 0.15;
/// Length of the downward reference arm for the circle angle
const CIRCLE_REFERENCE: f64 = 0.2;

const WRIST_SIDE: f64 = 0.08;
const WRIST_CENTER: f64 = 0.03;

const NECK_UP: f64 = -0.25;
const NECK_DOWN: f64 = -0.10;
const NECK_NEUTRAL: (f64, f64) = (-0.20, -0.15);

const HEEL_RAISED: f64 = 0.04;
const HEEL_DOWN: f64 = 0.015;

const ARMS: &[Side] = &[
    &[BodyLandmark::LeftShoulder, BodyLandmark::LeftWrist],
    &[BodyLandmark::RightShoulder, BodyLandmark::RightWrist],
];

const FOREARMS: &[Side] = &[
    &[BodyLandmark::LeftElbow, BodyLandmark::LeftWrist],
    &[BodyLandmark::RightElbow, BodyLandmark::RightWrist],
];

const SHOULDERS: &[Side] = &[&[BodyLandmark::LeftShoulder], &[BodyLandmark::RightShoulder]];

const ANKLES: &[Side] = &[&[BodyLandmark::LeftAnkle], &[BodyLandmark::RightAnkle]];

/// Next state skeleton: progress and memory carried, nothing scored yet
fn carry(previous: &DetectorState, stage: Stage, feedback: Phrase) -> DetectorState {
    DetectorState {
        reps: previous.reps,
        stage,
        feedback,
        accuracy: IDLE_ACCURACY,
        angle: 0.0,
        status: Status::Neutral,
        rep_accuracy: previous.rep_accuracy.clone(),
        last_position: previous.last_position,
        baseline_y: previous.baseline_y,
    }
}

fn transition(state: &mut DetectorState, stage: Stage, feedback: Phrase) {
    state.stage = stage;
    state.feedback = feedback;
    state.status = Status::Correct;
    state.accuracy = TRANSITION_ACCURACY;
}

fn correction(state: &mut DetectorState, feedback: Phrase) {
    state.feedback = feedback;
    state.status = Status::Incorrect;
    state.accuracy = CORRECTION_ACCURACY;
}

/// Arm circles, counted on each return to the top after a bottom crossing
#[derive(Debug, Default)]
pub struct ArmCircle;

impl ArmCircle {
    const GRAPH: [Stage; 3] = [Stage::Start, Stage::Top, Stage::Bottom];
}

impl ExerciseDetector for ArmCircle {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::ArmCircle
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(Stage::Start, Phrase::MakeSlowCircles)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &Self::GRAPH, Stage::Start);
        let arms = frame
            .body()
            .map(|pose| visible_sides(pose, ARMS))
            .unwrap_or_default();
        if arms.is_empty() {
            return DetectorState::reposition(previous, stage, Phrase::PositionInFrame);
        }

        let is_top = arms
            .iter()
            .any(|arm| arm[1].y < arm[0].y - CIRCLE_REACH);
        let is_bottom = arms
            .iter()
            .any(|arm| arm[1].y > arm[0].y + CIRCLE_REACH);
        let angle = arms
            .iter()
            .map(|arm| angle_at(&arm[0].offset(0.0, CIRCLE_REFERENCE), arm[0], arm[1]))
            .fold(0.0, f64::max);

        let mut next = carry(previous, stage, Phrase::MakeSlowCircles);
        next.accuracy = CIRCLE_ACCURACY;
        next.angle = angle.round();

        if is_top && previous.last_position != Some(CirclePosition::Top) {
            next.last_position = Some(CirclePosition::Top);
            if stage == Stage::Bottom {
                next.reps += 1;
                next.status = Status::Correct;
                debug!(reps = next.reps, "Arm circle completed");
            }
            next.stage = Stage::Top;
        } else if is_bottom && previous.last_position != Some(CirclePosition::Bottom) {
            next.last_position = Some(CirclePosition::Bottom);
            next.stage = Stage::Bottom;
        }

        next
    }
}

/// Side-to-side wrist movement, counted on each left to right swing
#[derive(Debug, Default)]
pub struct WristRotation;

impl WristRotation {
    const GRAPH: [Stage; 3] = [Stage::Center, Stage::Left, Stage::Right];

    /// Horizontal wrist offset from the elbow of the first visible forearm
    fn offset(pose: &BodyPose) -> Option<f64> {
        visible_sides(pose, FOREARMS)
            .first()
            .map(|forearm| forearm[1].x - forearm[0].x)
    }
}

impl ExerciseDetector for WristRotation {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::WristRotation
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(Stage::Center, Phrase::ExtendArmForward)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &Self::GRAPH, Stage::Center);
        let Some(offset) = frame.body().and_then(Self::offset) else {
            return DetectorState::reposition(previous, stage, Phrase::PositionInFrame);
        };

        let is_left = offset < -WRIST_SIDE;
        let is_right = offset > WRIST_SIDE;
        let is_center = (-WRIST_CENTER..=WRIST_CENTER).contains(&offset);

        let mut next = carry(previous, stage, Phrase::ExtendArmForward);
        match stage {
            Stage::Center if is_left => transition(&mut next, Stage::Left, Phrase::GoodNowMoveRight),
            Stage::Center if is_right => transition(&mut next, Stage::Right, Phrase::GoodNowMoveLeft),
            Stage::Left if is_right => {
                transition(&mut next, Stage::Right, Phrase::RepCountedMoveLeft);
                next.reps += 1;
                debug!(reps = next.reps, "Wrist rotation counted");
            }
            Stage::Right if is_left => transition(&mut next, Stage::Left, Phrase::GoodMoveRight),
            Stage::Center => next.feedback = Phrase::MoveWristSideToSide,
            Stage::Left if !is_center => correction(&mut next, Phrase::MoveWristRight),
            Stage::Right if !is_center => correction(&mut next, Phrase::MoveWristLeft),
            _ => {}
        }

        next
    }
}

/// Head tilts measured from the nose height relative to the shoulders
#[derive(Debug, Default)]
pub struct NeckTilt;

impl NeckTilt {
    const GRAPH: [Stage; 3] = [Stage::Neutral, Stage::Up, Stage::Down];

    fn relative_height(pose: &BodyPose) -> Option<f64> {
        let nose = pose.visible(BodyLandmark::Nose, MIN_VISIBILITY)?;
        let shoulders: Vec<f64> = visible_sides(pose, SHOULDERS)
            .iter()
            .map(|side| side[0].y)
            .collect();
        Some(nose.y - mean(&shoulders)?)
    }
}

impl ExerciseDetector for NeckTilt {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::NeckTilt
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(Stage::Neutral, Phrase::FaceCamera)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &Self::GRAPH, Stage::Neutral);
        let Some(relative) = frame.body().and_then(Self::relative_height) else {
            return DetectorState::reposition(previous, stage, Phrase::PositionInFrame);
        };

        let is_up = relative < NECK_UP;
        let is_down = relative > NECK_DOWN;
        let is_neutral = (NECK_NEUTRAL.0..=NECK_NEUTRAL.1).contains(&relative);

        let mut next = carry(previous, stage, Phrase::FaceCamera);
        match stage {
            Stage::Neutral if is_up => transition(&mut next, Stage::Up, Phrase::GoodTiltUp),
            Stage::Up if is_down => {
                transition(&mut next, Stage::Down, Phrase::RepCountedLookUp);
                next.reps += 1;
                debug!(reps = next.reps, "Neck tilt counted");
            }
            Stage::Down if is_up => transition(&mut next, Stage::Up, Phrase::GoodNowLookDown),
            Stage::Neutral => next.feedback = Phrase::TiltHeadUpAndDown,
            Stage::Up if !is_neutral => correction(&mut next, Phrase::TiltHeadDown),
            Stage::Down if !is_neutral => correction(&mut next, Phrase::TiltHeadUp),
            _ => {}
        }

        next
    }
}

/// Heel raises tracked against the ankle height of the first gated frame
#[derive(Debug, Default)]
pub struct CalfRaise;

impl CalfRaise {
    const GRAPH: [Stage; 2] = [Stage::Down, Stage::Up];

    fn ankle_height(pose: &BodyPose) -> Option<f64> {
        let ankles: Vec<f64> = visible_sides(pose, ANKLES)
            .iter()
            .map(|side| side[0].y)
            .collect();
        mean(&ankles)
    }
}

impl ExerciseDetector for CalfRaise {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::CalfRaise
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(Stage::Down, Phrase::RiseOnToes)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &Self::GRAPH, Stage::Down);
        let Some(ankle_y) = frame.body().and_then(Self::ankle_height) else {
            return DetectorState::reposition(previous, stage, Phrase::PositionInFrame);
        };

        let baseline = previous.baseline_y.unwrap_or(ankle_y);
        let is_raised = ankle_y < baseline - HEEL_RAISED;
        let is_down = ankle_y >= baseline - HEEL_DOWN;

        let mut next = carry(previous, stage, Phrase::RiseOnToes);
        next.baseline_y = Some(baseline);
        match stage {
            Stage::Down if is_raised => transition(&mut next, Stage::Up, Phrase::GoodRaiseLowerHeels),
            Stage::Up if is_down => {
                transition(&mut next, Stage::Down, Phrase::RepCounted);
                next.reps += 1;
                debug!(reps = next.reps, "Calf raise counted");
            }
            Stage::Up => next.feedback = Phrase::LowerHeels,
            _ => {}
        }

        next
    }
}
