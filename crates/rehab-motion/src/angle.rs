//! Table-driven detectors for exercises scored on a single joint angle.
//!
//! Each exercise is one static [`AngleExercise`] row: the landmark chains to
//! measure, how the left and right readings combine, the hysteresis
//! thresholds between the rest and peak stages, the accuracy bands and the
//! feedback cues. The state machine itself is shared.

use rehab_core::{angle_at, BodyLandmark, BodyPose, Frame, Landmark};
use tracing::debug;

use crate::detector::{stage_in_graph, visible_sides, ExerciseDetector, Side};
use crate::phrase::Phrase;
use crate::registry::ExerciseKind;
use crate::state::{DetectorState, Stage, Status};

/// Accuracy while holding the peak stage
const PEAK_HOLD_ACCURACY: u8 = 75;
/// Accuracy while resting without a transition
const REST_ACCURACY: u8 = 70;

/// How the readings of the visible sides combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Min,
    Max,
}

/// Joint measured on each side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Angle at the middle landmark of a three-point chain
    Joint,
    /// Angle at the hip between straight up and the knee, for a
    /// `[hip, knee]` chain
    HipFlexion,
}

/// Threshold crossed to leave a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crossing {
    Below(f64),
    Above(f64),
}

impl Crossing {
    pub fn reached(self, angle: f64) -> bool {
        match self {
            Crossing::Below(limit) => angle < limit,
            Crossing::Above(limit) => angle > limit,
        }
    }
}

/// Inclusive angle range mapped to an accuracy score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
    pub score: u8,
}

const fn band(low: f64, high: f64, score: u8) -> Band {
    Band { low, high, score }
}

/// First matching band, else `floor`
pub fn band_score(bands: &[Band], floor: u8, angle: f64) -> u8 {
    bands
        .iter()
        .find(|b| angle >= b.low && angle <= b.high)
        .map_or(floor, |b| b.score)
}

/// Feedback shown in each situation of the rest/peak cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cues {
    pub idle: Phrase,
    pub peak: Phrase,
    pub close: Phrase,
    pub rest_hold: Phrase,
    pub peak_hold: Phrase,
}

/// One row of the angle exercise table
#[derive(Debug)]
pub struct AngleExercise {
    pub kind: ExerciseKind,
    pub sides: &'static [Side],
    pub metric: Metric,
    pub reduce: Reduce,
    pub rest: Stage,
    pub peak: Stage,
    pub enter_peak: Crossing,
    pub leave_peak: Crossing,
    pub peak_bands: &'static [Band],
    pub peak_floor: u8,
    /// Bands applied to the angle of the closing frame
    pub closing_bands: &'static [Band],
    pub closing_floor: u8,
    pub cues: Cues,
}

const KNEE_CHAINS: &[Side] = &[
    &[BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle],
    &[BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle],
];

const ELBOW_CHAINS: &[Side] = &[
    &[BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow, BodyLandmark::LeftWrist],
    &[BodyLandmark::RightShoulder, BodyLandmark::RightElbow, BodyLandmark::RightWrist],
];

const SHOULDER_CHAINS: &[Side] = &[
    &[BodyLandmark::LeftHip, BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow],
    &[BodyLandmark::RightHip, BodyLandmark::RightShoulder, BodyLandmark::RightElbow],
];

const HIP_CHAINS: &[Side] = &[
    &[BodyLandmark::LeftHip, BodyLandmark::LeftKnee],
    &[BodyLandmark::RightHip, BodyLandmark::RightKnee],
];

/// Height of the synthetic point above the hip used for hip flexion
const VERTICAL_REACH: f64 = 0.3;

pub static SQUAT: AngleExercise = AngleExercise {
    kind: ExerciseKind::Squat,
    sides: KNEE_CHAINS,
    metric: Metric::Joint,
    reduce: Reduce::Min,
    rest: Stage::Up,
    peak: Stage::Down,
    enter_peak: Crossing::Below(110.0),
    leave_peak: Crossing::Above(160.0),
    peak_bands: &[band(80.0, 100.0, 100), band(70.0, 80.0, 85), band(100.0, 110.0, 90)],
    peak_floor: 75,
    closing_bands: &[],
    closing_floor: 95,
    cues: Cues {
        idle: Phrase::StandReady,
        peak: Phrase::GoodDepth,
        close: Phrase::RepCounted,
        rest_hold: Phrase::SquatDown,
        peak_hold: Phrase::StandUpFully,
    },
};

pub static LUNGE: AngleExercise = AngleExercise {
    kind: ExerciseKind::Lunge,
    sides: KNEE_CHAINS,
    metric: Metric::Joint,
    reduce: Reduce::Min,
    rest: Stage::Up,
    peak: Stage::Down,
    enter_peak: Crossing::Below(110.0),
    leave_peak: Crossing::Above(160.0),
    peak_bands: &[band(80.0, 100.0, 100)],
    peak_floor: 85,
    closing_bands: &[],
    closing_floor: 100,
    cues: Cues {
        idle: Phrase::StandReady,
        peak: Phrase::GoodLunge,
        close: Phrase::RepCounted,
        rest_hold: Phrase::LungeDown,
        peak_hold: Phrase::StandUp,
    },
};

pub static BICEP_CURL: AngleExercise = AngleExercise {
    kind: ExerciseKind::BicepCurl,
    sides: ELBOW_CHAINS,
    metric: Metric::Joint,
    reduce: Reduce::Min,
    rest: Stage::Down,
    peak: Stage::Up,
    enter_peak: Crossing::Below(70.0),
    leave_peak: Crossing::Above(160.0),
    peak_bands: &[band(40.0, 60.0, 100), band(30.0, 40.0, 90), band(60.0, 70.0, 85)],
    peak_floor: 75,
    closing_bands: &[],
    closing_floor: 100,
    cues: Cues {
        idle: Phrase::ArmAtSide,
        peak: Phrase::GoodCurl,
        close: Phrase::RepCounted,
        rest_hold: Phrase::CurlArmUp,
        peak_hold: Phrase::ExtendArmFully,
    },
};

pub static SHOULDER_PRESS: AngleExercise = AngleExercise {
    kind: ExerciseKind::ShoulderPress,
    sides: ELBOW_CHAINS,
    metric: Metric::Joint,
    reduce: Reduce::Min,
    rest: Stage::Down,
    peak: Stage::Up,
    enter_peak: Crossing::Above(160.0),
    leave_peak: Crossing::Below(110.0),
    peak_bands: &[],
    peak_floor: 100,
    closing_bands: &[band(80.0, 100.0, 100)],
    closing_floor: 85,
    cues: Cues {
        idle: Phrase::StartPosition,
        peak: Phrase::FullExtension,
        close: Phrase::RepCounted,
        rest_hold: Phrase::PressArmsOverhead,
        peak_hold: Phrase::LowerToShoulders,
    },
};

pub static LATERAL_RAISE: AngleExercise = AngleExercise {
    kind: ExerciseKind::LateralRaise,
    sides: SHOULDER_CHAINS,
    metric: Metric::Joint,
    reduce: Reduce::Max,
    rest: Stage::Down,
    peak: Stage::Up,
    enter_peak: Crossing::Above(70.0),
    leave_peak: Crossing::Below(30.0),
    peak_bands: &[band(75.0, 105.0, 100)],
    peak_floor: 85,
    closing_bands: &[],
    closing_floor: 100,
    cues: Cues {
        idle: Phrase::ArmsAtSides,
        peak: Phrase::GoodRaiseLowerSlowly,
        close: Phrase::RepCounted,
        rest_hold: Phrase::RaiseArmsToSides,
        peak_hold: Phrase::LowerArmsDown,
    },
};

pub static KNEE_RAISE: AngleExercise = AngleExercise {
    kind: ExerciseKind::KneeRaise,
    sides: HIP_CHAINS,
    metric: Metric::HipFlexion,
    reduce: Reduce::Min,
    rest: Stage::Down,
    peak: Stage::Up,
    enter_peak: Crossing::Below(110.0),
    leave_peak: Crossing::Above(160.0),
    peak_bands: &[band(70.0, 95.0, 100)],
    peak_floor: 85,
    closing_bands: &[],
    closing_floor: 100,
    cues: Cues {
        idle: Phrase::StandStraight,
        peak: Phrase::GoodHeight,
        close: Phrase::RepCounted,
        rest_hold: Phrase::RaiseYourKnee,
        peak_hold: Phrase::LowerLegCompletely,
    },
};

impl AngleExercise {
    fn side_angle(&self, chain: &[&Landmark]) -> Option<f64> {
        match (self.metric, chain) {
            (Metric::Joint, [a, b, c]) => Some(angle_at(a, b, c)),
            (Metric::HipFlexion, [hip, knee]) => {
                let vertical = hip.offset(0.0, -VERTICAL_REACH);
                Some(angle_at(&vertical, hip, knee))
            }
            _ => None,
        }
    }

    /// Combined angle over the visible sides, `None` when no side passes the gate
    pub fn measure(&self, pose: &BodyPose) -> Option<f64> {
        let angles = visible_sides(pose, self.sides)
            .iter()
            .filter_map(|chain| self.side_angle(chain))
            .collect::<Vec<_>>();

        let fold: fn(f64, f64) -> f64 = match self.reduce {
            Reduce::Min => f64::min,
            Reduce::Max => f64::max,
        };
        angles.into_iter().reduce(fold)
    }
}

impl ExerciseDetector for AngleExercise {
    fn kind(&self) -> ExerciseKind {
        self.kind
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(self.rest, self.cues.idle)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &[self.rest, self.peak], self.rest);
        let Some(angle) = frame.body().and_then(|pose| self.measure(pose)) else {
            return DetectorState::reposition(previous, stage, Phrase::PositionInFrame);
        };

        let mut next = DetectorState {
            reps: previous.reps,
            stage,
            feedback: self.cues.idle,
            accuracy: REST_ACCURACY,
            angle: angle.round(),
            status: Status::Neutral,
            rep_accuracy: previous.rep_accuracy.clone(),
            last_position: None,
            baseline_y: None,
        };

        if stage == self.rest && self.enter_peak.reached(angle) {
            let score = band_score(self.peak_bands, self.peak_floor, angle);
            next.stage = self.peak;
            next.feedback = self.cues.peak;
            next.status = Status::Correct;
            next.accuracy = score;
            next.rep_accuracy = vec![score];
            debug!(exercise = ?self.kind, angle, score, "Peak reached");
        } else if stage == self.peak && self.leave_peak.reached(angle) {
            next.rep_accuracy
                .push(band_score(self.closing_bands, self.closing_floor, angle));
            next.stage = self.rest;
            next.reps += 1;
            next.feedback = self.cues.close;
            next.status = Status::Correct;
            next.accuracy = next.mean_rep_accuracy().unwrap_or(self.closing_floor);
            next.rep_accuracy.clear();
            debug!(exercise = ?self.kind, reps = next.reps, accuracy = next.accuracy, "Rep counted");
        } else if stage == self.rest {
            next.feedback = self.cues.rest_hold;
        } else {
            next.feedback = self.cues.peak_hold;
            next.accuracy = PEAK_HOLD_ACCURACY;
            if !next.rep_accuracy.is_empty() {
                next.rep_accuracy.push(PEAK_HOLD_ACCURACY);
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::testing::{body, place_for_angle, standing, with_joint_angle, with_visibility};
    use rehab_core::HandPose;

    const KNEES: &[(BodyLandmark, BodyLandmark, BodyLandmark)] = &[
        (BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle),
        (BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle),
    ];

    const ELBOWS: &[(BodyLandmark, BodyLandmark, BodyLandmark)] = &[
        (BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow, BodyLandmark::LeftWrist),
        (BodyLandmark::RightShoulder, BodyLandmark::RightElbow, BodyLandmark::RightWrist),
    ];

    fn knees_at(degrees: f64) -> Frame {
        body(with_joint_angle(standing(), KNEES, degrees))
    }

    fn elbows_at(degrees: f64) -> Frame {
        body(with_joint_angle(standing(), ELBOWS, degrees))
    }

    fn run(exercise: &AngleExercise, frames: &[Frame]) -> Vec<DetectorState> {
        let mut state = exercise.initial_state();
        frames
            .iter()
            .map(|frame| {
                state = exercise.detect(frame, &state);
                state.clone()
            })
            .collect()
    }

    #[test]
    fn test_squat_end_to_end() {
        let start = SQUAT.initial_state();
        assert_eq!(start.reps, 0);
        assert_eq!(start.stage, Stage::Up);

        let down = SQUAT.detect(&knees_at(95.0), &start);
        assert_eq!(down.stage, Stage::Down);
        assert_eq!(down.feedback, Phrase::GoodDepth);
        assert_eq!(down.accuracy, 100);
        assert_eq!(down.angle, 95.0);
        assert_eq!(down.status, Status::Correct);

        let up = SQUAT.detect(&knees_at(170.0), &down);
        assert_eq!(up.reps, 1);
        assert_eq!(up.stage, Stage::Up);
        assert_eq!(up.feedback, Phrase::RepCounted);
        assert_eq!(up.feedback.text(), "✓ Rep counted!");
        // mean of [100, 95]
        assert_eq!(up.accuracy, 98);
        assert!(up.rep_accuracy.is_empty());
    }

    #[test]
    fn test_squat_holds_accumulate() {
        let states = run(
            &SQUAT,
            &[knees_at(75.0), knees_at(90.0), knees_at(130.0), knees_at(165.0)],
        );
        assert_eq!(states[0].accuracy, 85);
        assert_eq!(states[1].feedback, Phrase::StandUpFully);
        assert_eq!(states[1].accuracy, 75);
        assert_eq!(states[2].rep_accuracy, vec![85, 75, 75]);
        // mean of [85, 75, 75, 95]
        assert_eq!(states[3].accuracy, 83);
        assert_eq!(states[3].reps, 1);
    }

    #[test]
    fn test_hysteresis_noise_never_counts() {
        let frames: Vec<Frame> = [108.0, 112.0, 109.0, 111.0]
            .iter()
            .map(|&a| knees_at(a))
            .collect();
        let states = run(&SQUAT, &frames);
        assert!(states.iter().all(|s| s.reps == 0));
        assert!(states.iter().all(|s| s.stage == Stage::Down));
    }

    #[test]
    fn test_rest_without_transition() {
        let state = SQUAT.detect(&knees_at(150.0), &SQUAT.initial_state());
        assert_eq!(state.stage, Stage::Up);
        assert_eq!(state.feedback, Phrase::SquatDown);
        assert_eq!(state.accuracy, 70);
        assert_eq!(state.status, Status::Neutral);
    }

    #[test]
    fn test_unknown_stage_reads_as_rest() {
        let state = SQUAT.detect(&knees_at(95.0), &DetectorState::default());
        assert_eq!(state.stage, Stage::Down);
    }

    #[test]
    fn test_low_visibility_preserves_progress() {
        let previous = DetectorState {
            reps: 3,
            stage: Stage::Down,
            rep_accuracy: vec![100, 75],
            ..SQUAT.initial_state()
        };
        let frame = body(with_visibility(with_joint_angle(standing(), KNEES, 170.0), 0.3));
        let state = SQUAT.detect(&frame, &previous);
        assert_eq!(state.reps, 3);
        assert_eq!(state.stage, Stage::Down);
        assert_eq!(state.rep_accuracy, vec![100, 75]);
        assert_eq!(state.feedback, Phrase::PositionInFrame);
        assert_eq!(state.accuracy, 0);
        assert_eq!(state.angle, 0.0);
        assert_eq!(state.status, Status::Incorrect);
    }

    #[test]
    fn test_hand_frame_is_repositioned() {
        let frame = Frame::Hands(vec![HandPose::default()]);
        let state = SQUAT.detect(&frame, &SQUAT.initial_state());
        assert_eq!(state.feedback, Phrase::PositionInFrame);
    }

    #[test]
    fn test_one_visible_side_is_enough() {
        let mut pose = with_joint_angle(standing(), KNEES, 95.0);
        pose.set(BodyLandmark::RightKnee, Landmark::new(0.44, 0.75, 0.2));
        let state = SQUAT.detect(&body(pose), &SQUAT.initial_state());
        assert_eq!(state.stage, Stage::Down);
        assert_eq!(state.angle, 95.0);
    }

    #[test]
    fn test_min_across_sides() {
        let mut pose = with_joint_angle(standing(), &KNEES[..1], 100.0);
        pose = with_joint_angle(pose, &KNEES[1..], 140.0);
        assert!((SQUAT.measure(&pose).unwrap() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_reps_monotonic_and_accuracy_bounded() {
        let angles = [
            170.0, 95.0, 40.0, 170.0, 5.0, 180.0, 109.0, 161.0, 120.0, 60.0, 175.0, 0.0,
        ];
        let frames: Vec<Frame> = angles.iter().map(|&a| knees_at(a)).collect();
        for exercise in [&SQUAT, &LUNGE] {
            let states = run(exercise, &frames);
            for pair in states.windows(2) {
                assert!(pair[1].reps >= pair[0].reps);
                assert!(pair[1].reps - pair[0].reps <= 1);
            }
            assert!(states.iter().all(|s| s.accuracy <= 100));
        }
    }

    #[test]
    fn test_bicep_curl_cycle() {
        let states = run(&BICEP_CURL, &[elbows_at(50.0), elbows_at(100.0), elbows_at(170.0)]);
        assert_eq!(states[0].stage, Stage::Up);
        assert_eq!(states[0].feedback, Phrase::GoodCurl);
        assert_eq!(states[0].accuracy, 100);
        assert_eq!(states[1].feedback, Phrase::ExtendArmFully);
        assert_eq!(states[2].reps, 1);
        assert_eq!(states[2].stage, Stage::Down);
        // mean of [100, 75, 100]
        assert_eq!(states[2].accuracy, 92);
    }

    #[test]
    fn test_shoulder_press_closing_band() {
        let states = run(&SHOULDER_PRESS, &[elbows_at(170.0), elbows_at(90.0)]);
        assert_eq!(states[0].stage, Stage::Up);
        assert_eq!(states[0].accuracy, 100);
        assert_eq!(states[1].reps, 1);
        assert_eq!(states[1].accuracy, 100);

        let states = run(&SHOULDER_PRESS, &[elbows_at(170.0), elbows_at(60.0)]);
        // mean of [100, 85]
        assert_eq!(states[1].accuracy, 93);
    }

    #[test]
    fn test_lateral_raise_uses_max() {
        let chains = &[
            (BodyLandmark::LeftHip, BodyLandmark::LeftShoulder, BodyLandmark::LeftElbow),
            (BodyLandmark::RightHip, BodyLandmark::RightShoulder, BodyLandmark::RightElbow),
        ];
        let mut pose = with_joint_angle(standing(), &chains[..1], 90.0);
        pose = with_joint_angle(pose, &chains[1..], 20.0);
        let state = LATERAL_RAISE.detect(&body(pose), &LATERAL_RAISE.initial_state());
        assert_eq!(state.stage, Stage::Up);
        assert_eq!(state.angle, 90.0);
        assert_eq!(state.accuracy, 100);

        let lowered = with_joint_angle(standing(), chains, 15.0);
        let state = LATERAL_RAISE.detect(&body(lowered), &state);
        assert_eq!(state.reps, 1);
        assert_eq!(state.feedback, Phrase::RepCounted);
    }

    #[test]
    fn test_knee_raise_hip_flexion() {
        let raised = |degrees: f64| {
            let mut pose = standing();
            for (hip, knee) in [
                (BodyLandmark::LeftHip, BodyLandmark::LeftKnee),
                (BodyLandmark::RightHip, BodyLandmark::RightKnee),
            ] {
                let h = *pose.get(hip).unwrap();
                let vertical = h.offset(0.0, -VERTICAL_REACH);
                pose.set(knee, place_for_angle(&vertical, &h, degrees, 0.15));
            }
            body(pose)
        };

        let standing_state = KNEE_RAISE.detect(&body(standing()), &KNEE_RAISE.initial_state());
        assert_eq!(standing_state.angle, 180.0);
        assert_eq!(standing_state.stage, Stage::Down);

        let up = KNEE_RAISE.detect(&raised(90.0), &standing_state);
        assert_eq!(up.stage, Stage::Up);
        assert_eq!(up.feedback, Phrase::GoodHeight);
        assert_eq!(up.accuracy, 100);

        let down = KNEE_RAISE.detect(&raised(175.0), &up);
        assert_eq!(down.reps, 1);
        assert_eq!(down.stage, Stage::Down);
    }

    #[test]
    fn test_band_score() {
        let bands = SQUAT.peak_bands;
        assert_eq!(band_score(bands, 75, 80.0), 100);
        assert_eq!(band_score(bands, 75, 79.9), 85);
        assert_eq!(band_score(bands, 75, 105.0), 90);
        assert_eq!(band_score(bands, 75, 50.0), 75);
    }
}
