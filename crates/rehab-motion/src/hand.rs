//! Hand-tracking detector for fist clenches.

use rehab_core::{distance, Frame, HandLandmark, HandPose};
use tracing::debug;

use crate::angle::{band_score, Band};
use crate::detector::{mean, stage_in_graph, ExerciseDetector};
use crate::phrase::Phrase;
use crate::registry::ExerciseKind;
use crate::state::{DetectorState, Stage, Status};

/// Openness below which the hand counts as a fist
pub const CLOSED_BELOW: f64 = 1.2;
/// Openness above which the hand counts as open again
pub const OPEN_ABOVE: f64 = 1.6;

const FIST_BANDS: &[Band] = &[
    Band { low: f64::NEG_INFINITY, high: 1.0, score: 100 },
    Band { low: f64::NEG_INFINITY, high: 1.1, score: 90 },
];
const FIST_FLOOR: u8 = 85;
const CLOSING_SAMPLE: u8 = 100;
const CLOSED_HOLD_ACCURACY: u8 = 75;
const OPEN_ACCURACY: u8 = 70;

/// Palm lengths shorter than this are treated as a degenerate detection
const MIN_PALM: f64 = 1e-6;

/// Mean fingertip-to-wrist distance in units of palm length
/// (wrist to middle-finger knuckle). `None` when a landmark is missing or
/// the palm collapses to a point.
pub fn openness(hand: &HandPose) -> Option<f64> {
    let wrist = hand.get(HandLandmark::Wrist)?;
    let palm = distance(wrist, hand.get(HandLandmark::MiddleMcp)?);
    if palm < MIN_PALM {
        return None;
    }

    let reach = HandLandmark::finger_tips()
        .iter()
        .map(|&tip| hand.get(tip).map(|lm| distance(wrist, lm)))
        .collect::<Option<Vec<_>>>()?;
    Some(mean(&reach)? / palm)
}

/// Fist clench repetitions: open, close into a fist, open again
#[derive(Debug, Default)]
pub struct FistClench;

impl FistClench {
    const GRAPH: [Stage; 2] = [Stage::Open, Stage::Closed];
}

impl ExerciseDetector for FistClench {
    fn kind(&self) -> ExerciseKind {
        ExerciseKind::FistClench
    }

    fn initial_state(&self) -> DetectorState {
        DetectorState::resting(Stage::Open, Phrase::OpenYourHand)
    }

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState {
        let stage = stage_in_graph(previous.stage, &Self::GRAPH, Stage::Open);
        let Some(ratio) = frame
            .hands()
            .and_then(|hands| hands.first())
            .and_then(openness)
        else {
            return DetectorState::reposition(previous, stage, Phrase::ShowYourHand);
        };

        let mut next = DetectorState {
            reps: previous.reps,
            stage,
            feedback: Phrase::OpenYourHand,
            accuracy: OPEN_ACCURACY,
            angle: 0.0,
            status: Status::Neutral,
            rep_accuracy: previous.rep_accuracy.clone(),
            last_position: None,
            baseline_y: None,
        };

        if stage == Stage::Open && ratio < CLOSED_BELOW {
            let score = band_score(FIST_BANDS, FIST_FLOOR, ratio);
            next.stage = Stage::Closed;
            next.feedback = Phrase::GoodFist;
            next.status = Status::Correct;
            next.accuracy = score;
            next.rep_accuracy = vec![score];
        } else if stage == Stage::Closed && ratio > OPEN_ABOVE {
            next.rep_accuracy.push(CLOSING_SAMPLE);
            next.stage = Stage::Open;
            next.reps += 1;
            next.feedback = Phrase::RepCounted;
            next.status = Status::Correct;
            next.accuracy = next.mean_rep_accuracy().unwrap_or(CLOSING_SAMPLE);
            next.rep_accuracy.clear();
            debug!(reps = next.reps, accuracy = next.accuracy, "Fist clench counted");
        } else if stage == Stage::Open {
            next.feedback = Phrase::MakeAFist;
        } else {
            next.feedback = Phrase::OpenHandFully;
            next.accuracy = CLOSED_HOLD_ACCURACY;
            if !next.rep_accuracy.is_empty() {
                next.rep_accuracy.push(CLOSED_HOLD_ACCURACY);
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehab_core::{BodyPose, Landmark};

    /// Hand with the wrist at the origin, the middle knuckle one unit up and
    /// every fingertip `reach` units from the wrist.
    fn hand(reach: f64) -> HandPose {
        let mut landmarks = vec![Landmark::point(0.0, 0.0); HandLandmark::COUNT];
        landmarks[HandLandmark::MiddleMcp.index()] = Landmark::point(0.0, -0.1);
        for (i, tip) in HandLandmark::finger_tips().iter().enumerate() {
            let theta = (-100.0 + 20.0 * i as f64).to_radians();
            landmarks[tip.index()] = Landmark::point(0.1 * reach * theta.cos(), 0.1 * reach * theta.sin());
        }
        HandPose::new(landmarks)
    }

    fn frame(reach: f64) -> Frame {
        Frame::Hands(vec![hand(reach)])
    }

    #[test]
    fn test_openness() {
        assert!((openness(&hand(1.8)).unwrap() - 1.8).abs() < 1e-9);
        assert!((openness(&hand(0.9)).unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_palm() {
        let flat = HandPose::new(vec![Landmark::point(0.3, 0.3); HandLandmark::COUNT]);
        assert_eq!(openness(&flat), None);
        assert_eq!(openness(&HandPose::new(vec![Landmark::point(0.0, 0.0); 5])), None);
    }

    #[test]
    fn test_fist_clench_cycle() {
        let detector = FistClench;
        let open = detector.detect(&frame(1.8), &detector.initial_state());
        assert_eq!(open.stage, Stage::Open);
        assert_eq!(open.feedback, Phrase::MakeAFist);

        let fist = detector.detect(&frame(0.95), &open);
        assert_eq!(fist.stage, Stage::Closed);
        assert_eq!(fist.feedback, Phrase::GoodFist);
        assert_eq!(fist.accuracy, 100);

        let held = detector.detect(&frame(1.4), &fist);
        assert_eq!(held.feedback, Phrase::OpenHandFully);
        assert_eq!(held.reps, 0);

        let reopened = detector.detect(&frame(1.8), &held);
        assert_eq!(reopened.reps, 1);
        assert_eq!(reopened.feedback, Phrase::RepCounted);
        // mean of [100, 75, 100]
        assert_eq!(reopened.accuracy, 92);
    }

    #[test]
    fn test_loose_fist_scores_lower() {
        let detector = FistClench;
        assert_eq!(detector.detect(&frame(1.05), &detector.initial_state()).accuracy, 90);
        assert_eq!(detector.detect(&frame(1.15), &detector.initial_state()).accuracy, 85);
    }

    #[test]
    fn test_missing_hand() {
        let detector = FistClench;
        let previous = DetectorState {
            reps: 2,
            ..detector.initial_state()
        };

        let empty = detector.detect(&Frame::Hands(Vec::new()), &previous);
        assert_eq!(empty.feedback, Phrase::ShowYourHand);
        assert_eq!(empty.reps, 2);

        let body = detector.detect(&Frame::Body(BodyPose::centered()), &previous);
        assert_eq!(body.feedback, Phrase::ShowYourHand);
        assert_eq!(body.status, Status::Incorrect);
    }
}
