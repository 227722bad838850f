//! Detector interface and the visibility gate shared by every exercise.

use rehab_core::{BodyLandmark, BodyPose, Frame, Landmark};

use crate::registry::ExerciseKind;
use crate::state::{DetectorState, Stage};

/// Minimum landmark visibility for a body side to be trusted
pub const MIN_VISIBILITY: f64 = 0.6;

/// Landmarks that must all be visible for one side of the body to count
pub type Side = &'static [BodyLandmark];

/// Per-frame repetition classifier for one exercise.
///
/// `detect` is pure: the previous state is borrowed and a new state is
/// returned, so a detector holds no per-session data of its own.
pub trait ExerciseDetector: Send + Sync {
    fn kind(&self) -> ExerciseKind;

    /// State at the start of a session, resting in the exercise's first stage
    fn initial_state(&self) -> DetectorState;

    fn detect(&self, frame: &Frame, previous: &DetectorState) -> DetectorState;
}

/// Keeps `stage` when it belongs to the exercise's phase graph, otherwise
/// falls back to the resting stage.
pub(crate) fn stage_in_graph(stage: Stage, graph: &[Stage], rest: Stage) -> Stage {
    if graph.contains(&stage) {
        stage
    } else {
        rest
    }
}

/// Landmarks of every side whose points are all present and visible
pub(crate) fn visible_sides<'a>(pose: &'a BodyPose, sides: &[Side]) -> Vec<Vec<&'a Landmark>> {
    sides
        .iter()
        .filter_map(|side| {
            side.iter()
                .map(|&lm| pose.visible(lm, MIN_VISIBILITY))
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

/// Mean of a non-empty list of values
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Synthetic pose builders used across detector tests.

    use rehab_core::{BodyLandmark, BodyPose, Frame, Landmark};

    /// Standing pose facing the camera, every landmark fully visible
    pub fn standing() -> BodyPose {
        let mut pose = BodyPose::centered();
        let points = [
            (BodyLandmark::Nose, 0.50, 0.15),
            (BodyLandmark::LeftShoulder, 0.60, 0.32),
            (BodyLandmark::RightShoulder, 0.40, 0.32),
            (BodyLandmark::LeftElbow, 0.62, 0.45),
            (BodyLandmark::RightElbow, 0.38, 0.45),
            (BodyLandmark::LeftWrist, 0.63, 0.58),
            (BodyLandmark::RightWrist, 0.37, 0.58),
            (BodyLandmark::LeftHip, 0.56, 0.60),
            (BodyLandmark::RightHip, 0.44, 0.60),
            (BodyLandmark::LeftKnee, 0.56, 0.75),
            (BodyLandmark::RightKnee, 0.44, 0.75),
            (BodyLandmark::LeftAnkle, 0.56, 0.90),
            (BodyLandmark::RightAnkle, 0.44, 0.90),
        ];
        for (lm, x, y) in points {
            pose.set(lm, Landmark::new(x, y, 0.99));
        }
        pose
    }

    /// Places `c` so the angle at `b` between `b→a` and `b→c` is `degrees`,
    /// rotating counter-clockwise (in image coordinates) from `b→a`.
    pub fn place_for_angle(a: &Landmark, b: &Landmark, degrees: f64, length: f64) -> Landmark {
        let base = (a.y - b.y).atan2(a.x - b.x);
        let theta = base + degrees.to_radians();
        Landmark::new(b.x + length * theta.cos(), b.y + length * theta.sin(), 0.99)
    }

    /// Bends both joints of a three-point chain to `degrees`
    pub fn with_joint_angle(
        mut pose: BodyPose,
        chains: &[(BodyLandmark, BodyLandmark, BodyLandmark)],
        degrees: f64,
    ) -> BodyPose {
        for &(a, b, c) in chains {
            let pa = *pose.get(a).unwrap();
            let pb = *pose.get(b).unwrap();
            pose.set(c, place_for_angle(&pa, &pb, degrees, 0.15));
        }
        pose
    }

    pub fn with_visibility(mut pose: BodyPose, visibility: f64) -> BodyPose {
        for lm in pose.landmarks.iter_mut() {
            lm.visibility = Some(visibility);
        }
        pose
    }

    pub fn body(pose: BodyPose) -> Frame {
        Frame::Body(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehab_core::angle_at;

    #[test]
    fn test_stage_in_graph() {
        let graph = [Stage::Up, Stage::Down];
        assert_eq!(stage_in_graph(Stage::Down, &graph, Stage::Up), Stage::Down);
        assert_eq!(stage_in_graph(Stage::Start, &graph, Stage::Up), Stage::Up);
        assert_eq!(stage_in_graph(Stage::Left, &graph, Stage::Up), Stage::Up);
    }

    #[test]
    fn test_visible_sides_filters_low_confidence() {
        let mut pose = testing::standing();
        pose.set(BodyLandmark::LeftKnee, Landmark::new(0.56, 0.75, 0.3));

        let sides: [Side; 2] = [
            &[BodyLandmark::LeftHip, BodyLandmark::LeftKnee, BodyLandmark::LeftAnkle],
            &[BodyLandmark::RightHip, BodyLandmark::RightKnee, BodyLandmark::RightAnkle],
        ];
        let visible = visible_sides(&pose, &sides);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0][1].x, 0.44);
    }

    #[test]
    fn test_visibility_threshold_is_inclusive() {
        let pose = testing::with_visibility(testing::standing(), MIN_VISIBILITY);
        let sides: [Side; 1] = [&[BodyLandmark::Nose]];
        assert_eq!(visible_sides(&pose, &sides).len(), 1);
    }

    #[test]
    fn test_place_for_angle() {
        let a = Landmark::new(0.5, 0.3, 1.0);
        let b = Landmark::new(0.5, 0.5, 1.0);
        for degrees in [30.0, 95.0, 170.0] {
            let c = testing::place_for_angle(&a, &b, degrees, 0.2);
            assert!((angle_at(&a, &b, &c) - degrees).abs() < 1e-6);
        }
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[0.2, 0.4]), Some(0.30000000000000004));
    }
}
