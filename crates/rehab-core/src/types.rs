//! Fundamental types for the rehab coach.

use std::io::BufRead;

use chrono::{DateTime, Utc};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Exercise session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock timestamp with millisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs * 1_000)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).max(0)
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }
}

/// A single tracked joint.
///
/// Coordinates are normalized to the camera frame (0.0 to 1.0, `y` grows
/// downwards). Body landmarks carry a visibility confidence; hand landmarks
/// do not, and a missing visibility is treated as fully visible.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: Some(visibility),
        }
    }

    /// Landmark without a visibility score (hand tracking output)
    pub fn point(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: None,
        }
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        match self.visibility {
            Some(v) => v >= threshold,
            None => true,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Same landmark moved by `(dx, dy)` in normalized frame units
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// MediaPipe Pose landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// MediaPipe hand landmark indices (21 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Tips of the four long fingers (thumb excluded)
    pub fn finger_tips() -> &'static [HandLandmark] {
        &[
            HandLandmark::IndexTip,
            HandLandmark::MiddleTip,
            HandLandmark::RingTip,
            HandLandmark::PinkyTip,
        ]
    }
}

/// Body landmarks detected in one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub landmarks: Vec<Landmark>,
}

impl BodyPose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Pose with every landmark at the frame center and fully visible
    pub fn centered() -> Self {
        Self::new(vec![Landmark::new(0.5, 0.5, 1.0); BodyLandmark::COUNT])
    }

    pub fn get(&self, landmark: BodyLandmark) -> Option<&Landmark> {
        self.landmarks.get(landmark.index())
    }

    /// Landmark if present, finite and visible at `threshold`
    pub fn visible(&self, landmark: BodyLandmark, threshold: f64) -> Option<&Landmark> {
        self.get(landmark)
            .filter(|lm| lm.is_finite() && lm.is_visible(threshold))
    }

    pub fn set(&mut self, landmark: BodyLandmark, value: Landmark) {
        let idx = landmark.index();
        if self.landmarks.len() <= idx {
            self.landmarks.resize(idx + 1, Landmark::default());
        }
        self.landmarks[idx] = value;
    }
}

/// Hand landmarks for one detected hand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandPose {
    pub landmarks: Vec<Landmark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
}

impl HandPose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks,
            handedness: None,
        }
    }

    pub fn get(&self, landmark: HandLandmark) -> Option<&Landmark> {
        self.landmarks
            .get(landmark.index())
            .filter(|lm| lm.is_finite())
    }
}

/// Tracker output for one video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Frame {
    Body(BodyPose),
    Hands(Vec<HandPose>),
}

impl Frame {
    pub fn body(&self) -> Option<&BodyPose> {
        match self {
            Frame::Body(pose) => Some(pose),
            Frame::Hands(_) => None,
        }
    }

    pub fn hands(&self) -> Option<&[HandPose]> {
        match self {
            Frame::Hands(hands) => Some(hands),
            Frame::Body(_) => None,
        }
    }

    pub fn is_hands(&self) -> bool {
        matches!(self, Frame::Hands(_))
    }
}

/// Reads newline-delimited JSON frames, skipping blank lines.
///
/// Read failures surface as [`Error::Io`]; a malformed line as
/// [`Error::InvalidInput`] naming its 1-based line number.
pub fn read_frames<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Frame>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Err(e) => Some(Err(Error::Io(e))),
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                serde_json::from_str(&line)
                    .map_err(|e| Error::InvalidInput(format!("line {}: {}", i + 1, e))),
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_visibility() {
        let lm = Landmark::new(0.5, 0.5, 0.7);
        assert!(lm.is_visible(0.6));
        assert!(!lm.is_visible(0.8));
        assert!(Landmark::point(0.1, 0.1).is_visible(0.99));
    }

    #[test]
    fn test_body_pose_missing_index() {
        let pose = BodyPose::new(vec![Landmark::new(0.5, 0.3, 0.9)]);
        assert!(pose.get(BodyLandmark::Nose).is_some());
        assert!(pose.get(BodyLandmark::LeftAnkle).is_none());
        assert!(pose.visible(BodyLandmark::LeftAnkle, 0.6).is_none());
    }

    #[test]
    fn test_body_pose_set_grows() {
        let mut pose = BodyPose::default();
        pose.set(BodyLandmark::RightKnee, Landmark::new(0.4, 0.7, 0.95));
        assert_eq!(pose.landmarks.len(), BodyLandmark::RightKnee.index() + 1);
        assert_eq!(pose.get(BodyLandmark::RightKnee).map(|l| l.y), Some(0.7));
    }

    #[test]
    fn test_non_finite_landmark_not_visible() {
        let mut pose = BodyPose::centered();
        pose.set(BodyLandmark::Nose, Landmark::new(f64::NAN, 0.2, 1.0));
        assert!(pose.visible(BodyLandmark::Nose, 0.6).is_none());
    }

    #[test]
    fn test_read_frames_jsonl() {
        let input = concat!(
            "{\"kind\":\"body\",\"data\":{\"landmarks\":[{\"x\":0.5,\"y\":0.2,\"visibility\":0.9}]}}\n",
            "\n",
            "{\"kind\":\"hands\",\"data\":[]}\n",
            "not json\n",
        );
        let frames: Vec<_> = read_frames(input.as_bytes()).collect();
        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[0], Ok(Frame::Body(ref pose)) if pose.landmarks.len() == 1));
        assert!(matches!(frames[1], Ok(Frame::Hands(ref hands)) if hands.is_empty()));
        assert!(matches!(frames[2], Err(Error::InvalidInput(ref msg)) if msg.starts_with("line 4")));
    }

    #[test]
    fn test_read_frames_io_error() {
        struct Broken;

        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disconnected"))
            }
        }

        let mut frames = read_frames(std::io::BufReader::new(Broken));
        assert!(matches!(frames.next(), Some(Err(Error::Io(_)))));
    }

    #[test]
    fn test_timestamp_elapsed() {
        let start = Timestamp::from_secs(10);
        let end = Timestamp::from_millis(12_500);
        assert_eq!(end.millis_since(start), 2_500);
        assert_eq!(start.millis_since(end), 0);
    }

    #[test]
    fn test_frame_json_shape() {
        let json = r#"{"kind":"hands","data":[{"landmarks":[{"x":0.1,"y":0.2}]}]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        let hands = frame.hands().unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].landmarks[0].visibility, None);
        assert!(frame.body().is_none());
    }
}
