//! Feedback vocabulary shared by the detectors and the safety monitor.
//!
//! Every message the engine can show or speak has a stable identifier. The
//! English text of each variant is part of the public contract: tutorial
//! screens and older clients match on it, and the voice layer translates by
//! identifier (falling back to exact-text lookup for plain strings).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! phrases {
    ($($variant:ident => $text:expr,)+) => {
        /// Identifier of a feedback message
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum Phrase {
            $($variant,)+
        }

        impl Phrase {
            pub const ALL: &'static [Phrase] = &[$(Phrase::$variant,)+];

            /// English display text
            pub fn text(self) -> &'static str {
                match self {
                    $(Phrase::$variant => $text,)+
                }
            }
        }
    };
}

phrases! {
    // Shared
    PositionInFrame => "Position yourself in frame",
    RepCounted => "✓ Rep counted!",

    // Squat
    StandReady => "Stand ready",
    GoodDepth => "✓ Good depth! Stand up",
    SquatDown => "Squat down",
    StandUpFully => "Stand up fully",

    // Lunge
    GoodLunge => "✓ Good lunge! Return up",
    LungeDown => "Lunge down",
    StandUp => "Stand up",

    // Bicep curl
    ArmAtSide => "Arm at side",
    GoodCurl => "✓ Good curl! Lower down",
    CurlArmUp => "Curl arm up",
    ExtendArmFully => "Extend arm fully",

    // Shoulder press
    StartPosition => "Start position",
    FullExtension => "✓ Full extension! Lower down",
    PressArmsOverhead => "Press arms overhead",
    LowerToShoulders => "Lower to shoulders",

    // Lateral raise
    ArmsAtSides => "Arms at sides",
    GoodRaiseLowerSlowly => "✓ Good raise! Lower slowly",
    RaiseArmsToSides => "Raise arms to sides",
    LowerArmsDown => "Lower arms down",

    // Knee raise
    StandStraight => "Stand straight",
    GoodHeight => "✓ Good height! Lower leg",
    RaiseYourKnee => "Raise your knee",
    LowerLegCompletely => "Lower leg completely",

    // Calf raise
    RiseOnToes => "Rise on toes",
    GoodRaiseLowerHeels => "✓ Good raise! Lower heels",
    LowerHeels => "Lower heels",

    // Arm circle
    MakeSlowCircles => "Make slow circles",

    // Wrist rotation
    ExtendArmForward => "Extend arm forward",
    GoodNowMoveRight => "✓ Good! Now move right",
    GoodNowMoveLeft => "✓ Good! Now move left",
    RepCountedMoveLeft => "✓ Rep counted! Move left again",
    GoodMoveRight => "✓ Good! Move right",
    MoveWristSideToSide => "Move wrist side to side",
    MoveWristRight => "✗ Move wrist to the right",
    MoveWristLeft => "✗ Move wrist to the left",

    // Neck tilt
    FaceCamera => "Face camera",
    GoodTiltUp => "✓ Good tilt up! Now look down",
    RepCountedLookUp => "✓ Rep counted! Look up again",
    GoodNowLookDown => "✓ Good! Now look down",
    TiltHeadUpAndDown => "Tilt head up and down",
    TiltHeadDown => "✗ Tilt head down",
    TiltHeadUp => "✗ Tilt head up",

    // Fist clench
    ShowYourHand => "Show your hand to the camera",
    OpenYourHand => "Open your hand",
    GoodFist => "✓ Good fist! Open hand",
    MakeAFist => "Make a fist",
    OpenHandFully => "Open hand fully",

    // Safety: squat
    TooDeepComeUp => "Too deep. Come up slightly.",
    BendKneesMore => "Bend your knees more. Go lower.",
    PerfectSquatDepth => "Perfect squat depth. Hold it.",
    KeepBackStraight => "Keep your back straight.",

    // Safety: lunge
    NotTooDeep => "Not too deep. Come up.",
    LowerBackKnee => "Lower your back knee more.",
    GreatLungeForm => "Great lunge form. Hold steady.",
    KeepTorsoUpright => "Keep torso upright.",

    // Safety: bicep curl
    CurlUpMore => "Curl up more. Bring weight to shoulder.",
    LowerArmExtend => "Lower your arm. Extend fully.",
    PerfectCurl => "Perfect curl. Squeeze at the top.",
    KeepElbowStable => "Keep elbow stable. Don't swing.",
    SlowAndControlled => "Slow and controlled movement.",

    // Safety: shoulder press
    PressHigher => "Press arms up higher. Full extension.",
    PerfectPress => "Perfect press. Arms fully extended.",
    BreatheOut => "Breathe out as you press up.",

    // Safety: lateral raise
    RaiseArmsHigher => "Raise arms higher. To shoulder level.",
    LowerSlightly => "Lower slightly. Don't go above shoulders.",
    PerfectHeight => "Perfect height. Arms parallel to floor.",
    SlowDown => "Slow down. Control the movement.",

    // Safety: knee raise
    LiftKneeHigher => "Lift knee higher. To hip level.",
    LowerKneeSlightly => "Lower your knee slightly.",
    PerfectKneeHeight => "Perfect knee height. Hold balance.",
    FocusOnBalance => "Focus on balance. Engage core.",
    StandTall => "Stand tall. Don't lean back.",

    // Safety: arm circle
    BiggerCircles => "Make bigger circles. Full range.",
    GoodRangeOfMotion => "Good range of motion.",
    PerfectCircles => "Perfect circles. Keep arms straight.",

    // Safety: generic adjustments
    AdjustPosture => "Adjust slightly. Keep your posture aligned.",
    AdjustDepth => "Adjust your depth.",
    AdjustKneeAngle => "Adjust your knee angle.",
    AdjustArmAngle => "Adjust your arm angle.",

    // Milestones
    FirstRepComplete => "First rep complete. Keep going.",
}

impl Phrase {
    /// Exact-text lookup for callers that only hold the display string
    pub fn from_text(text: &str) -> Option<Phrase> {
        Phrase::ALL.iter().copied().find(|p| p.text() == text)
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
