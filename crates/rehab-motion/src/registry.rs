//! Exercise registry: identifiers, display metadata and detector lookup.

use std::fmt;
use std::str::FromStr;

use rehab_core::Error;
use serde::{Deserialize, Serialize};

use crate::angle::{BICEP_CURL, KNEE_RAISE, LATERAL_RAISE, LUNGE, SHOULDER_PRESS, SQUAT};
use crate::detector::ExerciseDetector;
use crate::hand::FistClench;
use crate::positional::{ArmCircle, CalfRaise, NeckTilt, WristRotation};

/// Supported exercises, serialized with their registry keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExerciseKind {
    Squat,
    Lunge,
    BicepCurl,
    ShoulderPress,
    LateralRaise,
    WristRotation,
    KneeRaise,
    NeckTilt,
    CalfRaise,
    ArmCircle,
    FistClench,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Lower Body")]
    LowerBody,
    #[serde(rename = "Upper Body")]
    UpperBody,
    #[serde(rename = "Core & Balance")]
    CoreAndBalance,
    Hand,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::LowerBody => "Lower Body",
            Category::UpperBody => "Upper Body",
            Category::CoreAndBalance => "Core & Balance",
            Category::Hand => "Hand",
        }
    }
}

/// Display metadata for one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInfo {
    pub kind: ExerciseKind,
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub category: Category,
    /// Fed with hand landmarks instead of body landmarks
    pub uses_hands: bool,
}

const fn info(
    kind: ExerciseKind,
    key: &'static str,
    display_name: &'static str,
    description: &'static str,
    category: Category,
) -> ExerciseInfo {
    ExerciseInfo {
        kind,
        key,
        display_name,
        description,
        category,
        uses_hands: matches!(category, Category::Hand),
    }
}

static EXERCISES: [ExerciseInfo; 11] = [
    info(ExerciseKind::Squat, "squat", "Squat", "Lower body strength - Full body visible", Category::LowerBody),
    info(ExerciseKind::Lunge, "lunge", "Lunge", "Leg strength & balance - Side profile", Category::LowerBody),
    info(ExerciseKind::BicepCurl, "bicepCurl", "Bicep Curl", "Arm strength - Side profile", Category::UpperBody),
    info(ExerciseKind::ShoulderPress, "shoulderPress", "Shoulder Press", "Shoulder strength - Side profile", Category::UpperBody),
    info(ExerciseKind::LateralRaise, "lateralRaise", "Lateral Raise", "Shoulder mobility - Face camera", Category::UpperBody),
    info(ExerciseKind::WristRotation, "wristRotation", "Wrist Side to Side", "Wrist mobility - Face camera", Category::UpperBody),
    info(ExerciseKind::KneeRaise, "kneeRaise", "Knee Raise", "Hip flexor strength - Face camera", Category::CoreAndBalance),
    info(ExerciseKind::NeckTilt, "neckTilt", "Neck Tilt", "Neck mobility - Face camera", Category::CoreAndBalance),
    info(ExerciseKind::CalfRaise, "calfRaise", "Calf Raise", "Ankle strength - Full body visible", Category::LowerBody),
    info(ExerciseKind::ArmCircle, "armCircle", "Arm Circle", "Shoulder mobility - Face camera", Category::UpperBody),
    info(ExerciseKind::FistClench, "fistClench", "Fist Clench", "Grip strength - Show one hand", Category::Hand),
];

impl ExerciseKind {
    pub fn all() -> impl Iterator<Item = ExerciseKind> {
        EXERCISES.iter().map(|e| e.kind)
    }

    pub fn info(self) -> &'static ExerciseInfo {
        // Table order matches declaration order
        &EXERCISES[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn uses_hands(self) -> bool {
        self.info().uses_hands
    }

    pub fn detector(self) -> &'static dyn ExerciseDetector {
        match self {
            ExerciseKind::Squat => &SQUAT,
            ExerciseKind::Lunge => &LUNGE,
            ExerciseKind::BicepCurl => &BICEP_CURL,
            ExerciseKind::ShoulderPress => &SHOULDER_PRESS,
            ExerciseKind::LateralRaise => &LATERAL_RAISE,
            ExerciseKind::KneeRaise => &KNEE_RAISE,
            ExerciseKind::WristRotation => &WristRotation,
            ExerciseKind::NeckTilt => &NeckTilt,
            ExerciseKind::CalfRaise => &CalfRaise,
            ExerciseKind::ArmCircle => &ArmCircle,
            ExerciseKind::FistClench => &FistClench,
        }
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EXERCISES
            .iter()
            .find(|e| e.key == s)
            .map(|e| e.kind)
            .ok_or_else(|| Error::UnknownExercise(s.to_string()))
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
