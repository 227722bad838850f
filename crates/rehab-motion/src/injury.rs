//! Injury-aware exercise recommendations.

use serde::{Deserialize, Serialize};

use crate::registry::ExerciseKind::{self, *};

/// Body region a reported injury affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InjuryKind {
    Knee,
    LowerBack,
    Shoulder,
    Hip,
    Ankle,
    Wrist,
    Elbow,
    General,
}

/// Exercises grouped by how safe they are for an injury
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub safe: &'static [ExerciseKind],
    pub caution: &'static [ExerciseKind],
    pub avoid: &'static [ExerciseKind],
}

/// Keywords checked in order; the first region with a match wins
const KEYWORDS: &[(InjuryKind, &[&str])] = &[
    (InjuryKind::Knee, &["knee"]),
    (InjuryKind::LowerBack, &["back", "spine", "lumbar"]),
    (InjuryKind::Shoulder, &["shoulder", "rotator"]),
    (InjuryKind::Hip, &["hip", "pelvis"]),
    (InjuryKind::Ankle, &["ankle", "foot", "achilles"]),
    (InjuryKind::Wrist, &["wrist", "hand"]),
    (InjuryKind::Elbow, &["elbow", "forearm"]),
];

impl InjuryKind {
    /// Classifies a free-text injury description, `General` when nothing matches
    pub fn classify(description: &str) -> Self {
        let text = description.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w)))
            .map_or(InjuryKind::General, |(kind, _)| *kind)
    }

    pub fn guidance(self) -> Guidance {
        match self {
            InjuryKind::Knee => Guidance {
                safe: &[BicepCurl, ShoulderPress, LateralRaise, ArmCircle],
                caution: &[Squat, CalfRaise],
                avoid: &[Lunge, KneeRaise],
            },
            InjuryKind::LowerBack => Guidance {
                safe: &[BicepCurl, ShoulderPress, LateralRaise, ArmCircle, CalfRaise],
                caution: &[KneeRaise],
                avoid: &[Squat, Lunge],
            },
            InjuryKind::Shoulder => Guidance {
                safe: &[Squat, Lunge, CalfRaise, KneeRaise],
                caution: &[],
                avoid: &[BicepCurl, ShoulderPress, LateralRaise, ArmCircle],
            },
            InjuryKind::Hip => Guidance {
                safe: &[BicepCurl, ShoulderPress, LateralRaise, ArmCircle, CalfRaise],
                caution: &[],
                avoid: &[Squat, Lunge, KneeRaise],
            },
            InjuryKind::Ankle => Guidance {
                safe: &[BicepCurl, ShoulderPress, LateralRaise, ArmCircle, KneeRaise],
                caution: &[Squat],
                avoid: &[Lunge, CalfRaise],
            },
            InjuryKind::Wrist => Guidance {
                safe: &[Squat, Lunge, CalfRaise, KneeRaise, LateralRaise],
                caution: &[],
                avoid: &[BicepCurl, ShoulderPress, ArmCircle],
            },
            InjuryKind::Elbow => Guidance {
                safe: &[Squat, Lunge, CalfRaise, KneeRaise, LateralRaise],
                caution: &[ShoulderPress],
                avoid: &[BicepCurl, ArmCircle],
            },
            InjuryKind::General => Guidance {
                safe: &[Squat, Lunge, CalfRaise, BicepCurl, ShoulderPress, LateralRaise, ArmCircle, KneeRaise],
                caution: &[],
                avoid: &[],
            },
        }
    }
}

/// Exercises that will not aggravate the described injury
pub fn recommended_exercises(injury: Option<&str>) -> &'static [ExerciseKind] {
    injury
        .map_or(InjuryKind::General, InjuryKind::classify)
        .guidance()
        .safe
}
