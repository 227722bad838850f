//! Safety monitor: classifies a joint angle against per-exercise bands.
//!
//! The monitor is stateless. Motion direction comes from the previous frame's
//! angle, which the caller carries.

use serde::{Deserialize, Serialize};

use crate::angle::Crossing;
use crate::phrase::Phrase;
use crate::registry::ExerciseKind;

/// Angle change below which the joint is considered still
pub const DEAD_BAND: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    Risk,
    Ideal,
    Adjust,
}

/// Display color of a safety status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Red,
    Green,
    Amber,
}

impl ColorToken {
    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Red => "#ff4444",
            ColorToken::Green => "#00ff9d",
            ColorToken::Amber => "#ffaa00",
        }
    }
}

impl SafetyLevel {
    pub fn color(self) -> ColorToken {
        match self {
            SafetyLevel::Risk => ColorToken::Red,
            SafetyLevel::Ideal => ColorToken::Green,
            SafetyLevel::Adjust => ColorToken::Amber,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyStatus {
    pub status: SafetyLevel,
    pub message: Phrase,
    pub color: ColorToken,
    pub voice: Option<Phrase>,
    pub priority: bool,
}

impl SafetyStatus {
    fn new(status: SafetyLevel, message: Phrase, voice: Option<Phrase>, priority: bool) -> Self {
        Self {
            status,
            message,
            color: status.color(),
            voice,
            priority,
        }
    }
}

/// Direction the joint angle is moving in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Rising,
    Falling,
    Steady,
}

impl Motion {
    pub fn between(current: f64, previous: f64) -> Self {
        if previous <= 0.0 {
            return Motion::Steady;
        }
        let delta = current - previous;
        if delta > DEAD_BAND {
            Motion::Rising
        } else if delta < -DEAD_BAND {
            Motion::Falling
        } else {
            Motion::Steady
        }
    }
}

/// Inclusive target range in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdealBand {
    pub min: f64,
    pub max: f64,
}

impl IdealBand {
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DangerZone {
    pub limit: Crossing,
    pub message: Phrase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyRule {
    pub ideal: IdealBand,
    pub ideal_message: Phrase,
    pub danger: Option<DangerZone>,
    pub below_ideal: Phrase,
    pub above_ideal: Phrase,
    /// Shown while the user is already moving back toward the band
    pub settle: Phrase,
}

static SQUAT_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 80.0, max: 100.0 },
    ideal_message: Phrase::PerfectSquatDepth,
    danger: Some(DangerZone { limit: Crossing::Below(60.0), message: Phrase::TooDeepComeUp }),
    below_ideal: Phrase::AdjustDepth,
    above_ideal: Phrase::BendKneesMore,
    settle: Phrase::KeepBackStraight,
};

static LUNGE_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 80.0, max: 100.0 },
    ideal_message: Phrase::GreatLungeForm,
    danger: Some(DangerZone { limit: Crossing::Below(60.0), message: Phrase::NotTooDeep }),
    below_ideal: Phrase::AdjustKneeAngle,
    above_ideal: Phrase::LowerBackKnee,
    settle: Phrase::KeepTorsoUpright,
};

static BICEP_CURL_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 40.0, max: 60.0 },
    ideal_message: Phrase::PerfectCurl,
    danger: Some(DangerZone { limit: Crossing::Below(25.0), message: Phrase::KeepElbowStable }),
    below_ideal: Phrase::LowerArmExtend,
    above_ideal: Phrase::CurlUpMore,
    settle: Phrase::SlowAndControlled,
};

static SHOULDER_PRESS_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 160.0, max: 180.0 },
    ideal_message: Phrase::PerfectPress,
    danger: None,
    below_ideal: Phrase::PressHigher,
    above_ideal: Phrase::AdjustArmAngle,
    settle: Phrase::BreatheOut,
};

static LATERAL_RAISE_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 75.0, max: 105.0 },
    ideal_message: Phrase::PerfectHeight,
    danger: Some(DangerZone { limit: Crossing::Above(120.0), message: Phrase::LowerSlightly }),
    below_ideal: Phrase::RaiseArmsHigher,
    above_ideal: Phrase::AdjustArmAngle,
    settle: Phrase::SlowDown,
};

static KNEE_RAISE_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 70.0, max: 95.0 },
    ideal_message: Phrase::PerfectKneeHeight,
    danger: Some(DangerZone { limit: Crossing::Below(45.0), message: Phrase::StandTall }),
    below_ideal: Phrase::LowerKneeSlightly,
    above_ideal: Phrase::LiftKneeHigher,
    settle: Phrase::FocusOnBalance,
};

static ARM_CIRCLE_RULE: SafetyRule = SafetyRule {
    ideal: IdealBand { min: 120.0, max: 180.0 },
    ideal_message: Phrase::PerfectCircles,
    danger: None,
    below_ideal: Phrase::BiggerCircles,
    above_ideal: Phrase::AdjustArmAngle,
    settle: Phrase::GoodRangeOfMotion,
};

pub struct SafetyMonitor;

impl SafetyMonitor {
    pub fn rule(kind: ExerciseKind) -> Option<&'static SafetyRule> {
        match kind {
            ExerciseKind::Squat => Some(&SQUAT_RULE),
            ExerciseKind::Lunge => Some(&LUNGE_RULE),
            ExerciseKind::BicepCurl => Some(&BICEP_CURL_RULE),
            ExerciseKind::ShoulderPress => Some(&SHOULDER_PRESS_RULE),
            ExerciseKind::LateralRaise => Some(&LATERAL_RAISE_RULE),
            ExerciseKind::KneeRaise => Some(&KNEE_RAISE_RULE),
            ExerciseKind::ArmCircle => Some(&ARM_CIRCLE_RULE),
            ExerciseKind::WristRotation
            | ExerciseKind::NeckTilt
            | ExerciseKind::CalfRaise
            | ExerciseKind::FistClench => None,
        }
    }

    /// Ideal band shown as the on-screen target
    pub fn target(kind: ExerciseKind) -> Option<IdealBand> {
        Self::rule(kind).map(|rule| rule.ideal)
    }

    pub fn evaluate(kind: ExerciseKind, current: f64, previous: f64) -> SafetyStatus {
        let rule = match Self::rule(kind) {
            Some(rule) if current > 0.0 => rule,
            _ => return SafetyStatus::new(SafetyLevel::Adjust, Phrase::AdjustPosture, None, false),
        };
        let motion = Motion::between(current, previous);

        if let Some(danger) = rule.danger.filter(|d| d.limit.reached(current)) {
            let recovering = match danger.limit {
                Crossing::Below(_) => motion == Motion::Rising,
                Crossing::Above(_) => motion == Motion::Falling,
            };
            return if recovering {
                SafetyStatus::new(SafetyLevel::Risk, danger.message, None, false)
            } else {
                SafetyStatus::new(SafetyLevel::Risk, danger.message, Some(danger.message), true)
            };
        }

        if rule.ideal.contains(current) {
            return SafetyStatus::new(SafetyLevel::Ideal, rule.ideal_message, Some(rule.ideal_message), false);
        }

        let (correction, toward_ideal) = if current < rule.ideal.min {
            (rule.below_ideal, motion == Motion::Rising)
        } else {
            (rule.above_ideal, motion == Motion::Falling)
        };
        if toward_ideal {
            SafetyStatus::new(SafetyLevel::Adjust, rule.settle, None, false)
        } else {
            SafetyStatus::new(SafetyLevel::Adjust, correction, Some(correction), false)
        }
    }
}
