//! Coach configuration.

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Complete coach configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Spoken feedback
    pub voice: VoiceConfig,

    /// Session scoring and milestones
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Speak feedback at all
    pub enabled: bool,

    /// Locale used at startup
    pub locale: Locale,

    /// Minimum gap between regular utterances (milliseconds)
    pub cooldown_ms: i64,

    /// Minimum gap between priority utterances (milliseconds)
    pub priority_cooldown_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Samples scoring below this accuracy count as bad posture
    pub bad_posture_threshold: u8,

    /// A milestone prompt is spoken every this many reps
    pub milestone_every: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: Locale::EnUs,
            cooldown_ms: 20_000,
            priority_cooldown_ms: 5_000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bad_posture_threshold: 70,
            milestone_every: 5,
        }
    }
}

impl CoachConfig {
    /// Load configuration from file, with `REHAB_` environment overrides
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("REHAB").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("REHAB").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
