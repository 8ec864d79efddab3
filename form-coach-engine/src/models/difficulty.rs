use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Workout difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn all() -> &'static [DifficultyLevel] {
        &[Self::Beginner, Self::Intermediate, Self::Advanced]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for DifficultyLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "easy" => Ok(Self::Beginner),
            "intermediate" | "normal" => Ok(Self::Intermediate),
            "advanced" | "hard" => Ok(Self::Advanced),
            _ => Err(EngineError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Seconds each half of a repetition should take
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetTempo {
    pub up_seconds: f64,
    pub down_seconds: f64,
}

impl TargetTempo {
    pub fn rep_seconds(&self) -> f64 {
        self.up_seconds + self.down_seconds
    }
}

/// Per-difficulty workout parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySettings {
    /// Countdown length of one exercise
    pub duration_seconds: u32,
    /// Repetitions needed to reach the goal
    pub min_reps: u32,
    pub target_tempo: TargetTempo,
}

impl DifficultySettings {
    /// Built-in table used when the configuration does not override a level
    pub fn defaults_for(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Beginner => Self {
                duration_seconds: 30,
                min_reps: 5,
                target_tempo: TargetTempo {
                    up_seconds: 2.0,
                    down_seconds: 2.0,
                },
            },
            DifficultyLevel::Intermediate => Self {
                duration_seconds: 45,
                min_reps: 10,
                target_tempo: TargetTempo {
                    up_seconds: 1.5,
                    down_seconds: 1.5,
                },
            },
            DifficultyLevel::Advanced => Self {
                duration_seconds: 60,
                min_reps: 15,
                target_tempo: TargetTempo {
                    up_seconds: 1.0,
                    down_seconds: 1.0,
                },
            },
        }
    }
}
