use serde::{Deserialize, Serialize};

use crate::models::exercise::ExerciseStage;

/// Half of a repetition, tagged by convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Up,
    Down,
}

impl PhaseKind {
    /// Side stages count as the working half, center and down as the return.
    /// `Idle` is not a phase.
    pub fn from_stage(stage: ExerciseStage) -> Option<Self> {
        match stage {
            ExerciseStage::Up | ExerciseStage::Left | ExerciseStage::Right => Some(Self::Up),
            ExerciseStage::Down | ExerciseStage::Center => Some(Self::Down),
            ExerciseStage::Idle => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoQuality {
    TooFast,
    Good,
    TooSlow,
}

impl std::fmt::Display for TempoQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TempoQuality::TooFast => write!(f, "too_fast"),
            TempoQuality::Good => write!(f, "good"),
            TempoQuality::TooSlow => write!(f, "too_slow"),
        }
    }
}

/// Cadence report rebuilt from the recorded phase history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoAnalysis {
    pub current_phase: Option<PhaseKind>,
    /// Seconds spent in the current phase so far
    pub phase_duration: f64,
    pub avg_rep_duration: f64,
    pub avg_up_duration: f64,
    pub avg_down_duration: f64,
    pub tempo_quality: TempoQuality,
    /// 1.0 for perfectly regular phases, lower as durations scatter
    pub consistency_score: f64,
    pub recommended_tempo: String,
    pub feedback: String,
    /// Number of completed phases since the analyzer was created or reset
    pub beat_count: u32,
}
