use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::analysis::{ExerciseAnalysisResult, FormQuality, JointCorrection};
use crate::models::difficulty::DifficultyLevel;
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::motion::MotionQuality;
use crate::models::tempo::{TempoAnalysis, TempoQuality};

/// Discrete trigger for the coaching message selector.
///
/// Each variant fires once per qualifying transition, never every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoachingEvent {
    ExerciseStarted {
        exercise: ExerciseType,
        difficulty: DifficultyLevel,
    },
    RepCompleted {
        count: u32,
    },
    FormFeedback {
        quality: FormQuality,
        suggestions: Vec<String>,
    },
    TempoFeedback {
        quality: TempoQuality,
        text: String,
    },
    MotionFeedback {
        tag: String,
    },
    TargetReached {
        reps: u32,
    },
    TimeUp {
        reps: u32,
    },
}

impl CoachingEvent {
    /// Event name as used in logs and replay output
    pub fn kind(&self) -> &'static str {
        match self {
            CoachingEvent::ExerciseStarted { .. } => "exercise_started",
            CoachingEvent::RepCompleted { .. } => "rep_completed",
            CoachingEvent::FormFeedback { .. } => "form_feedback",
            CoachingEvent::TempoFeedback { .. } => "tempo_feedback",
            CoachingEvent::MotionFeedback { .. } => "motion_feedback",
            CoachingEvent::TargetReached { .. } => "target_reached",
            CoachingEvent::TimeUp { .. } => "time_up",
        }
    }
}

/// Everything the UI layer needs after one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp: DateTime<Utc>,
    pub analysis: ExerciseAnalysisResult,
    pub tempo: TempoAnalysis,
    pub motion: MotionQuality,
    /// Stage the corrections steer towards
    pub target_stage: ExerciseStage,
    pub corrections: Vec<JointCorrection>,
    pub events: Vec<CoachingEvent>,
    pub remaining_seconds: f64,
}

/// End-of-exercise summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub exercise: ExerciseType,
    pub difficulty: DifficultyLevel,
    pub reps: u32,
    pub min_reps: u32,
    pub target_reached: bool,
    pub elapsed_seconds: f64,
    pub remaining_seconds: f64,
    /// Mean form score over visible frames, `None` if nothing was visible
    pub average_form_score: Option<f64>,
    pub tempo: TempoAnalysis,
}
