use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::exercise::ExerciseStage;
use crate::models::landmark::Vector2;

/// Banded form quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormQuality {
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for FormQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormQuality::Good => write!(f, "good"),
            FormQuality::Fair => write!(f, "fair"),
            FormQuality::Poor => write!(f, "poor"),
        }
    }
}

/// Form verdict for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormFeedback {
    pub quality: FormQuality,
    /// 0-100, starts at 100 and loses a fixed penalty per issue
    pub score: u8,
    /// Short snake_case issue tags, e.g. `arms_uneven`
    pub issues: Vec<String>,
    /// Suggestion tags matching `issues`, e.g. `raise_arms_evenly`
    pub suggestions: Vec<String>,
}

impl Default for FormFeedback {
    fn default() -> Self {
        Self {
            quality: FormQuality::Good,
            score: 100,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl FormFeedback {
    pub fn has_issue(&self, issue: &str) -> bool {
        self.issues.iter().any(|i| i == issue)
    }
}

/// Per-frame output of an exercise analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAnalysisResult {
    pub stage: ExerciseStage,
    pub reps: u32,
    /// True only on the frame where `reps` incremented
    pub rep_completed: bool,
    pub form_feedback: FormFeedback,
    /// Joint angles in degrees keyed by joint name
    pub angles: BTreeMap<String, f32>,
    pub is_visible: bool,
}

/// Visual guidance for one joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointCorrection {
    pub joint_name: String,
    /// Unit vector in image space the joint should move along
    pub direction: Vector2,
    /// Distance to move in normalized image units
    pub magnitude: f32,
    /// Signed gap between target and current angle in degrees
    pub angle_error: f32,
}
