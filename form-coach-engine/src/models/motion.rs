use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionSpeed {
    Slow,
    Normal,
    Fast,
}

impl std::fmt::Display for MotionSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionSpeed::Slow => write!(f, "slow"),
            MotionSpeed::Normal => write!(f, "normal"),
            MotionSpeed::Fast => write!(f, "fast"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothness {
    Smooth,
    Jerky,
}

impl std::fmt::Display for Smoothness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Smoothness::Smooth => write!(f, "smooth"),
            Smoothness::Jerky => write!(f, "jerky"),
        }
    }
}

/// Short-term movement classification of one tracked point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionQuality {
    pub speed: MotionSpeed,
    pub smoothness: Smoothness,
    pub is_moving: bool,
    /// `too_fast` or `jerky` when the movement is outside acceptable bounds
    pub feedback: Option<String>,
}

impl Default for MotionQuality {
    fn default() -> Self {
        Self {
            speed: MotionSpeed::Slow,
            smoothness: Smoothness::Smooth,
            is_moving: false,
            feedback: None,
        }
    }
}
