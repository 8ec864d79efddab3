use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;
use crate::models::landmark::BodyPart;

/// Exercise types supported by the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    ArmRaise,
    KneeRaise,
    TorsoTwist,
    SideBend,
    Squat,
}

impl ExerciseType {
    pub fn all() -> &'static [ExerciseType] {
        &[
            Self::ArmRaise,
            Self::KneeRaise,
            Self::TorsoTwist,
            Self::SideBend,
            Self::Squat,
        ]
    }

    pub fn key(&self) -> &'static str {
        self.descriptor().key
    }

    /// Static description of stages, joints and counting rules
    pub fn descriptor(&self) -> &'static ExerciseDescriptor {
        match self {
            Self::ArmRaise => &ARM_RAISE,
            Self::KneeRaise => &KNEE_RAISE,
            Self::TorsoTwist => &TORSO_TWIST,
            Self::SideBend => &SIDE_BEND,
            Self::Squat => &SQUAT,
        }
    }
}

impl std::fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for ExerciseType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::all()
            .iter()
            .copied()
            .find(|exercise| exercise.key() == normalized)
            .ok_or_else(|| EngineError::UnknownExercise(s.to_string()))
    }
}

/// Discrete phase of a repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStage {
    #[default]
    Idle,
    Up,
    Down,
    Center,
    Left,
    Right,
}

impl std::fmt::Display for ExerciseStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExerciseStage::Idle => "idle",
            ExerciseStage::Up => "up",
            ExerciseStage::Down => "down",
            ExerciseStage::Center => "center",
            ExerciseStage::Left => "left",
            ExerciseStage::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// How stages combine into a repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Two stages; a rep completes on the `peak_stage -> rest_stage` edge
    UpDown,
    /// Center plus two sides; a rep completes on the return to center once
    /// both sides were reached
    Lateral,
}

/// Static exercise metadata
#[derive(Debug)]
pub struct ExerciseDescriptor {
    pub key: &'static str,
    pub display_name: &'static str,
    pub stages: &'static [ExerciseStage],
    /// Stage a repetition returns to
    pub rest_stage: ExerciseStage,
    /// Stage that must be reached before a rep can complete
    pub peak_stage: ExerciseStage,
    pub cycle: CycleKind,
    /// Joints that must be visible before anything is computed
    pub required_joints: &'static [BodyPart],
    /// Joints whose midpoint feeds the motion analyzer
    pub tracked_joints: (BodyPart, BodyPart),
}

impl ExerciseDescriptor {
    pub fn has_stage(&self, stage: ExerciseStage) -> bool {
        self.stages.contains(&stage)
    }

    /// Stage the performer should move towards from `current`.
    ///
    /// Lateral exercises alternate sides, so from center the target is the
    /// side not yet visited in the current rep (`last_side`).
    pub fn next_target(
        &self,
        current: ExerciseStage,
        last_side: Option<ExerciseStage>,
    ) -> ExerciseStage {
        match self.cycle {
            CycleKind::UpDown => {
                if current == self.peak_stage {
                    self.rest_stage
                } else {
                    self.peak_stage
                }
            }
            CycleKind::Lateral => match current {
                ExerciseStage::Left | ExerciseStage::Right => ExerciseStage::Center,
                _ => match last_side {
                    Some(ExerciseStage::Left) => ExerciseStage::Right,
                    _ => ExerciseStage::Left,
                },
            },
        }
    }
}

const UP_DOWN_STAGES: &[ExerciseStage] =
    &[ExerciseStage::Idle, ExerciseStage::Up, ExerciseStage::Down];

const LATERAL_STAGES: &[ExerciseStage] = &[
    ExerciseStage::Idle,
    ExerciseStage::Center,
    ExerciseStage::Left,
    ExerciseStage::Right,
];

static ARM_RAISE: ExerciseDescriptor = ExerciseDescriptor {
    key: "arm_raise",
    display_name: "Arm Raise",
    stages: UP_DOWN_STAGES,
    rest_stage: ExerciseStage::Down,
    peak_stage: ExerciseStage::Up,
    cycle: CycleKind::UpDown,
    required_joints: &[
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
    ],
    tracked_joints: (BodyPart::LeftWrist, BodyPart::RightWrist),
};

static KNEE_RAISE: ExerciseDescriptor = ExerciseDescriptor {
    key: "knee_raise",
    display_name: "Knee Raise",
    stages: UP_DOWN_STAGES,
    rest_stage: ExerciseStage::Down,
    peak_stage: ExerciseStage::Up,
    cycle: CycleKind::UpDown,
    required_joints: &[
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
    ],
    tracked_joints: (BodyPart::LeftKnee, BodyPart::RightKnee),
};

static TORSO_TWIST: ExerciseDescriptor = ExerciseDescriptor {
    key: "torso_twist",
    display_name: "Torso Twist",
    stages: LATERAL_STAGES,
    rest_stage: ExerciseStage::Center,
    peak_stage: ExerciseStage::Left,
    cycle: CycleKind::Lateral,
    required_joints: &[
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftHip,
        BodyPart::RightHip,
    ],
    tracked_joints: (BodyPart::LeftShoulder, BodyPart::RightShoulder),
};

static SIDE_BEND: ExerciseDescriptor = ExerciseDescriptor {
    key: "side_bend",
    display_name: "Side Bend",
    stages: LATERAL_STAGES,
    rest_stage: ExerciseStage::Center,
    peak_stage: ExerciseStage::Left,
    cycle: CycleKind::Lateral,
    required_joints: &[
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftHip,
        BodyPart::RightHip,
    ],
    tracked_joints: (BodyPart::LeftShoulder, BodyPart::RightShoulder),
};

static SQUAT: ExerciseDescriptor = ExerciseDescriptor {
    key: "squat",
    display_name: "Squat",
    stages: UP_DOWN_STAGES,
    rest_stage: ExerciseStage::Up,
    peak_stage: ExerciseStage::Down,
    cycle: CycleKind::UpDown,
    required_joints: &[
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ],
    tracked_joints: (BodyPart::LeftHip, BodyPart::RightHip),
};
