use crate::config::{EngineConfig, TorsoTwistThresholds};
use crate::models::analysis::{ExerciseAnalysisResult, JointCorrection};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::{BodyPart, Frame};
use crate::services::analyzers::{angle_map, pair_rotation};
use crate::services::correction_calculator;
use crate::services::exercise_analyzer::{AnalyzerCore, ExerciseAnalyzer, LateralCycle};

/// Standing torso twist.
///
/// The driving metric is the shoulder line rotation minus the hip line
/// rotation, so turning the whole body does not count as a twist.
#[derive(Debug, Clone)]
pub struct TorsoTwistAnalyzer {
    core: AnalyzerCore,
    thresholds: TorsoTwistThresholds,
    cycle: LateralCycle,
}

impl TorsoTwistAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let thresholds = config.thresholds.torso_twist;
        Self {
            core: AnalyzerCore::new(ExerciseType::TorsoTwist, config),
            thresholds,
            cycle: LateralCycle::new(thresholds.band),
        }
    }
}

/// Shoulder rotation relative to the hips and the hip rotation itself
pub(crate) fn twist_angles(frame: &Frame, threshold: f32) -> Option<(f32, f32)> {
    let shoulders = pair_rotation(
        frame,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        threshold,
    )?;
    let hips = pair_rotation(frame, BodyPart::LeftHip, BodyPart::RightHip, threshold)?;
    Some((shoulders - hips, hips))
}

impl ExerciseAnalyzer for TorsoTwistAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::TorsoTwist
    }

    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult {
        let threshold = self.core.visibility_threshold();
        let measured = self
            .core
            .gate(frame)
            .then(|| twist_angles(frame, threshold));
        let Some(Some((twist, hip_rotation))) = measured else {
            return self.core.not_visible(self.cycle.stage(), self.cycle.reps());
        };

        let (smoothed, too_fast) = self.core.smooth(twist);
        let previous = self.cycle.stage();
        let step = self.cycle.update(smoothed);
        self.core.log_transition(previous, &step);

        let t = &self.thresholds;
        let penalties = self.core.penalties();
        let mut scorer = self.core.scorer();

        if hip_rotation.abs() > t.max_hip_rotation {
            scorer.penalize("hips_rotating", "keep_hips_square", penalties.posture);
        }
        if step.rep_extreme.map_or(false, |peak| peak < t.ideal_peak) {
            scorer.penalize("incomplete_range", "twist_further", penalties.range_of_motion);
        }
        if too_fast {
            scorer.penalize("moving_too_fast", "slow_down", penalties.speed);
        }

        let angles = angle_map(&[("twist", twist), ("hip_rotation", hip_rotation)]);
        self.core
            .visible(step, self.cycle.reps(), scorer.finish(), angles)
    }

    fn calculate_corrections(
        &self,
        frame: &Frame,
        target_stage: ExerciseStage,
    ) -> Vec<JointCorrection> {
        correction_calculator::calculate_corrections(
            frame,
            ExerciseType::TorsoTwist,
            target_stage,
            &self.core.config,
        )
    }

    fn target_stage(&self) -> ExerciseStage {
        self.core
            .descriptor()
            .next_target(self.cycle.stage(), self.cycle.last_side())
    }

    fn stage(&self) -> ExerciseStage {
        self.cycle.stage()
    }

    fn reps(&self) -> u32 {
        self.cycle.reps()
    }

    fn reset(&mut self) {
        self.cycle.reset();
        self.core.reset();
    }
}
