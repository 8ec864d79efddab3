use crate::config::{EngineConfig, SquatThresholds};
use crate::models::analysis::{ExerciseAnalysisResult, JointCorrection};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::Frame;
use crate::services::analyzers::{angle_map, trunk_lean};
use crate::services::correction_calculator;
use crate::services::exercise_analyzer::{AnalyzerCore, ExerciseAnalyzer, UpDownCycle};
use crate::services::joint_geometry::{LEFT_KNEE, RIGHT_KNEE};

/// Bodyweight squat driven by the mean knee angle.
///
/// Standing is the rest stage (`Up`); a rep completes when the performer
/// stands back up from `Down`.
#[derive(Debug, Clone)]
pub struct SquatAnalyzer {
    core: AnalyzerCore,
    thresholds: SquatThresholds,
    cycle: UpDownCycle,
}

impl SquatAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let thresholds = config.thresholds.squat;
        let core = AnalyzerCore::new(ExerciseType::Squat, config);
        let cycle = UpDownCycle::new(thresholds.band, core.descriptor());
        Self {
            core,
            thresholds,
            cycle,
        }
    }
}

impl ExerciseAnalyzer for SquatAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::Squat
    }

    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult {
        let threshold = self.core.visibility_threshold();
        let measured = self.core.gate(frame).then(|| {
            Some((
                LEFT_KNEE.angle_in(frame, threshold)?,
                RIGHT_KNEE.angle_in(frame, threshold)?,
            ))
        });
        let Some(Some((left_knee, right_knee))) = measured else {
            return self.core.not_visible(self.cycle.stage(), self.cycle.reps());
        };
        // Shoulders are optional here; posture is only judged when they are seen
        let lean = trunk_lean(frame, threshold);

        let raw = (left_knee + right_knee) / 2.0;
        let (smoothed, too_fast) = self.core.smooth(raw);
        let previous = self.cycle.stage();
        let step = self.cycle.update(smoothed);
        self.core.log_transition(previous, &step);

        let t = &self.thresholds;
        let penalties = self.core.penalties();
        let mut scorer = self.core.scorer();

        if (left_knee - right_knee).abs() > t.max_asymmetry {
            scorer.penalize("knees_uneven", "keep_knees_even", penalties.asymmetry);
        }
        if let Some(peak) = step.rep_extreme {
            if t.band.is_deeper(t.ideal_peak, peak) {
                scorer.penalize("shallow_squat", "squat_deeper", penalties.range_of_motion);
            }
        }
        if lean.map_or(false, |l| l.abs() > t.max_trunk_lean) {
            scorer.penalize("leaning_torso", "keep_torso_upright", penalties.posture);
        }
        if too_fast {
            scorer.penalize("moving_too_fast", "slow_down", penalties.speed);
        }

        let mut angles = angle_map(&[(LEFT_KNEE.name, left_knee), (RIGHT_KNEE.name, right_knee)]);
        if let Some(lean) = lean {
            angles.insert("trunk_lean".to_string(), lean);
        }
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
            ExerciseType::Squat,
            target_stage,
            &self.core.config,
        )
    }

    fn target_stage(&self) -> ExerciseStage {
        self.core.descriptor().next_target(self.cycle.stage(), None)
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
