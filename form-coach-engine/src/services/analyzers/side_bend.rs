use crate::config::{EngineConfig, SideBendThresholds};
use crate::models::analysis::{ExerciseAnalysisResult, JointCorrection};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::{BodyPart, Frame};
use crate::services::analyzers::{angle_map, pair_rotation, trunk_lean};
use crate::services::correction_calculator;
use crate::services::exercise_analyzer::{AnalyzerCore, ExerciseAnalyzer, LateralCycle};

/// Standing side bend driven by trunk lean from vertical
#[derive(Debug, Clone)]
pub struct SideBendAnalyzer {
    core: AnalyzerCore,
    thresholds: SideBendThresholds,
    cycle: LateralCycle,
}

impl SideBendAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let thresholds = config.thresholds.side_bend;
        Self {
            core: AnalyzerCore::new(ExerciseType::SideBend, config),
            thresholds,
            cycle: LateralCycle::new(thresholds.band),
        }
    }
}

impl ExerciseAnalyzer for SideBendAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::SideBend
    }

    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult {
        let threshold = self.core.visibility_threshold();
        let measured = self.core.gate(frame).then(|| {
            Some((
                trunk_lean(frame, threshold)?,
                pair_rotation(
                    frame,
                    BodyPart::LeftShoulder,
                    BodyPart::RightShoulder,
                    threshold,
                )?,
            ))
        });
        let Some(Some((lean, twist))) = measured else {
            return self.core.not_visible(self.cycle.stage(), self.cycle.reps());
        };

        // Leaning towards the image right is the performer's left
        let (smoothed, too_fast) = self.core.smooth(lean);
        let previous = self.cycle.stage();
        let step = self.cycle.update(smoothed);
        self.core.log_transition(previous, &step);

        let t = &self.thresholds;
        let penalties = self.core.penalties();
        let mut scorer = self.core.scorer();

        if twist.abs() > t.max_twist {
            scorer.penalize("shoulders_twisting", "keep_shoulders_square", penalties.posture);
        }
        if step.rep_extreme.map_or(false, |peak| peak < t.ideal_peak) {
            scorer.penalize("incomplete_range", "bend_further", penalties.range_of_motion);
        }
        if too_fast {
            scorer.penalize("moving_too_fast", "slow_down", penalties.speed);
        }

        let angles = angle_map(&[("trunk_lean", lean), ("shoulder_rotation", twist)]);
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
            ExerciseType::SideBend,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::FormQuality;
    use crate::synthetic::PoseBuilder;
    use pretty_assertions::assert_eq;

    fn bend_through(analyzer: &mut SideBendAnalyzer, values: &[f32]) -> Vec<ExerciseAnalysisResult> {
        values
            .iter()
            .map(|b| analyzer.analyze(&PoseBuilder::standing().side_bend(*b).build()))
            .collect()
    }

    #[test]
    fn test_counts_after_both_sides() {
        let mut analyzer = SideBendAnalyzer::new(&EngineConfig::default());
        let results = bend_through(
            &mut analyzer,
            &[
                0.0, 0.0, 0.0, -12.0, -25.0, -25.0, -25.0, -10.0, 0.0, 0.0, 0.0, 12.0, 25.0, 25.0,
                25.0, 10.0, 0.0, 0.0, 0.0,
            ],
        );
        assert_eq!(analyzer.reps(), 1);
        let completed = results.iter().find(|r| r.rep_completed).unwrap();
        assert_eq!(completed.form_feedback.quality, FormQuality::Good);
        assert_eq!(results[6].stage, ExerciseStage::Right);
    }

    #[test]
    fn test_shallow_bend_and_twist() {
        let mut analyzer = SideBendAnalyzer::new(&EngineConfig::default());
        let results = bend_through(
            &mut analyzer,
            &[0.0, 0.0, 0.0, 17.0, 17.0, 17.0, 0.0, 0.0, 0.0, -17.0, -17.0, -17.0, 0.0, 0.0, 0.0],
        );
        let completed = results.iter().find(|r| r.rep_completed).unwrap();
        assert!(completed.form_feedback.has_issue("incomplete_range"));

        let twisted = analyzer.analyze(&PoseBuilder::standing().twist(30.0).build());
        assert!(twisted.form_feedback.has_issue("shoulders_twisting"));
    }
}
