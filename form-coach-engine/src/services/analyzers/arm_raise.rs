use crate::config::{ArmRaiseThresholds, EngineConfig};
use crate::models::analysis::{ExerciseAnalysisResult, JointCorrection};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::Frame;
use crate::services::analyzers::angle_map;
use crate::services::correction_calculator;
use crate::services::exercise_analyzer::{AnalyzerCore, ExerciseAnalyzer, UpDownCycle};
use crate::services::joint_geometry::{LEFT_ELBOW, LEFT_SHOULDER, RIGHT_ELBOW, RIGHT_SHOULDER};

/// Lateral arm raise driven by the mean shoulder angle
#[derive(Debug, Clone)]
pub struct ArmRaiseAnalyzer {
    core: AnalyzerCore,
    thresholds: ArmRaiseThresholds,
    cycle: UpDownCycle,
}

impl ArmRaiseAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let thresholds = config.thresholds.arm_raise;
        let core = AnalyzerCore::new(ExerciseType::ArmRaise, config);
        let cycle = UpDownCycle::new(thresholds.band, core.descriptor());
        Self {
            core,
            thresholds,
            cycle,
        }
    }
}

impl ExerciseAnalyzer for ArmRaiseAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::ArmRaise
    }

    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult {
        let threshold = self.core.visibility_threshold();
        let angles = self.core.gate(frame).then(|| {
            Some((
                LEFT_SHOULDER.angle_in(frame, threshold)?,
                RIGHT_SHOULDER.angle_in(frame, threshold)?,
                LEFT_ELBOW.angle_in(frame, threshold)?,
                RIGHT_ELBOW.angle_in(frame, threshold)?,
            ))
        });
        let Some(Some((left_shoulder, right_shoulder, left_elbow, right_elbow))) = angles else {
            return self.core.not_visible(self.cycle.stage(), self.cycle.reps());
        };

        let raw = (left_shoulder + right_shoulder) / 2.0;
        let (smoothed, too_fast) = self.core.smooth(raw);
        let previous = self.cycle.stage();
        let step = self.cycle.update(smoothed);
        self.core.log_transition(previous, &step);

        let t = &self.thresholds;
        let penalties = self.core.penalties();
        let mut scorer = self.core.scorer();

        if (left_shoulder - right_shoulder).abs() > t.max_asymmetry {
            scorer.penalize("arms_uneven", "raise_arms_evenly", penalties.asymmetry);
        }
        if step.stage == ExerciseStage::Up && left_elbow.min(right_elbow) < t.min_elbow_angle {
            scorer.penalize("bent_elbows", "straighten_elbows", penalties.posture);
        }
        if let Some(peak) = step.rep_extreme {
            if t.band.is_deeper(t.ideal_peak, peak) {
                scorer.penalize("incomplete_range", "raise_arms_higher", penalties.range_of_motion);
            }
        }
        if too_fast {
            scorer.penalize("moving_too_fast", "slow_down", penalties.speed);
        }

        let angles = angle_map(&[
            (LEFT_SHOULDER.name, left_shoulder),
            (RIGHT_SHOULDER.name, right_shoulder),
            (LEFT_ELBOW.name, left_elbow),
            (RIGHT_ELBOW.name, right_elbow),
        ]);
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
            ExerciseType::ArmRaise,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::FormQuality;
    use crate::models::landmark::BodyPart;
    use crate::synthetic::PoseBuilder;
    use pretty_assertions::assert_eq;

    fn feed(analyzer: &mut ArmRaiseAnalyzer, angles: &[f32]) -> Vec<ExerciseAnalysisResult> {
        angles
            .iter()
            .map(|a| analyzer.analyze(&PoseBuilder::standing().arms(*a, *a).build()))
            .collect()
    }

    fn one_rep() -> Vec<f32> {
        vec![
            10.0, 10.0, 10.0, 50.0, 90.0, 130.0, 165.0, 165.0, 165.0, 125.0, 85.0, 45.0, 10.0,
            10.0, 10.0,
        ]
    }

    #[test]
    fn test_counts_clean_rep() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        let results = feed(&mut analyzer, &one_rep());

        assert_eq!(analyzer.reps(), 1);
        assert_eq!(results.iter().filter(|r| r.rep_completed).count(), 1);
        let last = results.last().unwrap();
        assert_eq!(last.stage, ExerciseStage::Down);
        assert_eq!(last.form_feedback.quality, FormQuality::Good);
        assert!(last.angles.contains_key("left_shoulder"));
    }

    #[test]
    fn test_starting_with_raised_arms_needs_full_rep() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        let results = feed(
            &mut analyzer,
            &[165.0, 165.0, 165.0, 125.0, 85.0, 45.0, 10.0, 10.0, 10.0],
        );
        assert!(results[0].is_visible);
        assert_eq!(results[0].stage, ExerciseStage::Idle);
        assert!(results.iter().all(|r| !r.rep_completed));
        assert_eq!(analyzer.reps(), 0);
        assert_eq!(analyzer.stage(), ExerciseStage::Down);

        feed(&mut analyzer, &one_rep());
        assert_eq!(analyzer.reps(), 1);
    }

    #[test]
    fn test_partial_rep_flags_range() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        let results = feed(
            &mut analyzer,
            &[10.0, 10.0, 10.0, 50.0, 90.0, 130.0, 145.0, 145.0, 145.0, 105.0, 65.0, 25.0, 10.0, 10.0],
        );

        let completed = results.iter().find(|r| r.rep_completed).unwrap();
        assert!(completed.form_feedback.has_issue("incomplete_range"));
        assert_eq!(completed.form_feedback.score, 75);
    }

    #[test]
    fn test_uneven_and_bent_arms() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        for a in [10.0, 50.0, 90.0, 130.0, 160.0, 160.0, 160.0] {
            analyzer.analyze(&PoseBuilder::standing().arms(a, a).build());
        }
        let result = analyzer.analyze(
            &PoseBuilder::standing()
                .arms(165.0, 135.0)
                .elbow_bend(60.0)
                .build(),
        );
        assert_eq!(result.stage, ExerciseStage::Up);
        assert!(result.form_feedback.has_issue("arms_uneven"));
        assert!(result.form_feedback.has_issue("bent_elbows"));
        assert_eq!(result.form_feedback.quality, FormQuality::Fair);
    }

    #[test]
    fn test_fast_jump_is_flagged() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        let results = feed(&mut analyzer, &[10.0, 150.0]);
        assert!(results[1].form_feedback.has_issue("moving_too_fast"));
    }

    #[test]
    fn test_hidden_wrist_keeps_state() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        feed(&mut analyzer, &one_rep());

        let result = analyzer.analyze(&PoseBuilder::standing().hide(BodyPart::LeftWrist).build());
        assert!(!result.is_visible);
        assert_eq!(result.reps, 1);
        assert_eq!(result.stage, ExerciseStage::Down);
        assert!(result.angles.is_empty());
    }

    #[test]
    fn test_reset() {
        let mut analyzer = ArmRaiseAnalyzer::new(&EngineConfig::default());
        feed(&mut analyzer, &one_rep());
        analyzer.reset();
        assert_eq!(analyzer.reps(), 0);
        assert_eq!(analyzer.stage(), ExerciseStage::Idle);
        assert_eq!(analyzer.target_stage(), ExerciseStage::Up);
    }
}
