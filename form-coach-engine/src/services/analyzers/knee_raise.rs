use crate::config::{EngineConfig, KneeRaiseThresholds};
use crate::models::analysis::{ExerciseAnalysisResult, JointCorrection};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::Frame;
use crate::services::analyzers::{angle_map, trunk_lean};
use crate::services::correction_calculator;
use crate::services::exercise_analyzer::{AnalyzerCore, ExerciseAnalyzer, UpDownCycle};
use crate::services::joint_geometry::{LEFT_HIP, RIGHT_HIP};

/// Alternating knee raise driven by the hip angle of the higher knee
#[derive(Debug, Clone)]
pub struct KneeRaiseAnalyzer {
    core: AnalyzerCore,
    thresholds: KneeRaiseThresholds,
    cycle: UpDownCycle,
}

impl KneeRaiseAnalyzer {
    pub fn new(config: &EngineConfig) -> Self {
        let thresholds = config.thresholds.knee_raise;
        let core = AnalyzerCore::new(ExerciseType::KneeRaise, config);
        let cycle = UpDownCycle::new(thresholds.band, core.descriptor());
        Self {
            core,
            thresholds,
            cycle,
        }
    }
}

impl ExerciseAnalyzer for KneeRaiseAnalyzer {
    fn exercise_type(&self) -> ExerciseType {
        ExerciseType::KneeRaise
    }

    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult {
        let threshold = self.core.visibility_threshold();
        let measured = self.core.gate(frame).then(|| {
            Some((
                LEFT_HIP.angle_in(frame, threshold)?,
                RIGHT_HIP.angle_in(frame, threshold)?,
                trunk_lean(frame, threshold)?,
            ))
        });
        let Some(Some((left_hip, right_hip, lean))) = measured else {
            return self.core.not_visible(self.cycle.stage(), self.cycle.reps());
        };

        // Either knee may be the working one
        let raw = left_hip.min(right_hip);
        let (smoothed, too_fast) = self.core.smooth(raw);
        let previous = self.cycle.stage();
        let step = self.cycle.update(smoothed);
        self.core.log_transition(previous, &step);

        let t = &self.thresholds;
        let penalties = self.core.penalties();
        let mut scorer = self.core.scorer();

        if lean.abs() > t.max_trunk_lean {
            scorer.penalize("leaning_torso", "keep_torso_upright", penalties.posture);
        }
        if let Some(peak) = step.rep_extreme {
            if t.band.is_deeper(t.ideal_peak, peak) {
                scorer.penalize("knee_too_low", "lift_knee_higher", penalties.range_of_motion);
            }
        }
        if too_fast {
            scorer.penalize("moving_too_fast", "slow_down", penalties.speed);
        }

        let angles = angle_map(&[
            (LEFT_HIP.name, left_hip),
            (RIGHT_HIP.name, right_hip),
            ("trunk_lean", lean),
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
            ExerciseType::KneeRaise,
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
    use crate::synthetic::PoseBuilder;

    const LIFT: [f32; 13] = [
        178.0, 178.0, 178.0, 150.0, 120.0, 95.0, 95.0, 95.0, 125.0, 155.0, 178.0, 178.0, 178.0,
    ];

    #[test]
    fn test_alternating_knees_both_count() {
        let mut analyzer = KneeRaiseAnalyzer::new(&EngineConfig::default());
        for hip in LIFT {
            analyzer.analyze(&PoseBuilder::standing().knee_lift(hip, 178.0).build());
        }
        for hip in LIFT {
            analyzer.analyze(&PoseBuilder::standing().knee_lift(178.0, hip).build());
        }
        assert_eq!(analyzer.reps(), 2);
        assert_eq!(analyzer.stage(), ExerciseStage::Down);
    }

    #[test]
    fn test_low_knee_is_flagged_on_completion() {
        let mut analyzer = KneeRaiseAnalyzer::new(&EngineConfig::default());
        let shallow = [178.0, 178.0, 178.0, 150.0, 115.0, 115.0, 115.0, 145.0, 175.0, 178.0];
        let results: Vec<_> = shallow
            .iter()
            .map(|hip| analyzer.analyze(&PoseBuilder::standing().knee_lift(*hip, 178.0).build()))
            .collect();

        let completed = results.iter().find(|r| r.rep_completed).unwrap();
        assert!(completed.form_feedback.has_issue("knee_too_low"));
        assert!(!results[0].form_feedback.has_issue("knee_too_low"));
    }

    #[test]
    fn test_leaning_torso() {
        let mut analyzer = KneeRaiseAnalyzer::new(&EngineConfig::default());
        let result = analyzer.analyze(&PoseBuilder::standing().side_bend(25.0).build());
        assert!(result.is_visible);
        assert!(result.form_feedback.has_issue("leaning_torso"));
        assert!((result.angles["trunk_lean"] - 25.0).abs() < 0.5);
    }
}
