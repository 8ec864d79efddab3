/// Exercise analyzer capability and shared state machines
///
/// Each exercise type has one concrete analyzer implementing
/// [`ExerciseAnalyzer`]. The implementation is chosen once by
/// [`create_analyzer`] and never re-dispatched per frame.
///
/// Building blocks shared by all analyzers:
/// - [`AngleSmoother`]: trailing moving average of the driving metric
/// - [`UpDownCycle`] / [`LateralCycle`]: hysteretic stage machines with
///   edge-triggered rep counting
/// - [`FormScorer`]: fixed-penalty scoring with quality bands
/// - [`AnalyzerCore`]: visibility gate, speed guard and carried feedback

use std::collections::{BTreeMap, VecDeque};

use crate::config::{EngineConfig, FormPenalties, HysteresisBand, LateralBand, QualityBands};
use crate::error::Result;
use crate::models::analysis::{ExerciseAnalysisResult, FormFeedback, FormQuality, JointCorrection};
use crate::models::exercise::{ExerciseDescriptor, ExerciseStage, ExerciseType};
use crate::models::landmark::Frame;
use crate::services::analyzers::{
    ArmRaiseAnalyzer, KneeRaiseAnalyzer, SideBendAnalyzer, SquatAnalyzer, TorsoTwistAnalyzer,
};

/// Per-exercise frame analyzer
pub trait ExerciseAnalyzer: Send + std::fmt::Debug {
    fn exercise_type(&self) -> ExerciseType;

    /// Analyze one frame. Never fails: unusable input yields `is_visible = false`.
    fn analyze(&mut self, frame: &Frame) -> ExerciseAnalysisResult;

    /// Joint-level guidance towards `target_stage` for the given frame
    fn calculate_corrections(
        &self,
        frame: &Frame,
        target_stage: ExerciseStage,
    ) -> Vec<JointCorrection>;

    /// Stage the performer should move towards next
    fn target_stage(&self) -> ExerciseStage;

    fn stage(&self) -> ExerciseStage;

    fn reps(&self) -> u32;

    /// Clear reps, stage and smoothing buffers
    fn reset(&mut self);
}

/// Build the analyzer for an exercise after validating the configuration
pub fn create_analyzer(
    exercise: ExerciseType,
    config: &EngineConfig,
) -> Result<Box<dyn ExerciseAnalyzer>> {
    config.validate()?;

    let analyzer: Box<dyn ExerciseAnalyzer> = match exercise {
        ExerciseType::ArmRaise => Box::new(ArmRaiseAnalyzer::new(config)),
        ExerciseType::KneeRaise => Box::new(KneeRaiseAnalyzer::new(config)),
        ExerciseType::TorsoTwist => Box::new(TorsoTwistAnalyzer::new(config)),
        ExerciseType::SideBend => Box::new(SideBendAnalyzer::new(config)),
        ExerciseType::Squat => Box::new(SquatAnalyzer::new(config)),
    };

    tracing::debug!("Created {} analyzer", exercise);
    Ok(analyzer)
}

/// Trailing moving average over the last `window` samples
#[derive(Debug, Clone)]
pub struct AngleSmoother {
    window: usize,
    history: VecDeque<f32>,
}

impl AngleSmoother {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }

    pub fn push(&mut self, value: f32) -> f32 {
        self.history.push_back(value);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Outcome of feeding one metric value into a stage machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStep {
    pub stage: ExerciseStage,
    pub rep_completed: bool,
    /// Deepest metric value reached during the rep that just completed
    pub rep_extreme: Option<f32>,
}

/// Two-stage machine: `rest <-> peak`, rep counted on `peak -> rest`.
///
/// The peak stage is only reachable from rest, so a stream that starts
/// mid-movement stays `Idle` until the rest position is seen.
#[derive(Debug, Clone)]
pub struct UpDownCycle {
    band: HysteresisBand,
    rest: ExerciseStage,
    peak: ExerciseStage,
    stage: ExerciseStage,
    reps: u32,
    extreme: Option<f32>,
}

impl UpDownCycle {
    pub fn new(band: HysteresisBand, descriptor: &ExerciseDescriptor) -> Self {
        Self {
            band,
            rest: descriptor.rest_stage,
            peak: descriptor.peak_stage,
            stage: ExerciseStage::Idle,
            reps: 0,
            extreme: None,
        }
    }

    pub fn update(&mut self, value: f32) -> CycleStep {
        let mut rep_completed = false;
        let mut rep_extreme = None;

        if self.stage == self.peak {
            self.extreme = Some(match self.extreme {
                Some(current) if !self.band.is_deeper(value, current) => current,
                _ => value,
            });

            if self.band.reached_rest(value) {
                self.stage = self.rest;
                self.reps += 1;
                rep_completed = true;
                rep_extreme = self.extreme.take();
            }
        } else if self.stage == self.rest && self.band.reached_peak(value) {
            self.stage = self.peak;
            self.extreme = Some(value);
        } else if self.stage == ExerciseStage::Idle && self.band.reached_rest(value) {
            self.stage = self.rest;
        }

        CycleStep {
            stage: self.stage,
            rep_completed,
            rep_extreme,
        }
    }

    pub fn stage(&self) -> ExerciseStage {
        self.stage
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn reset(&mut self) {
        self.stage = ExerciseStage::Idle;
        self.reps = 0;
        self.extreme = None;
    }
}

/// Center/left/right machine: a rep completes on the return to center once
/// both sides were reached since the previous rep
#[derive(Debug, Clone)]
pub struct LateralCycle {
    band: LateralBand,
    stage: ExerciseStage,
    reps: u32,
    left_peak: Option<f32>,
    right_peak: Option<f32>,
}

impl LateralCycle {
    pub fn new(band: LateralBand) -> Self {
        Self {
            band,
            stage: ExerciseStage::Idle,
            reps: 0,
            left_peak: None,
            right_peak: None,
        }
    }

    /// Feed a signed metric, positive towards the performer's left
    pub fn update(&mut self, value: f32) -> CycleStep {
        let mut rep_completed = false;
        let mut rep_extreme = None;

        let next = if value > self.band.enter {
            ExerciseStage::Left
        } else if value < -self.band.enter {
            ExerciseStage::Right
        } else if value.abs() < self.band.exit {
            ExerciseStage::Center
        } else {
            self.stage
        };

        match next {
            ExerciseStage::Left => {
                self.left_peak = Some(self.left_peak.map_or(value, |p| p.max(value)));
            }
            ExerciseStage::Right => {
                self.right_peak = Some(self.right_peak.map_or(-value, |p| p.max(-value)));
            }
            _ => {}
        }

        if next == ExerciseStage::Center && next != self.stage && self.stage != ExerciseStage::Idle
        {
            if let (Some(left), Some(right)) = (self.left_peak, self.right_peak) {
                self.reps += 1;
                rep_completed = true;
                rep_extreme = Some(left.min(right));
                self.left_peak = None;
                self.right_peak = None;
            }
        }

        self.stage = next;

        CycleStep {
            stage: self.stage,
            rep_completed,
            rep_extreme,
        }
    }

    /// Side already reached in the rep in progress, if only one was
    pub fn last_side(&self) -> Option<ExerciseStage> {
        match (self.left_peak, self.right_peak) {
            (Some(_), None) => Some(ExerciseStage::Left),
            (None, Some(_)) => Some(ExerciseStage::Right),
            _ => None,
        }
    }

    pub fn stage(&self) -> ExerciseStage {
        self.stage
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn reset(&mut self) {
        self.stage = ExerciseStage::Idle;
        self.reps = 0;
        self.left_peak = None;
        self.right_peak = None;
    }
}

/// Score that starts at 100 and loses a fixed penalty per distinct issue
#[derive(Debug, Clone)]
pub struct FormScorer {
    bands: QualityBands,
    score: i32,
    issues: Vec<String>,
    suggestions: Vec<String>,
}

impl FormScorer {
    pub fn new(bands: QualityBands) -> Self {
        Self {
            bands,
            score: 100,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn penalize(&mut self, issue: &str, suggestion: &str, penalty: u8) {
        if self.issues.iter().any(|i| i == issue) {
            return;
        }
        self.score -= i32::from(penalty);
        self.issues.push(issue.to_string());
        self.suggestions.push(suggestion.to_string());
    }

    pub fn finish(self) -> FormFeedback {
        let score = self.score.clamp(0, 100) as u8;
        FormFeedback {
            quality: quality_for(score, &self.bands),
            score,
            issues: self.issues,
            suggestions: self.suggestions,
        }
    }
}

/// Map a numeric score onto the configured quality bands
pub fn quality_for(score: u8, bands: &QualityBands) -> FormQuality {
    if score >= bands.good_min {
        FormQuality::Good
    } else if score >= bands.fair_min {
        FormQuality::Fair
    } else {
        FormQuality::Poor
    }
}

/// State and settings every analyzer shares
#[derive(Debug, Clone)]
pub struct AnalyzerCore {
    pub exercise: ExerciseType,
    pub config: EngineConfig,
    smoother: AngleSmoother,
    last_raw: Option<f32>,
    last_feedback: FormFeedback,
}

impl AnalyzerCore {
    pub fn new(exercise: ExerciseType, config: &EngineConfig) -> Self {
        Self {
            exercise,
            config: config.clone(),
            smoother: AngleSmoother::new(config.smoothing_window),
            last_raw: None,
            last_feedback: FormFeedback::default(),
        }
    }

    pub fn descriptor(&self) -> &'static ExerciseDescriptor {
        self.exercise.descriptor()
    }

    pub fn visibility_threshold(&self) -> f32 {
        self.config.visibility_threshold
    }

    pub fn penalties(&self) -> FormPenalties {
        self.config.penalties
    }

    pub fn scorer(&self) -> FormScorer {
        FormScorer::new(self.config.quality_bands)
    }

    /// Whether every required joint passes the visibility threshold
    pub fn gate(&self, frame: &Frame) -> bool {
        frame.all_usable(self.descriptor().required_joints, self.visibility_threshold())
    }

    /// Smooth the driving metric and report whether the raw value jumped
    /// further than a plausible single-frame movement
    pub fn smooth(&mut self, raw: f32) -> (f32, bool) {
        let too_fast = self
            .last_raw
            .map_or(false, |last| (raw - last).abs() > self.config.max_angle_step);
        self.last_raw = Some(raw);
        (self.smoother.push(raw), too_fast)
    }

    /// Result for a frame that failed the visibility gate; stage and reps
    /// stay as they were and the last feedback is carried over
    pub fn not_visible(&mut self, stage: ExerciseStage, reps: u32) -> ExerciseAnalysisResult {
        // A gap breaks the frame-to-frame speed comparison.
        self.last_raw = None;
        ExerciseAnalysisResult {
            stage,
            reps,
            rep_completed: false,
            form_feedback: self.last_feedback.clone(),
            angles: BTreeMap::new(),
            is_visible: false,
        }
    }

    pub fn visible(
        &mut self,
        step: CycleStep,
        reps: u32,
        feedback: FormFeedback,
        angles: BTreeMap<String, f32>,
    ) -> ExerciseAnalysisResult {
        if step.rep_completed {
            tracing::info!(
                exercise = %self.exercise,
                reps,
                score = feedback.score,
                "Repetition completed"
            );
        }
        self.last_feedback = feedback.clone();
        ExerciseAnalysisResult {
            stage: step.stage,
            reps,
            rep_completed: step.rep_completed,
            form_feedback: feedback,
            angles,
            is_visible: true,
        }
    }

    pub fn log_transition(&self, previous: ExerciseStage, step: &CycleStep) {
        if previous != step.stage {
            tracing::debug!(
                exercise = %self.exercise,
                from = %previous,
                to = %step.stage,
                "Stage transition"
            );
        }
    }

    pub fn reset(&mut self) {
        self.smoother.clear();
        self.last_raw = None;
        self.last_feedback = FormFeedback::default();
    }
}
