use crate::models::analysis::{ExerciseAnalysisResult, FormQuality};
use crate::models::difficulty::DifficultyLevel;
use crate::models::exercise::ExerciseType;
use crate::models::motion::MotionQuality;
use crate::models::session::CoachingEvent;
use crate::models::tempo::TempoAnalysis;

/// Per-frame inputs the coaching triggers look at
#[derive(Debug)]
pub struct EventContext<'a> {
    pub exercise: ExerciseType,
    pub difficulty: DifficultyLevel,
    pub analysis: &'a ExerciseAnalysisResult,
    pub motion: &'a MotionQuality,
    pub tempo: &'a TempoAnalysis,
    /// Result of `TempoAnalyzer::should_give_feedback` for this frame
    pub tempo_due: bool,
    pub min_reps: u32,
    pub remaining_seconds: f64,
}

/// Edge-triggered coaching events.
///
/// Remembers what was last announced so that each event fires once per
/// transition instead of on every frame the condition holds.
#[derive(Debug, Clone, Default)]
pub struct CoachingEventTracker {
    started: bool,
    last_form: Option<(FormQuality, Vec<String>)>,
    last_motion_tag: Option<String>,
    target_reached: bool,
    time_up: bool,
}

impl CoachingEventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, ctx: &EventContext<'_>) -> Vec<CoachingEvent> {
        let mut events = Vec::new();

        if !self.started {
            self.started = true;
            events.push(CoachingEvent::ExerciseStarted {
                exercise: ctx.exercise,
                difficulty: ctx.difficulty,
            });
        }

        let analysis = ctx.analysis;
        if analysis.rep_completed {
            events.push(CoachingEvent::RepCompleted {
                count: analysis.reps,
            });
        }

        if analysis.is_visible {
            events.extend(self.form_event(analysis));
        }

        if ctx.tempo_due {
            events.push(CoachingEvent::TempoFeedback {
                quality: ctx.tempo.tempo_quality,
                text: ctx.tempo.feedback.clone(),
            });
        }

        if let Some(tag) = &ctx.motion.feedback {
            if self.last_motion_tag.as_ref() != Some(tag) {
                events.push(CoachingEvent::MotionFeedback { tag: tag.clone() });
            }
        }
        self.last_motion_tag = ctx.motion.feedback.clone();

        if !self.target_reached && analysis.reps >= ctx.min_reps {
            self.target_reached = true;
            events.push(CoachingEvent::TargetReached {
                reps: analysis.reps,
            });
        }

        if !self.time_up && ctx.remaining_seconds <= 0.0 {
            self.time_up = true;
            events.push(CoachingEvent::TimeUp {
                reps: analysis.reps,
            });
        }

        events
    }

    fn form_event(&mut self, analysis: &ExerciseAnalysisResult) -> Option<CoachingEvent> {
        let feedback = &analysis.form_feedback;
        let current = (feedback.quality, feedback.suggestions.clone());
        let previous = self.last_form.replace(current);

        if feedback.quality == FormQuality::Good {
            return None;
        }

        let fire = match previous {
            None => true,
            Some((quality, suggestions)) => {
                rank(feedback.quality) < rank(quality) || suggestions != feedback.suggestions
            }
        };

        fire.then(|| CoachingEvent::FormFeedback {
            quality: feedback.quality,
            suggestions: feedback.suggestions.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn rank(quality: FormQuality) -> u8 {
    match quality {
        FormQuality::Poor => 0,
        FormQuality::Fair => 1,
        FormQuality::Good => 2,
    }
}
