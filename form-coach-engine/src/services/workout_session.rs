/// Workout orchestration
///
/// `WorkoutSession` owns everything that belongs to one exercise at one
/// difficulty: the analyzer, tempo and motion trackers, the coaching event
/// state and the countdown. Every frame goes through `process_frame`, which
/// returns a self-contained `FrameReport` for the UI layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::difficulty::{DifficultyLevel, DifficultySettings};
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::Frame;
use crate::models::session::{CoachingEvent, FrameReport, SessionSummary};
use crate::services::coaching_events::{CoachingEventTracker, EventContext};
use crate::services::exercise_analyzer::{create_analyzer, ExerciseAnalyzer};
use crate::services::motion_analyzer::MotionAnalyzer;
use crate::services::seconds_between;
use crate::services::tempo_analyzer::TempoAnalyzer;

#[derive(Debug)]
pub struct WorkoutSession {
    id: Uuid,
    config: EngineConfig,
    exercise: ExerciseType,
    difficulty: DifficultyLevel,
    settings: DifficultySettings,
    analyzer: Box<dyn ExerciseAnalyzer>,
    tempo: TempoAnalyzer,
    motion: MotionAnalyzer,
    events: CoachingEventTracker,
    started_at: Option<DateTime<Utc>>,
    score_total: f64,
    scored_frames: u32,
}

impl WorkoutSession {
    /// Validate the configuration and build the analyzers
    pub fn new(
        config: EngineConfig,
        exercise: ExerciseType,
        difficulty: DifficultyLevel,
    ) -> Result<Self> {
        let analyzer = create_analyzer(exercise, &config)?;
        let settings = config.difficulty(difficulty);
        let session = Self {
            id: Uuid::new_v4(),
            tempo: TempoAnalyzer::new(config.tempo, settings.target_tempo),
            motion: MotionAnalyzer::new(config.motion),
            config,
            exercise,
            difficulty,
            settings,
            analyzer,
            events: CoachingEventTracker::new(),
            started_at: None,
            score_total: 0.0,
            scored_frames: 0,
        };

        tracing::info!(
            session_id = %session.id,
            exercise = %exercise,
            difficulty = %difficulty,
            "Workout session created"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn settings(&self) -> DifficultySettings {
        self.settings
    }

    pub fn reps(&self) -> u32 {
        self.analyzer.reps()
    }

    pub fn stage(&self) -> ExerciseStage {
        self.analyzer.stage()
    }

    /// Run one frame through every analyzer.
    ///
    /// The countdown starts at the first processed frame.
    pub fn process_frame(&mut self, frame: &Frame, now: DateTime<Utc>) -> FrameReport {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            tracing::info!(
                exercise = %self.exercise,
                duration_seconds = self.settings.duration_seconds,
                "Exercise countdown started"
            );
        }

        let analysis = self.analyzer.analyze(frame);

        if analysis.is_visible {
            self.tempo.update_phase(analysis.stage, now);
            self.score_total += f64::from(analysis.form_feedback.score);
            self.scored_frames += 1;

            let (a, b) = self.exercise.descriptor().tracked_joints;
            if let Some(point) = frame.usable_midpoint(a, b, self.config.visibility_threshold) {
                self.motion.update(point, now);
            }
        }

        let tempo = self.tempo.analyze(now);
        let tempo_due = self.tempo.should_give_feedback(now);
        let motion = self.motion.analyze();

        let target_stage = self.analyzer.target_stage();
        let corrections = if analysis.is_visible {
            self.analyzer.calculate_corrections(frame, target_stage)
        } else {
            Vec::new()
        };

        let remaining_seconds = self.remaining(now);
        let events = self.events.collect(&EventContext {
            exercise: self.exercise,
            difficulty: self.difficulty,
            analysis: &analysis,
            motion: &motion,
            tempo: &tempo,
            tempo_due,
            min_reps: self.settings.min_reps,
            remaining_seconds,
        });
        for event in &events {
            log_event(event);
        }

        FrameReport {
            timestamp: now,
            analysis,
            tempo,
            motion,
            target_stage,
            corrections,
            events,
            remaining_seconds,
        }
    }

    /// Seconds left on the countdown; the full duration before the first frame
    pub fn remaining(&self, now: DateTime<Utc>) -> f64 {
        let duration = f64::from(self.settings.duration_seconds);
        match self.started_at {
            Some(started) => (duration - seconds_between(started, now)).max(0.0),
            None => duration,
        }
    }

    /// Move to another exercise. Analyzers are rebuilt, so reps start at zero.
    pub fn switch_exercise(&mut self, exercise: ExerciseType) -> Result<()> {
        self.analyzer = create_analyzer(exercise, &self.config)?;
        tracing::info!(from = %self.exercise, to = %exercise, "Switched exercise");
        self.exercise = exercise;
        self.restart();
        Ok(())
    }

    /// Change difficulty. Analyzers are rebuilt, so reps start at zero.
    pub fn set_difficulty(&mut self, difficulty: DifficultyLevel) -> Result<()> {
        self.analyzer = create_analyzer(self.exercise, &self.config)?;
        tracing::info!(from = %self.difficulty, to = %difficulty, "Changed difficulty");
        self.difficulty = difficulty;
        self.settings = self.config.difficulty(difficulty);
        self.restart();
        Ok(())
    }

    /// Clear reps, trackers and the countdown, keeping exercise and difficulty
    pub fn reset(&mut self) {
        self.analyzer.reset();
        self.tempo.reset();
        self.motion.reset();
        self.events.reset();
        self.started_at = None;
        self.score_total = 0.0;
        self.scored_frames = 0;
        tracing::debug!(exercise = %self.exercise, "Session reset");
    }

    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        let reps = self.reps();
        SessionSummary {
            session_id: self.id,
            exercise: self.exercise,
            difficulty: self.difficulty,
            reps,
            min_reps: self.settings.min_reps,
            target_reached: reps >= self.settings.min_reps,
            elapsed_seconds: self
                .started_at
                .map_or(0.0, |started| seconds_between(started, now)),
            remaining_seconds: self.remaining(now),
            average_form_score: (self.scored_frames > 0)
                .then(|| self.score_total / f64::from(self.scored_frames)),
            tempo: self.tempo.analyze(now),
        }
    }

    fn restart(&mut self) {
        self.tempo = TempoAnalyzer::new(self.config.tempo, self.settings.target_tempo);
        self.motion = MotionAnalyzer::new(self.config.motion);
        self.events.reset();
        self.started_at = None;
        self.score_total = 0.0;
        self.scored_frames = 0;
    }
}

fn log_event(event: &CoachingEvent) {
    match event {
        CoachingEvent::RepCompleted { .. }
        | CoachingEvent::TargetReached { .. }
        | CoachingEvent::TimeUp { .. } => {
            tracing::info!(event = event.kind(), "Coaching event");
        }
        _ => tracing::debug!(event = event.kind(), "Coaching event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::PoseBuilder;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn session(exercise: ExerciseType) -> WorkoutSession {
        WorkoutSession::new(EngineConfig::default(), exercise, DifficultyLevel::Beginner).unwrap()
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut config = EngineConfig::default();
        config.tempo.history_len = 0;
        assert!(WorkoutSession::new(config, ExerciseType::Squat, DifficultyLevel::Beginner).is_err());
    }

    #[test]
    fn test_first_frame_starts_exercise() {
        let mut session = session(ExerciseType::ArmRaise);
        assert_eq!(session.remaining(t0()), 30.0);

        let report = session.process_frame(&PoseBuilder::standing().build(), t0());
        assert_matches!(
            report.events.first(),
            Some(CoachingEvent::ExerciseStarted {
                exercise: ExerciseType::ArmRaise,
                difficulty: DifficultyLevel::Beginner,
            })
        );
        assert_eq!(report.target_stage, ExerciseStage::Up);
        assert!(!report.corrections.is_empty());

        assert!((session.remaining(t0() + Duration::seconds(10)) - 20.0).abs() < 1e-9);
        assert_eq!(session.remaining(t0() + Duration::seconds(40)), 0.0);
    }

    #[test]
    fn test_time_up_fires_once() {
        let mut session = session(ExerciseType::ArmRaise);
        let frame = PoseBuilder::standing().build();
        session.process_frame(&frame, t0());

        let report = session.process_frame(&frame, t0() + Duration::seconds(31));
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, CoachingEvent::TimeUp { reps: 0 })));
        let report = session.process_frame(&frame, t0() + Duration::seconds(32));
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_invisible_frame_has_no_corrections() {
        let mut session = session(ExerciseType::ArmRaise);
        let report = session.process_frame(&PoseBuilder::standing().visibility(0.1).build(), t0());
        assert!(!report.analysis.is_visible);
        assert!(report.corrections.is_empty());
        assert_eq!(report.analysis.stage, ExerciseStage::Idle);
        assert_eq!(session.summary(t0()).average_form_score, None);
    }

    #[test]
    fn test_set_difficulty_rebuilds() {
        let mut session = session(ExerciseType::Squat);
        session.process_frame(&PoseBuilder::standing().build(), t0());
        session.set_difficulty(DifficultyLevel::Advanced).unwrap();

        assert_eq!(session.difficulty(), DifficultyLevel::Advanced);
        assert_eq!(session.settings().min_reps, 15);
        assert_eq!(session.remaining(t0() + Duration::seconds(5)), 60.0);
        assert_eq!(session.stage(), ExerciseStage::Idle);
    }

    #[test]
    fn test_summary() {
        let mut session = session(ExerciseType::Squat);
        let frame = PoseBuilder::standing().build();
        session.process_frame(&frame, t0());
        session.process_frame(&frame, t0() + Duration::seconds(2));

        let summary = session.summary(t0() + Duration::seconds(2));
        assert_eq!(summary.session_id, session.id());
        assert_eq!(summary.reps, 0);
        assert_eq!(summary.min_reps, 5);
        assert!(!summary.target_reached);
        assert!((summary.elapsed_seconds - 2.0).abs() < 1e-9);
        assert_eq!(summary.average_form_score, Some(100.0));
    }
}
