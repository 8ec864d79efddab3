//! End-to-end workout scenarios through `WorkoutSession`
//!
//! Tests cover:
//! - Rep counting and target detection over a full set
//! - Visibility gating on unusable frames
//! - Exercise switching and difficulty changes
//! - Tempo and motion classification from timed streams
mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use pretty_assertions::assert_eq;

use common::{arm_raise_cycle, frame_time, init_test_logging, session_start, squat_cycle};
use form_coach_engine::synthetic::PoseBuilder;
use form_coach_engine::{
    CoachingEvent, DifficultyLevel, EngineConfig, ExerciseStage, ExerciseType, FormQuality,
    Frame, Landmark, MotionAnalyzer, Point2, TempoAnalyzer, TempoQuality, WorkoutSession,
};

fn session(exercise: ExerciseType, difficulty: DifficultyLevel) -> WorkoutSession {
    WorkoutSession::new(EngineConfig::default(), exercise, difficulty)
        .expect("default config is valid")
}

#[test]
fn test_arm_raise_intermediate_full_set() {
    init_test_logging();
    let mut session = session(ExerciseType::ArmRaise, DifficultyLevel::Intermediate);

    let frames: Vec<Frame> = (0..10).flat_map(|_| arm_raise_cycle()).collect();
    let mut events = Vec::new();
    let mut last = None;
    for (i, frame) in frames.iter().enumerate() {
        let report = session.process_frame(frame, frame_time(i, 30));
        assert!(report.analysis.is_visible);
        events.extend(report.events.clone());
        last = Some(report);
    }

    let last = last.unwrap();
    assert_eq!(session.reps(), 10);
    assert_eq!(last.analysis.reps, 10);
    assert_eq!(last.analysis.stage, ExerciseStage::Down);
    assert_eq!(last.analysis.form_feedback.quality, FormQuality::Good);

    let rep_counts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            CoachingEvent::RepCompleted { count } => Some(*count),
            _ => None,
        })
        .collect();
    assert_eq!(rep_counts, (1..=10).collect::<Vec<_>>());

    let targets: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, CoachingEvent::TargetReached { .. }))
        .collect();
    assert_matches!(targets.as_slice(), [CoachingEvent::TargetReached { reps: 10 }]);
    assert!(!events
        .iter()
        .any(|e| matches!(e, CoachingEvent::FormFeedback { .. })));

    let summary = session.summary(frame_time(frames.len(), 30));
    assert!(summary.target_reached);
    assert_eq!(summary.average_form_score, Some(100.0));
}

#[test]
fn test_rep_completed_flag_matches_count() {
    let mut session = session(ExerciseType::Squat, DifficultyLevel::Beginner);
    let frames: Vec<Frame> = (0..3).flat_map(|_| squat_cycle()).collect();

    let completed = frames
        .iter()
        .enumerate()
        .map(|(i, f)| session.process_frame(f, frame_time(i, 30)))
        .filter(|r| r.analysis.rep_completed)
        .count();

    assert_eq!(completed, 3);
    assert_eq!(session.reps(), 3);
}

#[test]
fn test_invisible_frame_is_idle() {
    let mut session = session(ExerciseType::ArmRaise, DifficultyLevel::Beginner);
    let invisible = Frame::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.1); 33]);

    let report = session.process_frame(&invisible, session_start());
    assert!(!report.analysis.is_visible);
    assert_eq!(report.analysis.stage, ExerciseStage::Idle);
    assert_eq!(report.analysis.reps, 0);
    assert!(!report.analysis.rep_completed);
    assert!(report.corrections.is_empty());
}

#[test]
fn test_empty_and_short_frames_are_not_visible() {
    let mut session = session(ExerciseType::TorsoTwist, DifficultyLevel::Beginner);
    let empty = session.process_frame(&Frame::default(), session_start());
    assert!(!empty.analysis.is_visible);

    let short = Frame::new(vec![Landmark::new(0.5, 0.5, 0.0, 0.9); 12]);
    let report = session.process_frame(&short, session_start() + Duration::milliseconds(33));
    assert!(!report.analysis.is_visible);
}

#[test]
fn test_occlusion_mid_rep_keeps_count() {
    let mut session = session(ExerciseType::ArmRaise, DifficultyLevel::Beginner);
    let mut frames = arm_raise_cycle();
    // Lose the pose while the arms are up
    frames.insert(10, PoseBuilder::standing().visibility(0.2).build());

    let mut reports = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        reports.push(session.process_frame(frame, frame_time(i, 30)));
    }

    assert!(!reports[10].analysis.is_visible);
    assert_eq!(reports[10].analysis.stage, ExerciseStage::Up);
    assert_eq!(session.reps(), 1);
}

#[test]
fn test_switch_exercise_resets_reps() {
    let mut session = session(ExerciseType::Squat, DifficultyLevel::Beginner);
    for (i, frame) in squat_cycle().iter().enumerate() {
        session.process_frame(frame, frame_time(i, 30));
    }
    assert_eq!(session.reps(), 1);

    session.switch_exercise(ExerciseType::ArmRaise).unwrap();
    assert_eq!(session.exercise(), ExerciseType::ArmRaise);
    assert_eq!(session.reps(), 0);
    assert_eq!(session.stage(), ExerciseStage::Idle);

    let report = session.process_frame(&PoseBuilder::standing().build(), frame_time(100, 30));
    assert_matches!(
        report.events.first(),
        Some(CoachingEvent::ExerciseStarted {
            exercise: ExerciseType::ArmRaise,
            ..
        })
    );
}

#[test]
fn test_reset_keeps_exercise() {
    let mut session = session(ExerciseType::Squat, DifficultyLevel::Beginner);
    for (i, frame) in squat_cycle().iter().enumerate() {
        session.process_frame(frame, frame_time(i, 30));
    }
    session.reset();
    assert_eq!(session.reps(), 0);
    assert_eq!(session.exercise(), ExerciseType::Squat);
    assert_eq!(session.remaining(frame_time(500, 30)), 30.0);
}

#[test]
fn test_slow_squats_trigger_tempo_feedback() {
    let mut session = session(ExerciseType::Squat, DifficultyLevel::Advanced);
    // 4 fps: each half of the rep takes far longer than the 1 s target
    let frames: Vec<Frame> = (0..3).flat_map(|_| squat_cycle()).collect();
    let events: Vec<CoachingEvent> = frames
        .iter()
        .enumerate()
        .flat_map(|(i, f)| session.process_frame(f, frame_time(i, 4)).events)
        .collect();

    assert!(events.iter().any(|e| matches!(
        e,
        CoachingEvent::TempoFeedback {
            quality: TempoQuality::TooSlow,
            ..
        }
    )));
}

#[test]
fn test_tempo_at_target_and_double() {
    let config = EngineConfig::default();
    let target = config.difficulty(DifficultyLevel::Intermediate).target_tempo;

    for (half_seconds, expected) in [(1.5, TempoQuality::Good), (3.0, TempoQuality::TooSlow)] {
        let mut tempo = TempoAnalyzer::new(config.tempo, target);
        let mut now = session_start();
        tempo.update_phase(ExerciseStage::Down, now);
        for i in 0..8 {
            now += Duration::milliseconds((half_seconds * 1000.0) as i64);
            let stage = if i % 2 == 0 {
                ExerciseStage::Up
            } else {
                ExerciseStage::Down
            };
            tempo.update_phase(stage, now);
        }
        assert_eq!(tempo.analyze(now).tempo_quality, expected);
    }
}

#[test]
fn test_motion_stationary_and_steady() {
    let config = EngineConfig::default();

    let mut still = MotionAnalyzer::new(config.motion);
    for i in 0..12 {
        still.update(Point2::new(0.5, 0.5), frame_time(i, 30));
    }
    assert!(!still.analyze().is_moving);

    let mut steady = MotionAnalyzer::new(config.motion);
    for i in 0..12 {
        steady.update(Point2::new(0.3 + 0.02 * i as f32, 0.4), frame_time(i, 30));
    }
    let quality = steady.analyze();
    assert!(quality.is_moving);
    assert_eq!(quality.feedback, None);
}

#[test]
fn test_frames_parse_from_recorded_json() {
    let frame = PoseBuilder::standing().arms(90.0, 90.0).build();
    let wrapped = serde_json::to_string(&frame).unwrap();
    let bare = serde_json::to_string(&frame.landmarks).unwrap();

    let from_wrapped: Frame = serde_json::from_str(&wrapped).unwrap();
    let from_bare: Frame = serde_json::from_str(&bare).unwrap();
    assert_eq!(from_wrapped, from_bare);
    assert_eq!(from_bare.landmarks.len(), 33);
}
