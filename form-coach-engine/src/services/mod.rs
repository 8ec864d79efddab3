pub mod analyzers;
pub mod coaching_events;
pub mod correction_calculator;
pub mod exercise_analyzer;
pub mod joint_geometry;
pub mod motion_analyzer;
pub mod tempo_analyzer;
pub mod workout_session;

pub use coaching_events::{CoachingEventTracker, EventContext};
pub use correction_calculator::calculate_corrections;
pub use exercise_analyzer::{create_analyzer, ExerciseAnalyzer};
pub use motion_analyzer::MotionAnalyzer;
pub use tempo_analyzer::TempoAnalyzer;
pub use workout_session::WorkoutSession;

use chrono::{DateTime, Utc};

/// Elapsed seconds from `start` to `end`, never negative
pub(crate) fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = end.signed_duration_since(start);
    let seconds = elapsed
        .num_microseconds()
        .map_or(elapsed.num_milliseconds() as f64 / 1_000.0, |us| us as f64 / 1_000_000.0);
    seconds.max(0.0)
}
