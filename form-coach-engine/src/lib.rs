//! Form coaching engine
//!
//! Turns a stream of 33-point pose landmark frames into repetition counts,
//! form scores, joint corrections, tempo and motion feedback, and discrete
//! coaching events. Pose estimation, rendering and audio live outside this
//! crate.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod synthetic;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use models::*;
pub use services::{
    calculate_corrections, create_analyzer, ExerciseAnalyzer, MotionAnalyzer, TempoAnalyzer,
    WorkoutSession,
};
