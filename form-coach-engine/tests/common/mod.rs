#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use form_coach_engine::synthetic::PoseBuilder;
use form_coach_engine::Frame;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

pub fn session_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// Timestamp of frame `index` in a stream recorded at `fps`
pub fn frame_time(index: usize, fps: u32) -> DateTime<Utc> {
    session_start() + Duration::microseconds((index as i64 * 1_000_000) / i64::from(fps))
}

/// One clean arm raise: hold low, raise in 30° steps, hold high, lower
pub fn arm_raise_cycle() -> Vec<Frame> {
    [
        10.0, 10.0, 10.0, 40.0, 70.0, 100.0, 130.0, 160.0, 165.0, 165.0, 165.0, 135.0, 105.0,
        75.0, 45.0, 15.0,
    ]
    .iter()
    .map(|angle| PoseBuilder::standing().arms(*angle, *angle).build())
    .collect()
}

/// One squat from standing to 85° knees and back
pub fn squat_cycle() -> Vec<Frame> {
    [
        175.0, 175.0, 175.0, 145.0, 115.0, 85.0, 85.0, 85.0, 115.0, 145.0, 175.0, 175.0,
    ]
    .iter()
    .map(|knee| PoseBuilder::standing().squat(*knee).build())
    .collect()
}
