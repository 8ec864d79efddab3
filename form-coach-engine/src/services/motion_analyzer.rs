/// Short-term movement analysis of a single tracked point
///
/// Keeps a rolling window of recent positions, bounded by both sample count
/// and age, and classifies the movement inside it by speed and smoothness.

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;
use std::collections::VecDeque;
use std::f32::consts::PI;

use crate::config::MotionConfig;
use crate::models::landmark::{Point2, Vector2};
use crate::models::motion::{MotionQuality, MotionSpeed, Smoothness};
use crate::services::seconds_between;

#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    config: MotionConfig,
    positions: VecDeque<Point2>,
    timestamps: VecDeque<DateTime<Utc>>,
}

impl MotionAnalyzer {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            positions: VecDeque::with_capacity(config.window_size),
            timestamps: VecDeque::with_capacity(config.window_size),
            config,
        }
    }

    /// Add a position sample. Samples not newer than the last one are dropped.
    pub fn update(&mut self, point: Point2, now: DateTime<Utc>) {
        if !point.x.is_finite() || !point.y.is_finite() {
            return;
        }
        if let Some(last) = self.timestamps.back() {
            if now <= *last {
                return;
            }
        }

        self.positions.push_back(point);
        self.timestamps.push_back(now);

        self.trim_to_horizon(now);
        while self.positions.len() > self.config.window_size {
            self.positions.pop_front();
            self.timestamps.pop_front();
        }
    }

    fn trim_to_horizon(&mut self, now: DateTime<Utc>) {
        while let Some(oldest) = self.timestamps.front() {
            if seconds_between(*oldest, now) <= self.config.horizon_seconds {
                break;
            }
            self.positions.pop_front();
            self.timestamps.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn analyze(&self) -> MotionQuality {
        let steps: Vec<Vector2> = self
            .positions
            .iter()
            .zip(self.positions.iter().skip(1))
            .map(|(from, to)| from.vector_to(to))
            .collect();
        if steps.is_empty() {
            return MotionQuality::default();
        }

        let mean_step = steps
            .iter()
            .map(|s| f64::from(s.length()))
            .mean() as f32;
        let is_moving = mean_step > self.config.noise_floor;

        let speed = if mean_step < self.config.slow_below {
            MotionSpeed::Slow
        } else if mean_step > self.config.fast_above {
            MotionSpeed::Fast
        } else {
            MotionSpeed::Normal
        };

        // Heading changes between consecutive steps that actually moved
        let headings: Vec<f32> = steps
            .iter()
            .filter(|s| s.length() > self.config.noise_floor)
            .map(|s| s.dy.atan2(s.dx))
            .collect();
        let turns: Vec<f64> = headings
            .windows(2)
            .map(|pair| f64::from(wrap_radians(pair[1] - pair[0])))
            .collect();
        let smoothness = if is_moving
            && turns.len() >= 2
            && turns.iter().population_variance() as f32 > self.config.jerk_variance
        {
            Smoothness::Jerky
        } else {
            Smoothness::Smooth
        };

        let feedback = if speed == MotionSpeed::Fast {
            Some("too_fast".to_string())
        } else if smoothness == Smoothness::Jerky {
            Some("jerky".to_string())
        } else {
            None
        };

        MotionQuality {
            speed,
            smoothness,
            is_moving,
            feedback,
        }
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.timestamps.clear();
    }
}

fn wrap_radians(angle: f32) -> f32 {
    let mut wrapped = angle % (2.0 * PI);
    if wrapped > PI {
        wrapped -= 2.0 * PI;
    } else if wrapped <= -PI {
        wrapped += 2.0 * PI;
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(frame: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::milliseconds(frame * 33)
    }

    fn feed(analyzer: &mut MotionAnalyzer, points: impl IntoIterator<Item = Point2>) {
        for (i, p) in points.into_iter().enumerate() {
            analyzer.update(p, at(i as i64));
        }
    }

    #[test]
    fn test_empty_window_is_still() {
        let analyzer = MotionAnalyzer::new(MotionConfig::default());
        assert_eq!(analyzer.analyze(), MotionQuality::default());
    }

    #[test]
    fn test_stationary_point() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        feed(&mut analyzer, (0..12).map(|_| Point2::new(0.5, 0.5)));
        let quality = analyzer.analyze();
        assert!(!quality.is_moving);
        assert_eq!(quality.speed, MotionSpeed::Slow);
        assert_eq!(quality.feedback, None);
    }

    #[test]
    fn test_steady_motion_is_smooth() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        feed(&mut analyzer, (0..12).map(|i| Point2::new(0.2 + 0.02 * i as f32, 0.5)));
        let quality = analyzer.analyze();
        assert!(quality.is_moving);
        assert_eq!(quality.speed, MotionSpeed::Normal);
        assert_eq!(quality.smoothness, Smoothness::Smooth);
        assert_eq!(quality.feedback, None);
    }

    #[test]
    fn test_zigzag_is_jerky() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        feed(
            &mut analyzer,
            (0..12).map(|i| {
                let y = if i % 2 == 0 { 0.5 } else { 0.52 };
                Point2::new(0.2 + 0.02 * i as f32, y)
            }),
        );
        let quality = analyzer.analyze();
        assert_eq!(quality.smoothness, Smoothness::Jerky);
        assert_eq!(quality.feedback.as_deref(), Some("jerky"));
    }

    #[test]
    fn test_large_steps_are_too_fast() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        feed(&mut analyzer, (0..6).map(|i| Point2::new(0.1 + 0.1 * i as f32, 0.5)));
        let quality = analyzer.analyze();
        assert_eq!(quality.speed, MotionSpeed::Fast);
        assert_eq!(quality.feedback.as_deref(), Some("too_fast"));
    }

    #[test]
    fn test_window_bounds() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        feed(&mut analyzer, (0..40).map(|i| Point2::new(0.01 * i as f32, 0.5)));
        assert_eq!(analyzer.len(), MotionConfig::default().window_size);

        // Everything older than the horizon is dropped
        analyzer.update(Point2::new(0.5, 0.5), at(40) + Duration::seconds(5));
        assert_eq!(analyzer.len(), 1);
    }

    #[test]
    fn test_non_monotonic_samples_are_dropped() {
        let mut analyzer = MotionAnalyzer::new(MotionConfig::default());
        analyzer.update(Point2::new(0.5, 0.5), at(5));
        analyzer.update(Point2::new(0.9, 0.9), at(5));
        analyzer.update(Point2::new(0.9, 0.9), at(3));
        assert_eq!(analyzer.len(), 1);

        analyzer.reset();
        assert!(analyzer.is_empty());
    }
}
