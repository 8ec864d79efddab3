/// Repetition tempo tracking
///
/// Records how long each stage lasted, tags it as the working (`Up`) or
/// returning (`Down`) half of a repetition and compares the averaged
/// repetition duration with the difficulty's target tempo.

use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;
use std::collections::VecDeque;

use crate::config::TempoConfig;
use crate::models::difficulty::TargetTempo;
use crate::models::exercise::ExerciseStage;
use crate::models::tempo::{PhaseKind, TempoAnalysis, TempoQuality};
use crate::services::seconds_between;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PhaseRecord {
    kind: PhaseKind,
    seconds: f64,
}

#[derive(Debug, Clone)]
pub struct TempoAnalyzer {
    config: TempoConfig,
    target: TargetTempo,
    history: VecDeque<PhaseRecord>,
    stage: ExerciseStage,
    phase_started: Option<DateTime<Utc>>,
    beat_count: u32,
    last_feedback: Option<DateTime<Utc>>,
}

impl TempoAnalyzer {
    pub fn new(config: TempoConfig, target: TargetTempo) -> Self {
        Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            target,
            stage: ExerciseStage::Idle,
            phase_started: None,
            beat_count: 0,
            last_feedback: None,
        }
    }

    /// Note the stage seen at `now`; a change closes the running phase
    pub fn update_phase(&mut self, stage: ExerciseStage, now: DateTime<Utc>) {
        let Some(started) = self.phase_started else {
            self.stage = stage;
            self.phase_started = Some(now);
            return;
        };
        if stage == self.stage {
            return;
        }

        if let Some(kind) = PhaseKind::from_stage(self.stage) {
            let seconds = seconds_between(started, now);
            self.history.push_back(PhaseRecord { kind, seconds });
            while self.history.len() > self.config.history_len {
                self.history.pop_front();
            }
            self.beat_count += 1;
            tracing::debug!(phase = ?kind, seconds, "Recorded tempo phase");
        }

        self.stage = stage;
        self.phase_started = Some(now);
    }

    pub fn analyze(&self, now: DateTime<Utc>) -> TempoAnalysis {
        let phase_duration = self
            .phase_started
            .map_or(0.0, |started| seconds_between(started, now));

        let ups = self.durations(PhaseKind::Up);
        let downs = self.durations(PhaseKind::Down);
        let avg_up = average(&ups);
        let avg_down = average(&downs);
        let avg_rep = avg_up + avg_down;

        // A full repetition needs both halves before it can be judged
        let tempo_quality = if ups.is_empty() || downs.is_empty() {
            TempoQuality::Good
        } else {
            let ratio = avg_rep / self.target.rep_seconds();
            if ratio < 1.0 - self.config.tolerance {
                TempoQuality::TooFast
            } else if ratio > 1.0 + self.config.tolerance {
                TempoQuality::TooSlow
            } else {
                TempoQuality::Good
            }
        };

        let recommended_tempo = format!(
            "{:.1}s up, {:.1}s down",
            self.target.up_seconds, self.target.down_seconds
        );
        let feedback = if self.history.is_empty() {
            "Move at a steady, controlled pace".to_string()
        } else {
            match tempo_quality {
                TempoQuality::TooFast => format!("Slow down, aim for {}", recommended_tempo),
                TempoQuality::TooSlow => format!("Pick up the pace, aim for {}", recommended_tempo),
                TempoQuality::Good => "Great tempo, keep it up".to_string(),
            }
        };

        TempoAnalysis {
            current_phase: PhaseKind::from_stage(self.stage),
            phase_duration,
            avg_rep_duration: avg_rep,
            avg_up_duration: avg_up,
            avg_down_duration: avg_down,
            tempo_quality,
            consistency_score: consistency(&[&ups, &downs]),
            recommended_tempo,
            feedback,
            beat_count: self.beat_count,
        }
    }

    /// Whether tempo feedback is due at `now`.
    ///
    /// True at most once per cooldown, only with enough recorded phases and
    /// only while the tempo is off target. Returning true starts the cooldown.
    pub fn should_give_feedback(&mut self, now: DateTime<Utc>) -> bool {
        if self.history.len() < self.config.min_phases_for_feedback {
            return false;
        }
        if let Some(last) = self.last_feedback {
            if seconds_between(last, now) < self.config.feedback_cooldown_seconds {
                return false;
            }
        }
        if self.analyze(now).tempo_quality == TempoQuality::Good {
            return false;
        }
        self.last_feedback = Some(now);
        true
    }

    /// Change the target tempo while keeping recorded phases
    pub fn set_difficulty(&mut self, target: TargetTempo) {
        self.target = target;
    }

    pub fn target(&self) -> TargetTempo {
        self.target
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.stage = ExerciseStage::Idle;
        self.phase_started = None;
        self.beat_count = 0;
        self.last_feedback = None;
    }

    fn durations(&self, kind: PhaseKind) -> Vec<f64> {
        self.history
            .iter()
            .filter(|record| record.kind == kind)
            .map(|record| record.seconds)
            .collect()
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// `1 - mean coefficient of variation` over the groups with enough samples
fn consistency(groups: &[&[f64]]) -> f64 {
    let cvs: Vec<f64> = groups
        .iter()
        .filter(|values| values.len() >= 2)
        .filter_map(|values| {
            let mean = values.iter().mean();
            (mean > 0.0).then(|| values.iter().std_dev() / mean)
        })
        .filter(|cv| cv.is_finite())
        .collect();

    if cvs.is_empty() {
        return 1.0;
    }
    (1.0 - cvs.iter().mean()).clamp(0.0, 1.0)
}
