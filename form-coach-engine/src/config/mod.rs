use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::models::difficulty::{DifficultyLevel, DifficultySettings};

/// Tunable engine parameters.
///
/// Every threshold and penalty the analyzers use lives here so that
/// empirically tuned values can be changed without touching code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum landmark visibility for a joint to count as seen
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,

    /// Frames averaged before the driving angle is classified
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,

    /// Largest plausible frame-to-frame angle change in degrees
    #[serde(default = "default_max_angle_step")]
    pub max_angle_step: f32,

    #[serde(default)]
    pub quality_bands: QualityBands,

    #[serde(default)]
    pub penalties: FormPenalties,

    #[serde(default)]
    pub thresholds: ExerciseThresholds,

    #[serde(default)]
    pub difficulties: DifficultyTable,

    #[serde(default)]
    pub tempo: TempoConfig,

    #[serde(default)]
    pub motion: MotionConfig,

    #[serde(default)]
    pub correction: CorrectionConfig,
}

/// Enter thresholds for a two-stage exercise.
///
/// The metric enters the peak stage once it passes `enter_peak` and the rest
/// stage once it passes `enter_rest`. Whichever is larger decides the
/// direction, so the same band works for angles that grow (arm raise) and
/// shrink (squat) towards the peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HysteresisBand {
    pub enter_peak: f32,
    pub enter_rest: f32,
}

impl HysteresisBand {
    pub fn peak_is_high(&self) -> bool {
        self.enter_peak > self.enter_rest
    }

    pub fn reached_peak(&self, value: f32) -> bool {
        if self.peak_is_high() {
            value >= self.enter_peak
        } else {
            value <= self.enter_peak
        }
    }

    pub fn reached_rest(&self, value: f32) -> bool {
        if self.peak_is_high() {
            value <= self.enter_rest
        } else {
            value >= self.enter_rest
        }
    }

    /// Whether `candidate` is further towards the peak than `current`
    pub fn is_deeper(&self, candidate: f32, current: f32) -> bool {
        if self.peak_is_high() {
            candidate > current
        } else {
            candidate < current
        }
    }
}

/// Thresholds for exercises with a signed left/right metric.
///
/// A side is entered beyond `+enter` / `-enter`; center is re-entered only
/// once `|metric| < exit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralBand {
    pub enter: f32,
    pub exit: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityBands {
    /// Lowest score still rated good
    pub good_min: u8,
    /// Lowest score still rated fair
    pub fair_min: u8,
}

impl Default for QualityBands {
    fn default() -> Self {
        Self {
            good_min: 80,
            fair_min: 50,
        }
    }
}

/// Score deductions per detected issue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormPenalties {
    pub asymmetry: u8,
    pub range_of_motion: u8,
    pub posture: u8,
    pub speed: u8,
}

impl Default for FormPenalties {
    fn default() -> Self {
        Self {
            asymmetry: 20,
            range_of_motion: 25,
            posture: 20,
            speed: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmRaiseThresholds {
    /// Shoulder angle (hip-shoulder-elbow) band
    pub band: HysteresisBand,
    /// Peak shoulder angle a full rep should reach
    pub ideal_peak: f32,
    pub max_asymmetry: f32,
    /// Elbow angle below which arms count as bent while raised
    pub min_elbow_angle: f32,
    pub target_up: f32,
    pub target_down: f32,
}

impl Default for ArmRaiseThresholds {
    fn default() -> Self {
        Self {
            band: HysteresisBand {
                enter_peak: 140.0,
                enter_rest: 50.0,
            },
            ideal_peak: 160.0,
            max_asymmetry: 20.0,
            min_elbow_angle: 140.0,
            target_up: 170.0,
            target_down: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KneeRaiseThresholds {
    /// Hip angle (shoulder-hip-knee) band of the higher knee
    pub band: HysteresisBand,
    /// Hip angle a full rep should get below
    pub ideal_peak: f32,
    pub max_trunk_lean: f32,
    pub target_up: f32,
    pub target_down: f32,
}

impl Default for KneeRaiseThresholds {
    fn default() -> Self {
        Self {
            band: HysteresisBand {
                enter_peak: 120.0,
                enter_rest: 160.0,
            },
            ideal_peak: 100.0,
            max_trunk_lean: 20.0,
            target_up: 90.0,
            target_down: 175.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    /// Knee angle (hip-knee-ankle) band
    pub band: HysteresisBand,
    /// Knee angle a full rep should get below
    pub ideal_peak: f32,
    pub max_asymmetry: f32,
    pub max_trunk_lean: f32,
    pub target_up: f32,
    pub target_down: f32,
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Self {
            band: HysteresisBand {
                enter_peak: 100.0,
                enter_rest: 160.0,
            },
            ideal_peak: 95.0,
            max_asymmetry: 20.0,
            max_trunk_lean: 30.0,
            target_up: 170.0,
            target_down: 90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorsoTwistThresholds {
    /// Shoulder line rotation relative to the hips, degrees
    pub band: LateralBand,
    pub ideal_peak: f32,
    /// Hip line rotation tolerated while twisting
    pub max_hip_rotation: f32,
    pub target_side: f32,
}

impl Default for TorsoTwistThresholds {
    fn default() -> Self {
        Self {
            band: LateralBand {
                enter: 30.0,
                exit: 10.0,
            },
            ideal_peak: 40.0,
            max_hip_rotation: 20.0,
            target_side: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideBendThresholds {
    /// Trunk lean from vertical, degrees
    pub band: LateralBand,
    pub ideal_peak: f32,
    /// Shoulder twist tolerated while bending
    pub max_twist: f32,
    pub target_side: f32,
}

impl Default for SideBendThresholds {
    fn default() -> Self {
        Self {
            band: LateralBand {
                enter: 15.0,
                exit: 5.0,
            },
            ideal_peak: 20.0,
            max_twist: 20.0,
            target_side: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseThresholds {
    pub arm_raise: ArmRaiseThresholds,
    pub knee_raise: KneeRaiseThresholds,
    pub squat: SquatThresholds,
    pub torso_twist: TorsoTwistThresholds,
    pub side_bend: SideBendThresholds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub beginner: DifficultySettings,
    pub intermediate: DifficultySettings,
    pub advanced: DifficultySettings,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            beginner: DifficultySettings::defaults_for(DifficultyLevel::Beginner),
            intermediate: DifficultySettings::defaults_for(DifficultyLevel::Intermediate),
            advanced: DifficultySettings::defaults_for(DifficultyLevel::Advanced),
        }
    }
}

impl DifficultyTable {
    pub fn settings(&self, level: DifficultyLevel) -> DifficultySettings {
        match level {
            DifficultyLevel::Beginner => self.beginner,
            DifficultyLevel::Intermediate => self.intermediate,
            DifficultyLevel::Advanced => self.advanced,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoConfig {
    /// Completed phases kept for averaging
    pub history_len: usize,
    /// Relative deviation from the target rep duration still rated good
    pub tolerance: f64,
    pub feedback_cooldown_seconds: f64,
    pub min_phases_for_feedback: usize,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            history_len: 10,
            tolerance: 0.25,
            feedback_cooldown_seconds: 5.0,
            min_phases_for_feedback: 2,
        }
    }
}

/// Motion analyzer limits, displacements in normalized image units per sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub window_size: usize,
    pub horizon_seconds: f64,
    pub noise_floor: f32,
    pub slow_below: f32,
    pub fast_above: f32,
    /// Direction-change variance (rad^2) above which motion is jerky
    pub jerk_variance: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            window_size: 12,
            horizon_seconds: 1.5,
            noise_floor: 0.002,
            slow_below: 0.01,
            fast_above: 0.05,
            jerk_variance: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Angle gap in degrees below which no correction is shown
    pub significance_degrees: f32,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            significance_degrees: 15.0,
        }
    }
}

// Default value functions
fn default_visibility_threshold() -> f32 {
    0.5
}

fn default_smoothing_window() -> usize {
    3
}

fn default_max_angle_step() -> f32 {
    60.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
            smoothing_window: default_smoothing_window(),
            max_angle_step: default_max_angle_step(),
            quality_bands: QualityBands::default(),
            penalties: FormPenalties::default(),
            thresholds: ExerciseThresholds::default(),
            difficulties: DifficultyTable::default(),
            tempo: TempoConfig::default(),
            motion: MotionConfig::default(),
            correction: CorrectionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&contents)?;
        tracing::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn difficulty(&self, level: DifficultyLevel) -> DifficultySettings {
        self.difficulties.settings(level)
    }

    /// Reject configurations that would silently mis-score a workout
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(EngineError::invalid_config(format!(
                "visibility_threshold must be within [0, 1], got {}",
                self.visibility_threshold
            )));
        }
        if self.smoothing_window == 0 {
            return Err(EngineError::invalid_config(
                "smoothing_window must be at least 1",
            ));
        }
        if !(self.max_angle_step.is_finite() && self.max_angle_step > 0.0) {
            return Err(EngineError::invalid_config("max_angle_step must be positive"));
        }

        let bands = self.quality_bands;
        if bands.good_min > 100 || bands.fair_min >= bands.good_min {
            return Err(EngineError::invalid_config(format!(
                "quality bands must satisfy fair_min < good_min <= 100, got {} / {}",
                bands.fair_min, bands.good_min
            )));
        }

        let t = &self.thresholds;
        validate_band("arm_raise", &t.arm_raise.band)?;
        validate_band("knee_raise", &t.knee_raise.band)?;
        validate_band("squat", &t.squat.band)?;
        validate_lateral("torso_twist", &t.torso_twist.band)?;
        validate_lateral("side_bend", &t.side_bend.band)?;

        for level in DifficultyLevel::all() {
            let settings = self.difficulty(*level);
            if settings.duration_seconds == 0 {
                return Err(EngineError::invalid_config(format!(
                    "{} duration_seconds must be positive",
                    level
                )));
            }
            if settings.min_reps == 0 {
                return Err(EngineError::invalid_config(format!(
                    "{} min_reps must be at least 1",
                    level
                )));
            }
            let tempo = &settings.target_tempo;
            if !(is_positive(tempo.up_seconds) && is_positive(tempo.down_seconds)) {
                return Err(EngineError::invalid_config(format!(
                    "{} target tempo must be positive",
                    level
                )));
            }
        }

        if self.tempo.history_len < 2 {
            return Err(EngineError::invalid_config("tempo.history_len must be at least 2"));
        }
        if !(self.tempo.tolerance > 0.0 && self.tempo.tolerance < 1.0) {
            return Err(EngineError::invalid_config(
                "tempo.tolerance must be within (0, 1)",
            ));
        }
        let cooldown = self.tempo.feedback_cooldown_seconds;
        if !(cooldown.is_finite() && cooldown >= 0.0) {
            return Err(EngineError::invalid_config(
                "tempo.feedback_cooldown_seconds must not be negative",
            ));
        }

        let m = &self.motion;
        if m.window_size < 3 {
            return Err(EngineError::invalid_config("motion.window_size must be at least 3"));
        }
        if !(m.horizon_seconds.is_finite() && m.horizon_seconds > 0.0) {
            return Err(EngineError::invalid_config("motion.horizon_seconds must be positive"));
        }
        if !(m.noise_floor <= m.slow_below && m.slow_below < m.fast_above) {
            return Err(EngineError::invalid_config(
                "motion thresholds must satisfy noise_floor <= slow_below < fast_above",
            ));
        }
        if !(m.fast_above.is_finite() && is_positive(f64::from(m.jerk_variance))) {
            return Err(EngineError::invalid_config(
                "motion.fast_above must be finite and motion.jerk_variance positive",
            ));
        }

        let significance = self.correction.significance_degrees;
        if !(significance.is_finite() && significance >= 0.0) {
            return Err(EngineError::invalid_config(
                "correction.significance_degrees must not be negative",
            ));
        }

        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn validate_band(name: &str, band: &HysteresisBand) -> Result<()> {
    if !band.enter_peak.is_finite()
        || !band.enter_rest.is_finite()
        || (band.enter_peak - band.enter_rest).abs() < 1.0
    {
        tracing::warn!("Rejected {} band {:?}", name, band);
        return Err(EngineError::invalid_config(format!(
            "{} band needs distinct enter_peak and enter_rest, got {} / {}",
            name, band.enter_peak, band.enter_rest
        )));
    }
    Ok(())
}

fn validate_lateral(name: &str, band: &LateralBand) -> Result<()> {
    if !(band.exit > 0.0 && band.exit < band.enter) {
        tracing::warn!("Rejected {} band {:?}", name, band);
        return Err(EngineError::invalid_config(format!(
            "{} band needs 0 < exit < enter, got exit {} enter {}",
            name, band.exit, band.enter
        )));
    }
    Ok(())
}
