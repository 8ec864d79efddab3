use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use form_coach_engine::{
    CoachingEvent, DifficultyLevel, EngineConfig, ExerciseType, Frame, MotionQuality,
    SessionSummary, WorkoutSession,
};

#[derive(Args)]
pub struct ReplayCommand {
    /// JSON Lines file with one landmark frame per line
    file: PathBuf,

    /// Exercise to analyze (e.g. arm_raise, squat)
    #[arg(short, long)]
    exercise: ExerciseType,

    /// Difficulty level
    #[arg(short, long, default_value = "beginner")]
    difficulty: DifficultyLevel,

    /// Frame rate the recording was captured at
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Print one JSON frame report per line instead of events
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    pub fps: u32,
    pub json: bool,
}

/// Totals gathered while replaying a stream
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub frames: usize,
    pub visible_frames: usize,
    pub summary: SessionSummary,
    pub motion: MotionQuality,
}

impl ReplayCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let file = File::open(&self.file)
            .with_context(|| format!("Failed to open {}", self.file.display()))?;

        let mut session = WorkoutSession::new(config.clone(), self.exercise, self.difficulty)
            .context("Failed to start workout session")?;
        let options = ReplayOptions {
            fps: self.fps,
            json: self.json,
        };

        let stdout = io::stdout();
        let mut out = stdout.lock();
        let outcome = replay_frames(BufReader::new(file), &mut out, &mut session, Utc::now(), options)?;

        if !self.json {
            print_summary(&mut out, &outcome)?;
        }
        Ok(())
    }
}

/// Drive `session` with every frame in `reader`.
///
/// Frame `i` is stamped `start + i / fps`. Blank lines are skipped and a
/// malformed line aborts the replay with its line number.
pub fn replay_frames<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    session: &mut WorkoutSession,
    start: DateTime<Utc>,
    options: ReplayOptions,
) -> Result<ReplayOutcome> {
    if options.fps == 0 {
        bail!("--fps must be greater than zero");
    }

    let mut frames = 0usize;
    let mut visible_frames = 0usize;
    let mut now = start;
    let mut motion = MotionQuality::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let frame: Frame = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {}", index + 1))?;

        now = start + frame_offset(frames, options.fps);
        let report = session.process_frame(&frame, now);
        frames += 1;
        if report.analysis.is_visible {
            visible_frames += 1;
        }

        if options.json {
            serde_json::to_writer(&mut *out, &report)?;
            writeln!(out)?;
        } else {
            let elapsed = (now - start).num_milliseconds() as f64 / 1_000.0;
            for event in &report.events {
                writeln!(
                    out,
                    "[{:>7.2}s] {:<16} {}",
                    elapsed,
                    event.kind().yellow(),
                    describe_event(event)
                )?;
            }
        }
        motion = report.motion;
    }

    tracing::debug!(frames, visible_frames, "Replay finished");

    Ok(ReplayOutcome {
        frames,
        visible_frames,
        summary: session.summary(now),
        motion,
    })
}

fn frame_offset(index: usize, fps: u32) -> Duration {
    Duration::microseconds(index as i64 * 1_000_000 / i64::from(fps))
}

fn describe_event(event: &CoachingEvent) -> String {
    match event {
        CoachingEvent::ExerciseStarted {
            exercise,
            difficulty,
        } => format!(
            "Starting {} ({})",
            exercise.descriptor().display_name,
            difficulty
        ),
        CoachingEvent::RepCompleted { count } => format!("Rep {}", count),
        CoachingEvent::FormFeedback {
            quality,
            suggestions,
        } => format!("{} form: {}", quality, suggestions.join(", ")),
        CoachingEvent::TempoFeedback { text, .. } => text.clone(),
        CoachingEvent::MotionFeedback { tag } => tag.clone(),
        CoachingEvent::TargetReached { reps } => format!("Target reached with {} reps", reps),
        CoachingEvent::TimeUp { reps } => format!("Time up after {} reps", reps),
    }
}

fn print_summary<W: Write>(out: &mut W, outcome: &ReplayOutcome) -> Result<()> {
    let summary = &outcome.summary;
    let target = if summary.target_reached {
        "✓".green()
    } else {
        "✗".red()
    };

    writeln!(out)?;
    writeln!(out, "{}", "Replay Summary".bold())?;
    writeln!(out, "────────────────────────────────")?;
    writeln!(
        out,
        "Exercise:    {} ({})",
        summary.exercise,
        summary.exercise.descriptor().display_name
    )?;
    writeln!(out, "Difficulty:  {}", summary.difficulty)?;
    writeln!(
        out,
        "Frames:      {} ({} visible)",
        outcome.frames, outcome.visible_frames
    )?;
    writeln!(
        out,
        "Reps:        {} / {} {}",
        summary.reps, summary.min_reps, target
    )?;
    match summary.average_form_score {
        Some(score) => writeln!(out, "Form score:  {:.1}", score)?,
        None => writeln!(out, "Form score:  n/a")?,
    }
    writeln!(
        out,
        "Tempo:       {} ({:.1}s per rep, consistency {:.2})",
        summary.tempo.tempo_quality, summary.tempo.avg_rep_duration, summary.tempo.consistency_score
    )?;
    writeln!(
        out,
        "Motion:      {}, {}",
        outcome.motion.speed, outcome.motion.smoothness
    )?;
    writeln!(out, "Elapsed:     {:.1}s", summary.elapsed_seconds)?;

    Ok(())
}
