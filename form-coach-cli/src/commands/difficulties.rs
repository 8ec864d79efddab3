use anyhow::Result;
use clap::Args;
use colored::Colorize;
use form_coach_engine::{DifficultyLevel, EngineConfig};

#[derive(Args)]
pub struct DifficultiesCommand {}

impl DifficultiesCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        println!("{}", "Difficulty Levels".bold());
        println!();
        println!(
            "  {:<14} {:>9} {:>9} {:>10}",
            "level", "duration", "min reps", "tempo"
        );

        for level in DifficultyLevel::all() {
            let settings = config.difficulty(*level);
            println!(
                "  {:<14} {:>8}s {:>9} {:>4.1}s/{:.1}s",
                level.key().cyan(),
                settings.duration_seconds,
                settings.min_reps,
                settings.target_tempo.up_seconds,
                settings.target_tempo.down_seconds
            );
        }

        Ok(())
    }
}
