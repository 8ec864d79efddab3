use anyhow::Result;
use clap::Args;
use colored::Colorize;
use form_coach_engine::ExerciseType;

#[derive(Args)]
pub struct ExercisesCommand {}

impl ExercisesCommand {
    pub fn execute(self) -> Result<()> {
        println!("{}", "Supported Exercises".bold());
        println!();

        for exercise in ExerciseType::all() {
            let descriptor = exercise.descriptor();
            let stages: Vec<String> = descriptor.stages.iter().map(|s| s.to_string()).collect();
            println!(
                "  {:<12} {:<12} stages: {}",
                descriptor.key.cyan(),
                descriptor.display_name,
                stages.join(", ")
            );
        }

        Ok(())
    }
}
