mod config_cmd;
mod difficulties;
mod exercises;
mod replay;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigFile;

pub use difficulties::DifficultiesCommand;
pub use exercises::ExercisesCommand;
pub use replay::{replay_frames, ReplayCommand, ReplayOptions, ReplayOutcome};

#[derive(Parser)]
#[command(name = "form-coach")]
#[command(about = "Camera-based exercise form coaching", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "FORM_COACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded landmark stream through a workout session
    Replay(ReplayCommand),

    /// List supported exercises
    Exercises(ExercisesCommand),

    /// Show the difficulty table
    Difficulties(DifficultiesCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the effective configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the configuration file location
    Path,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_file = ConfigFile::locate(self.config.as_deref())?;

        match self.command {
            Commands::Replay(cmd) => cmd.execute(&config_file.load()?),
            Commands::Exercises(cmd) => cmd.execute(),
            Commands::Difficulties(cmd) => cmd.execute(&config_file.load()?),
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&config_file),
                ConfigSubcommands::Init { force } => config_cmd::init_config(&config_file, force),
                ConfigSubcommands::Path => config_cmd::show_path(&config_file),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
