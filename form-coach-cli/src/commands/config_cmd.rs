use anyhow::Result;
use colored::Colorize;
use form_coach_engine::EngineConfig;

use crate::config::ConfigFile;

pub fn show_config(file: &ConfigFile) -> Result<()> {
    let config = file.load()?;
    let config_str = config.to_toml_string()?;

    println!("{}", "Current Configuration".bold());
    println!("────────────────────────────────");
    if file.exists() {
        println!("Source: {}", file.path().display());
    } else {
        println!("Source: built-in defaults");
    }
    println!();
    println!("{}", config_str);

    Ok(())
}

pub fn init_config(file: &ConfigFile, force: bool) -> Result<()> {
    if file.exists() && !force {
        println!(
            "Configuration file already exists at: {}",
            file.path().display()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    file.save(&EngineConfig::default())?;

    println!(
        "{} Configuration initialized at: {}",
        "✓".green(),
        file.path().display()
    );

    Ok(())
}

pub fn show_path(file: &ConfigFile) -> Result<()> {
    println!("{}", file.path().display());
    Ok(())
}
