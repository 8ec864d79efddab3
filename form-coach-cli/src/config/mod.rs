use anyhow::{Context, Result};
use form_coach_engine::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the engine configuration file used by the CLI
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Get config directory path (~/.form-coach/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".form-coach"))
    }

    /// Get default config file path (~/.form-coach/config.toml)
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Use `explicit` when given (`--config` / `FORM_COACH_CONFIG`), the
    /// default location otherwise
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the configuration; defaults when the file is missing
    pub fn load(&self) -> Result<EngineConfig> {
        if !self.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(EngineConfig::default());
        }

        EngineConfig::load(&self.path).with_context(|| {
            format!("Failed to load config file {}", self.path.display())
        })
    }

    /// Write `config` to the file, creating its directory if needed
    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = config
            .to_toml_string()
            .context("Failed to serialize config")?;
        fs::write(&self.path, contents).context("Failed to write config file")?;

        tracing::info!("Saved config to {}", self.path.display());
        Ok(())
    }
}
