use thiserror::Error;

/// Errors raised while building analyzers or loading configuration.
///
/// Frame processing itself never fails: missing or low-confidence landmarks
/// are reported through `is_visible` instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown exercise type: {0}")]
    UnknownExercise(String),

    #[error("Unknown difficulty level: {0}")]
    UnknownDifficulty(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
