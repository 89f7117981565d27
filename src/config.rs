// Configuration - Session settings stored as RON
// Every field has a default, so a config file only needs the values it changes.

use crate::session::PerformanceParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialization error: {0}")]
    Ron(#[from] ron::Error),

    #[error("Invalid audio setting: {0}")]
    Invalid(String),
}

/// Render and capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    /// Frames rendered per block
    pub block_size: usize,
    /// Capture ring capacity, in blocks
    pub capture_capacity: usize,
    /// Where timestamped recordings are written
    pub output_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            block_size: 128,
            capture_capacity: 4096,
            output_dir: PathBuf::from("recordings"),
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".to_string()));
        }
        if self.block_size == 0 {
            return Err(ConfigError::Invalid("block_size must be positive".to_string()));
        }
        if self.capture_capacity == 0 {
            return Err(ConfigError::Invalid(
                "capture_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub performance: PerformanceParams,
    pub audio: AudioConfig,
    /// Fixed random seed for reproducible performances
    pub seed: Option<u64>,
}

impl SessionConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let mut config: SessionConfig = ron::from_str(text)?;
        config.performance = config.performance.sanitized();
        config.audio.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
