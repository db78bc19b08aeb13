use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::noise::parameters::{DEFAULT_GENERATORS, DEFAULT_VOLUME};
use crate::noise::{Algorithm, ConfigError, NoiseParameters};

/// Volume at or above which loud white noise asks for confirmation
pub const LOUD_WHITE_NOISE_VOLUME: u32 = 50;

/// Top-level configuration, loaded from YAML and/or the command line
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NoiseConfig {
    /// Output volume in percent (1-100)
    #[serde(default = "default_volume")]
    pub volume: u32,

    /// Number of summed generators (1-32)
    #[serde(default = "default_generators")]
    pub generators: u32,

    #[serde(default)]
    pub algorithm: Algorithm,

    /// Output device name or index, "default" for the host default
    #[serde(default = "default_audioout")]
    pub audioout: String,

    /// Ask before playing loud white noise
    #[serde(default = "default_warning")]
    pub warning: bool,
}

/// Values given on the command line, applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub volume: Option<u32>,
    pub generators: Option<u32>,
    /// 1-based algorithm index
    pub algorithm: Option<u8>,
    pub audioout: Option<String>,
    pub no_warning: bool,
}

impl NoiseConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: NoiseConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply command line values over the loaded ones
    pub fn apply(&mut self, overrides: Overrides) -> Result<(), ConfigError> {
        if let Some(volume) = overrides.volume {
            self.volume = volume;
        }
        if let Some(generators) = overrides.generators {
            self.generators = generators;
        }
        if let Some(index) = overrides.algorithm {
            self.algorithm =
                Algorithm::from_index(index).ok_or(ConfigError::UnknownAlgorithm(index as u32))?;
        }
        if let Some(audioout) = overrides.audioout {
            self.audioout = audioout;
        }
        if overrides.no_warning {
            self.warning = false;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters().map(|_| ())
    }

    /// Build the immutable engine parameters
    pub fn parameters(&self) -> Result<NoiseParameters, ConfigError> {
        NoiseParameters::new(self.volume, self.generators)
    }

    /// Whether the hearing warning has to be confirmed before playback
    pub fn needs_loud_warning(&self) -> bool {
        self.warning
            && self.algorithm == Algorithm::White
            && self.volume >= LOUD_WHITE_NOISE_VOLUME
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            generators: default_generators(),
            algorithm: Algorithm::default(),
            audioout: default_audioout(),
            warning: default_warning(),
        }
    }
}

// Default value functions for serde
fn default_volume() -> u32 {
    DEFAULT_VOLUME as u32
}

fn default_generators() -> u32 {
    DEFAULT_GENERATORS as u32
}

fn default_audioout() -> String {
    "default".to_string()
}

fn default_warning() -> bool {
    true
}
