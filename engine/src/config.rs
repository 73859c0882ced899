//! Solver configuration
//!
//! Loaded from YAML; every field has a default so a partial file (or no file
//! at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Parameters for one decision: tree shape, sampling and iteration count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// CFR iterations per decision
    pub iterations: u32,
    /// Decision levels below the root before truncation
    pub max_depth: usize,
    /// Raise sizes as fractions of the pot after calling
    pub raise_fractions: Vec<f64>,
    /// Opponent hands dealt at the root chance node
    pub opponent_samples: usize,
    /// Outcomes kept when a chance node reveals more than one card
    pub chance_samples: usize,
    /// Run-outs used to estimate equity when two or more cards are missing
    pub equity_samples: usize,
    /// Seed for every deterministic sample
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            iterations: 50,
            max_depth: 3,
            raise_fractions: vec![0.5, 1.0],
            opponent_samples: 24,
            chance_samples: 8,
            equity_samples: 64,
            seed: 0x5EED_CF12,
        }
    }
}

impl SolverConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".into()));
        }
        self.validate_search()
    }

    /// Validate everything except the iteration count, which the solver
    /// checks when it runs.
    pub fn validate_search(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.opponent_samples == 0 || self.chance_samples == 0 || self.equity_samples == 0 {
            return Err(ConfigError::Invalid("sample counts must be at least 1".into()));
        }
        if let Some(f) = self.raise_fractions.iter().find(|f| !(**f > 0.0) || !f.is_finite()) {
            return Err(ConfigError::Invalid(format!("raise fraction {} must be positive", f)));
        }
        Ok(())
    }
}

/// Errors from loading a [`SolverConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SolverConfig::from_yaml("iterations: 500\nmax_depth: 2\n").unwrap();
        assert_eq!(config.iterations, 500);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.raise_fractions, vec![0.5, 1.0]);
    }

    #[test]
    fn test_search_check_ignores_iterations() {
        let config = SolverConfig {
            iterations: 0,
            ..SolverConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.validate_search().is_ok());

        let config = SolverConfig {
            equity_samples: 0,
            ..SolverConfig::default()
        };
        assert!(config.validate_search().is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SolverConfig::from_yaml("iterations: 0").is_err());
        assert!(SolverConfig::from_yaml("raise_fractions: [0.5, -1.0]").is_err());
        assert!(SolverConfig::from_yaml("max_depth: [").is_err());
    }
}
