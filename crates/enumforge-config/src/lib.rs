//! Configuration system for EnumForge.
//!
//! Load enumerator configuration from TOML or YAML files to choose the oracle
//! and the termination limits without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use enumforge_config::{EnumeratorConfig, OracleConfig};
//! use std::time::Duration;
//!
//! let config = EnumeratorConfig::from_toml_str(r#"
//!     [termination]
//!     solution_limit = 100
//!     seconds_spent_limit = 30
//!
//!     [oracle]
//!     type = "glpsol"
//!     command = "/usr/bin/glpsol"
//!     seconds_spent_limit = 5
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.solution_limit(), Some(100));
//! assert!(matches!(config.oracle, OracleConfig::Glpsol(_)));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use enumforge_config::EnumeratorConfig;
//!
//! let config = EnumeratorConfig::load("enumerator.toml").unwrap_or_default();
//! // Proceeds with the built-in oracle and no limits if the file doesn't exist
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location searched by [`EnumeratorConfig::load_default`].
pub const DEFAULT_CONFIG_FILE: &str = "enumerator.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main enumerator configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EnumeratorConfig {
    /// Environment mode affecting reproducibility and assertions.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Random seed for the built-in oracle's value ordering.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Oracle configuration.
    #[serde(default)]
    pub oracle: OracleConfig,
}

impl EnumeratorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads [`DEFAULT_CONFIG_FILE`] from the working directory.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let OracleConfig::Glpsol(glpsol) = &self.oracle {
            if glpsol.command.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "oracle.command must not be empty".to_string(),
                ));
            }
        }
        if self.solution_limit() == Some(0) {
            return Err(ConfigError::Invalid(
                "termination.solution_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sets the enumeration time limit.
    pub fn with_termination_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the maximum number of solutions to enumerate.
    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.termination = Some(TerminationConfig {
            solution_limit: Some(limit),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the oracle.
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Returns the enumeration time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.as_ref().and_then(|t| t.time_limit())
    }

    /// Returns the solution count limit, if configured.
    pub fn solution_limit(&self) -> Option<u64> {
        self.termination.as_ref().and_then(|t| t.solution_limit)
    }

    /// Returns true if every assignment should be checked against the model.
    pub fn verifies_assignments(&self) -> bool {
        self.environment_mode == EnvironmentMode::FullAssert
    }
}

/// Environment mode affecting enumerator behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Non-reproducible mode with minimal overhead.
    #[default]
    NonReproducible,

    /// Reproducible mode: the built-in oracle uses a fixed seed.
    Reproducible,

    /// Full assert mode: every assignment is checked against every constraint.
    FullAssert,
}

/// Termination configuration.
///
/// Limits are checked between iterations only; an in-flight oracle call is
/// never interrupted by them.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum number of solutions to report.
    pub solution_limit: Option<u64>,

    /// Maximum seconds to spend enumerating.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend enumerating.
    pub minutes_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds = self
            .seconds_spent_limit
            .unwrap_or(0)
            .saturating_add(self.minutes_spent_limit.unwrap_or(0).saturating_mul(60));
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}

/// Oracle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleConfig {
    /// Built-in depth-first oracle.
    Backtracking(BacktrackingConfig),

    /// GLPK's `glpsol` run as a child process.
    Glpsol(GlpsolConfig),
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig::Backtracking(BacktrackingConfig::default())
    }
}

/// Built-in oracle configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BacktrackingConfig {
    /// Maximum search nodes per solve.
    pub node_limit: Option<u64>,

    /// Maximum seconds per solve.
    pub seconds_spent_limit: Option<u64>,
}

impl BacktrackingConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.seconds_spent_limit.map(Duration::from_secs)
    }
}

/// External `glpsol` configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GlpsolConfig {
    /// Executable to run.
    #[serde(default = "default_glpsol_command")]
    pub command: String,

    /// Maximum seconds per solve; the child is killed afterwards.
    pub seconds_spent_limit: Option<u64>,
}

impl GlpsolConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.seconds_spent_limit.map(Duration::from_secs)
    }
}

impl Default for GlpsolConfig {
    fn default() -> Self {
        Self {
            command: default_glpsol_command(),
            seconds_spent_limit: None,
        }
    }
}

fn default_glpsol_command() -> String {
    "glpsol".to_string()
}
