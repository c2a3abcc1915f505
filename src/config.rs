//! Configuration module for junos-facts
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/junos-facts/config.toml)
//! - User configuration (~/.junos-facts.toml)
//! - Project configuration (./junos-facts.toml)
//! - Environment variables

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::facts::routing_engines::DEFAULT_INFRASTRUCTURE;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fact gathering settings
    pub facts: FactsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Fact gathering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactsConfig {
    /// Infrastructure instance queried when the plain route-engine RPC fails
    pub infrastructure: String,

    /// Skip failing collectors instead of aborting the gather
    pub ignore_failures: bool,

    /// Warn when a reply names the same routing engine twice
    pub warn_on_duplicate_re: bool,
}

impl Default for FactsConfig {
    fn default() -> Self {
        Self {
            infrastructure: DEFAULT_INFRASTRUCTURE.to_string(),
            ignore_failures: true,
            warn_on_duplicate_re: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// EnvFilter directive; `RUST_LOG` takes precedence
    pub filter: Option<String>,

    /// ANSI colors
    pub ansi_colors: bool,

    /// Include the event target
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            filter: None,
            ansi_colors: true,
            with_target: true,
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(crate::error::Error::InvalidConfig {
                key: "logging.level".to_string(),
                message: format!(
                    "Unknown log level: {}. Valid options: trace, debug, info, warn, error",
                    s
                ),
            }),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
    Full,
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                config = config.merge_from_file(&path)?;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.to_path_buf());
            return paths;
        }

        if let Ok(env_config) = std::env::var("JUNOS_FACTS_CONFIG") {
            paths.push(PathBuf::from(env_config));
            return paths;
        }

        paths.push(PathBuf::from("/etc/junos-facts/config.toml"));
        paths.push(PathBuf::from("/etc/junos-facts/config.yml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".junos-facts.toml"));
            paths.push(home.join(".config/junos-facts/config.toml"));
        }

        paths.push(PathBuf::from("junos-facts.toml"));

        paths
    }

    /// Merge configuration from a file
    fn merge_from_file(&self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let file_config: Config = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?,
            _ => {
                // Try TOML first, then YAML
                toml::from_str(&content)
                    .or_else(|_| serde_yaml::from_str(&content))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        Ok(self.merge(file_config))
    }

    /// Merge another config into this one
    ///
    /// Field by field, a value in `other` wins only when it differs from the
    /// default, so a file that leaves a section out keeps the earlier layers.
    fn merge(&self, other: Config) -> Config {
        let facts = FactsConfig::default();
        let logging = LoggingConfig::default();

        Config {
            facts: FactsConfig {
                infrastructure: layered(
                    &self.facts.infrastructure,
                    other.facts.infrastructure,
                    &facts.infrastructure,
                ),
                ignore_failures: layered(
                    &self.facts.ignore_failures,
                    other.facts.ignore_failures,
                    &facts.ignore_failures,
                ),
                warn_on_duplicate_re: layered(
                    &self.facts.warn_on_duplicate_re,
                    other.facts.warn_on_duplicate_re,
                    &facts.warn_on_duplicate_re,
                ),
            },
            logging: LoggingConfig {
                level: layered(&self.logging.level, other.logging.level, &logging.level),
                format: layered(&self.logging.format, other.logging.format, &logging.format),
                filter: other.logging.filter.or_else(|| self.logging.filter.clone()),
                ansi_colors: layered(
                    &self.logging.ansi_colors,
                    other.logging.ansi_colors,
                    &logging.ansi_colors,
                ),
                with_target: layered(
                    &self.logging.with_target,
                    other.logging.with_target,
                    &logging.with_target,
                ),
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // JUNOS_FACTS_INFRASTRUCTURE
        if let Ok(infrastructure) = std::env::var("JUNOS_FACTS_INFRASTRUCTURE") {
            self.facts.infrastructure = infrastructure;
        }

        // JUNOS_FACTS_LOG_LEVEL
        if let Ok(level) = std::env::var("JUNOS_FACTS_LOG_LEVEL") {
            if let Ok(level) = level.parse() {
                self.logging.level = level;
            }
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() {
            self.logging.ansi_colors = false;
        }
    }

    /// Load from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Config::default().merge_from_file(path.as_ref())
    }
}

/// `theirs` unless it is the default, then `ours`.
fn layered<T: Clone + PartialEq>(ours: &T, theirs: T, default: &T) -> T {
    if theirs != *default {
        theirs
    } else {
        ours.clone()
    }
}
