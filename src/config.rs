//! Configuration for buildtee, read from `buildtee.toml`.
//!
//! The file is optional and every field has a default, so a bare `buildtee`
//! in a Maven project needs no setup. Layering is file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [commands]
//! version = "mvn -v"
//! build = "mvn clean verify -B -T 1.5C -U"
//!
//! [log]
//! file = "build.log"
//! window = 2000
//! ```
//!
//! # Environment Overrides
//!
//! | Variable               | Field              |
//! |------------------------|--------------------|
//! | `BUILDTEE_VERSION_CMD` | `commands.version` |
//! | `BUILDTEE_BUILD_CMD`   | `commands.build`   |
//! | `BUILDTEE_LOG_FILE`    | `log.file`         |
//! | `BUILDTEE_WINDOW`      | `log.window`       |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "buildtee.toml";

/// Commands run by the orchestrator, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandsConfig {
    /// Version check, run with the console attached
    #[serde(default = "default_version_cmd")]
    pub version: String,
    /// The build itself, run through the streaming pipeline
    #[serde(default = "default_build_cmd")]
    pub build: String,
}

fn default_version_cmd() -> String {
    "mvn -v".to_string()
}

fn default_build_cmd() -> String {
    "mvn clean verify -B -T 1.5C -U".to_string()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            version: default_version_cmd(),
            build: default_build_cmd(),
        }
    }
}

/// Build log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// Log file, relative to the working directory. Truncated on every run.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    /// Number of trailing lines kept in memory for the failure dump and summary
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("build.log")
}

fn default_window() -> usize {
    2000
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            window: default_window(),
        }
    }
}

/// Root of `buildtee.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl BuildConfig {
    /// Parse a config file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit `path` must exist; otherwise `buildtee.toml` in
    /// `working_dir` is used if present. Environment overrides are applied
    /// through `env` and the result is validated.
    pub fn resolve(
        working_dir: &Path,
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let default_path = working_dir.join(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(cmd) = env("BUILDTEE_VERSION_CMD") {
            self.commands.version = cmd;
        }
        if let Some(cmd) = env("BUILDTEE_BUILD_CMD") {
            self.commands.build = cmd;
        }
        if let Some(file) = env("BUILDTEE_LOG_FILE") {
            self.log.file = PathBuf::from(file);
        }
        if let Some(window) = env("BUILDTEE_WINDOW") {
            self.log.window = window
                .trim()
                .parse()
                .with_context(|| format!("BUILDTEE_WINDOW must be a number, got '{}'", window))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.commands.version.trim().is_empty() {
            anyhow::bail!("commands.version must not be empty");
        }
        if self.commands.build.trim().is_empty() {
            anyhow::bail!("commands.build must not be empty");
        }
        if self.log.window == 0 {
            anyhow::bail!("log.window must be at least 1");
        }
        Ok(())
    }
}
