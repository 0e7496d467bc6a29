//! Sequences the version check and the build.
//!
//! The first step whose child exits non-zero ends the run; its exit code is
//! returned as an [`Outcome`] so `main` can terminate with it. Later steps
//! never start.

use crate::command::Command;
use crate::config::BuildConfig;
use crate::errors::RunError;
use crate::runner::{OutputMode, ProcessRunner, RunHooks};
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    VersionCheck,
    Build,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::VersionCheck => write!(f, "version check"),
            Step::Build => write!(f, "build"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed { step: Step, exit_code: i32 },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success => 0,
            Outcome::Failed { exit_code, .. } => *exit_code,
        }
    }
}

/// Blank line after the version output, then the build heading and command.
fn write_banner(out: &mut impl Write, build: &Command) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style("Building all projects").bold())?;
    writeln!(out)?;
    writeln!(out, "+ {}", build)?;
    writeln!(out)
}

pub struct Orchestrator {
    config: BuildConfig,
    working_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(config: BuildConfig, working_dir: PathBuf) -> Self {
        Self {
            config,
            working_dir,
        }
    }

    /// Run the version check with the console attached, then the build
    /// through the streaming pipeline.
    pub async fn run(&self) -> Result<Outcome, RunError> {
        let version = Command::new(self.config.commands.version.as_str());
        let code = ProcessRunner::inherited(version, self.working_dir.clone())
            .execute()
            .await?;
        if code != 0 {
            return Ok(Outcome::Failed {
                step: Step::VersionCheck,
                exit_code: code,
            });
        }

        let build = Command::new(self.config.commands.build.as_str());
        if let Err(e) = write_banner(&mut io::stdout().lock(), &build) {
            tracing::warn!(error = %e, "failed to print build banner");
        }

        let mode = OutputMode::Capture {
            log_file: self.working_dir.join(&self.config.log.file),
            window: self.config.log.window,
        };
        let code = ProcessRunner::new(
            build,
            self.working_dir.clone(),
            mode,
            RunHooks::build_report(),
        )
        .execute()
        .await?;
        if code != 0 {
            return Ok(Outcome::Failed {
                step: Step::Build,
                exit_code: code,
            });
        }

        Ok(Outcome::Success)
    }
}
