//! Spawn a child process and supervise it to completion.
//!
//! One runner type covers both ways a step is executed. [`OutputMode`]
//! decides whether the child talks straight to the console or has its merged
//! output teed through a [`StreamTee`]; [`RunHooks`] supplies the per-line,
//! failure and success behaviors.

use crate::command::Command;
use crate::errors::RunError;
use crate::progress::progress_line;
use crate::summary;
use crate::tee::{LineSink, StreamTee, pipe_lines};
use crate::window::LogWindow;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

/// Called once with the retained window after the child exits.
pub type WindowHook = Box<dyn FnOnce(&LogWindow) + Send>;

/// Pluggable behaviors for one execution. The defaults do nothing.
pub struct RunHooks {
    pub on_output_line: LineSink,
    pub on_failure: WindowHook,
    pub on_success: WindowHook,
}

impl Default for RunHooks {
    fn default() -> Self {
        Self {
            on_output_line: Box::new(|_: &str| {}),
            on_failure: Box::new(|_: &LogWindow| {}),
            on_success: Box::new(|_: &LogWindow| {}),
        }
    }
}

impl RunHooks {
    /// Live progress lines, a log-tail dump on failure and the reactor
    /// summary on success.
    pub fn build_report() -> Self {
        Self {
            on_output_line: progress_sink(io::stdout()),
            on_failure: Box::new(summary::print_failure),
            on_success: Box::new(summary::print_success),
        }
    }
}

/// Writes progress lines to `out`.
///
/// Once a write fails (stdout closed by `| head`, for instance) the display
/// is switched off and the build keeps running.
pub fn progress_sink(mut out: impl Write + Send + 'static) -> LineSink {
    let mut enabled = true;
    Box::new(move |line: &str| {
        if !enabled {
            return;
        }
        if let Some(progress) = progress_line(line) {
            if let Err(e) = writeln!(out, "{}", progress) {
                tracing::warn!(error = %e, "failed to print progress, disabling display");
                enabled = false;
            }
        }
    })
}

/// Where the child's output goes.
#[derive(Debug, Clone)]
pub enum OutputMode {
    /// The child shares the parent's console. Nothing is captured.
    Inherit,
    /// stdout and stderr are merged, logged to `log_file` and the last
    /// `window` lines retained for the hooks.
    Capture { log_file: PathBuf, window: usize },
}

pub struct ProcessRunner {
    command: Command,
    working_dir: PathBuf,
    mode: OutputMode,
    hooks: RunHooks,
}

impl ProcessRunner {
    pub fn new(command: Command, working_dir: PathBuf, mode: OutputMode, hooks: RunHooks) -> Self {
        Self {
            command,
            working_dir,
            mode,
            hooks,
        }
    }

    /// A runner whose child writes directly to the console.
    pub fn inherited(command: Command, working_dir: PathBuf) -> Self {
        Self::new(command, working_dir, OutputMode::Inherit, RunHooks::default())
    }

    /// Run the child to completion and return its exit code.
    ///
    /// The child inherits the full environment. In capture mode the stream
    /// task and the exit wait progress together and both finish before any
    /// hook sees the window. There is no timeout.
    pub async fn execute(self) -> Result<i32, RunError> {
        let Self {
            command,
            working_dir,
            mode,
            hooks,
        } = self;
        let RunHooks {
            on_output_line,
            on_failure,
            on_success,
        } = hooks;

        let (program, args) = command.argv()?;
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(&args).current_dir(&working_dir);

        let lines = match &mode {
            OutputMode::Inherit => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
                None
            }
            OutputMode::Capture { .. } => {
                let (reader, writer) = io::pipe().map_err(RunError::PipeFailed)?;
                let stdout = writer.try_clone().map_err(RunError::PipeFailed)?;
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::from(stdout))
                    .stderr(Stdio::from(writer));
                Some(pipe_lines(reader).map_err(RunError::PipeFailed)?)
            }
        };

        let spawned = cmd.spawn();
        // The command still owns the parent's write ends; the reader only
        // sees end-of-file once they are gone.
        drop(cmd);
        let mut child = spawned.map_err(|source| RunError::SpawnFailed {
            command: command.to_string(),
            source,
        })?;
        tracing::debug!(pid = ?child.id(), command = %command, dir = %working_dir.display(), "spawned");

        let (status, window) = match (mode, lines) {
            (OutputMode::Capture { log_file, window }, Some(lines)) => {
                let tee = StreamTee::new(log_file, LogWindow::new(window), on_output_line);
                let tee_task = tokio::spawn(tee.run(lines));

                let (status, joined) = tokio::join!(child.wait(), tee_task);
                (status, joined.map_err(RunError::StreamTaskFailed)?)
            }
            _ => (child.wait().await, LogWindow::new(0)),
        };

        let status = status.map_err(|source| RunError::WaitFailed {
            command: command.to_string(),
            source,
        })?;
        let code = exit_code(status);
        tracing::debug!(command = %command, code, "exited");

        if code != 0 {
            on_failure(&window);
        } else {
            on_success(&window);
        }
        Ok(code)
    }
}

/// Exit code of a finished child. A child killed by a signal reports
/// `128 + signal` on Unix, like a shell would.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
