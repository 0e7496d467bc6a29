//! Command lines handed to the runner.

use crate::errors::RunError;

/// An immutable command line plus its platform-specific invocation form.
///
/// Arguments are produced by naive whitespace splitting: quoting is not
/// understood, so `sh -c 'a b'` becomes four arguments. Commands that need
/// shell quoting should live in a script that is invoked by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    command: String,
    invocation: String,
}

impl Command {
    /// Build a command for the OS this binary was compiled for.
    pub fn new(command: impl Into<String>) -> Self {
        Self::for_platform(command, cfg!(windows))
    }

    /// Build a command, prefixing `cmd.exe /c` when `windows` is set.
    pub fn for_platform(command: impl Into<String>, windows: bool) -> Self {
        let command = command.into();
        let invocation = if windows {
            format!("cmd.exe /c {}", command)
        } else {
            command.clone()
        };
        Self {
            command,
            invocation,
        }
    }

    /// The command as written, without any platform prefix.
    pub fn as_str(&self) -> &str {
        &self.command
    }

    /// The platform-adjusted form actually executed.
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    /// Split the invocation into program and arguments.
    pub fn argv(&self) -> Result<(&str, Vec<&str>), RunError> {
        let mut parts = self.invocation.split_whitespace();
        let program = parts.next().ok_or(RunError::EmptyCommand)?;
        Ok((program, parts.collect()))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command)
    }
}
