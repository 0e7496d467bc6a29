//! Typed error hierarchy for buildtee.
//!
//! `RunError` covers everything that can stop a run before a child's exit
//! code is known. A child exiting non-zero is not an error: it is reported
//! as an [`Outcome`](crate::orchestrator::Outcome) and mapped to the
//! program's exit code by `main`.

use thiserror::Error;

/// Errors from spawning and supervising a child process.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Command string is empty")]
    EmptyCommand,

    #[error("Failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for '{command}': {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output pipe: {0}")]
    PipeFailed(#[source] std::io::Error),

    #[error("Output stream task failed: {0}")]
    StreamTaskFailed(#[source] tokio::task::JoinError),
}
