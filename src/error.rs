//! Error types for command execution

use std::io;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Execution errors surfaced by the buffered and streaming runners.
///
/// Adapter and parse failures are propagated with their sources intact; the
/// runners only add [`ExecError::Cancelled`] at their checkpoints.
#[derive(Error, Debug)]
pub enum ExecError {
    /// A cancellation checkpoint observed the token's request flag.
    ///
    /// Carries a clone of the token so callers can inspect the cancellation
    /// source downstream.
    #[error("command execution cancelled before completion")]
    Cancelled {
        /// The token whose cancellation was observed.
        token: CancellationToken,
    },

    /// The process could not be started.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process ran but exited with a non-zero status.
    #[error("'{program}' exited with code {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        /// Exit code, `None` if the process was terminated by a signal.
        code: Option<i32>,
        /// Tail of captured stderr, for diagnostics.
        stderr: String,
    },

    /// A `parse` step rejected the command's output.
    #[error("failed to parse command output")]
    Parse(#[source] anyhow::Error),

    /// Pipe or stream forwarding failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExecError {
    /// True if this error was raised by a cancellation checkpoint.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Recover an execution error forwarded through a pass-through stream.
    ///
    /// The streaming runner delivers spawner failures as the stream's
    /// terminal `io::Error`; this unwraps the original error when one is
    /// wrapped inside.
    #[must_use]
    pub fn from_stream_error(err: io::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(inner) => inner,
            Err(err) => Self::Io(err),
        }
    }
}
