//! Typed command execution with buffered and streaming output capture
//!
//! Callers describe commands logically — an executable, raw arguments, and
//! optionally a parse step — and never touch process-spawning primitives.
//! The [`Executor`] owns shell quoting, stdout buffering, and cooperative
//! cancellation, and produces two runners for the two execution lifecycles:
//!
//! - [`CommandRunner`] runs a command to completion, then parses its buffered
//!   stdout once (or captures nothing for void descriptions).
//! - [`StreamingRunner`] returns a lazy sequence of parsed records while the
//!   process is still running, for commands that produce output indefinitely.
//!
//! Cancellation is cooperative and externally driven: the runners observe a
//! [`tokio_util::sync::CancellationToken`] at fixed checkpoints and never
//! terminate the child process themselves.
//!
//! # Example
//!
//! ```rust,no_run
//! use execkit::{CommandSpec, ExecConfig, Executor};
//!
//! # async fn example() -> Result<(), execkit::ExecError> {
//! let executor = Executor::new(ExecConfig::new());
//!
//! let branch = executor
//!     .runner()
//!     .run_parsed(
//!         CommandSpec::new("git")
//!             .args(["rev-parse", "--abbrev-ref", "HEAD"])
//!             .parsed(|text, _strict| Ok(text.trim().to_string())),
//!     )
//!     .await?;
//! # let _ = branch;
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod cancel;
pub mod command_spec;
pub mod error;
pub mod exec;
pub mod lines;
pub mod shell;
pub mod spawner;

pub use accumulator::Accumulator;
pub use cancel::check_cancelled;
pub use command_spec::{
    ByteStream, CommandSource, CommandSpec, OutputStream, Parsed, Streamed,
};
pub use error::ExecError;
pub use exec::{CommandRunner, ExecConfig, Executor, StreamingRunner};
pub use lines::{split_lines, split_lines_parser};
pub use shell::ShellDialect;
pub use spawner::{Invocation, ProcessSpawner, ShellSpawner, SpawnOptions, StdoutSink};

// The token type is part of the public configuration surface.
pub use tokio_util::sync::CancellationToken;
