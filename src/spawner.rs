//! Process spawner adapter
//!
//! The boundary between the runners and the OS: a [`ProcessSpawner`] takes a
//! resolved [`Invocation`], opaque [`SpawnOptions`], and a destination for
//! stdout, and resolves when the process exits cleanly or fails with a spawn
//! or exit error. [`ShellSpawner`] is the default implementation, launching
//! the quoted command line through the dialect's shell.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tokio::sync::mpsc;
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::error::ExecError;
use crate::shell::ShellDialect;

const READ_CHUNK_BYTES: usize = 8192;
const STDERR_TAIL_BYTES: usize = 4096;

/// A resolved, executable invocation: program verbatim, arguments already
/// quoted for the dialect that will launch them.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The executable name or path, unquoted.
    pub program: String,
    /// Arguments after dialect quoting.
    pub args: Vec<String>,
    /// The dialect whose shell launches the command line.
    pub dialect: ShellDialect,
}

impl Invocation {
    /// The full command line handed to the shell.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Additional spawn options forwarded verbatim to the spawner.
#[derive(Debug, Clone, Default)]
pub struct SpawnOptions {
    /// Working directory for the child process.
    pub cwd: Option<PathBuf>,
    /// Environment overrides for the child process.
    pub env: HashMap<String, String>,
}

impl SpawnOptions {
    /// Options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Destination for the child's stdout.
///
/// Void invocations discard stdout, buffered invocations collect it into an
/// [`Accumulator`], streaming invocations forward chunks into the
/// pass-through channel.
pub enum StdoutSink<'a> {
    /// Stdout is not captured at all.
    Discard,
    /// Stdout is appended to the accumulator.
    Buffer(&'a mut Accumulator),
    /// Stdout chunks are forwarded into the pass-through stream.
    Channel(mpsc::Sender<io::Result<Vec<u8>>>),
}

impl StdoutSink<'_> {
    fn captures(&self) -> bool {
        !matches!(self, Self::Discard)
    }

    /// Deliver one chunk. Returns `false` once the destination is gone and
    /// forwarding should stop.
    pub(crate) async fn consume(&mut self, chunk: &[u8]) -> bool {
        match self {
            Self::Discard => true,
            Self::Buffer(acc) => {
                acc.write(chunk);
                true
            }
            Self::Channel(tx) => tx.send(Ok(chunk.to_vec())).await.is_ok(),
        }
    }
}

/// Spawns one process per call and drives it to completion.
///
/// Resolves on exit code 0 and fails on spawn errors or non-zero exit. The
/// default implementation is [`ShellSpawner`]; tests substitute their own via
/// [`crate::Executor::with_spawner`].
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Run the invocation to completion, delivering stdout to `stdout`.
    async fn run(
        &self,
        invocation: &Invocation,
        options: &SpawnOptions,
        stdout: StdoutSink<'_>,
    ) -> Result<(), ExecError>;
}

/// Default spawner: launches the command line through the dialect's shell
/// (`sh -c` or `cmd /C`) with stdout wired to the requested sink and stderr
/// drained into a bounded tail for diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSpawner;

impl ShellSpawner {
    /// Create the default spawner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for ShellSpawner {
    async fn run(
        &self,
        invocation: &Invocation,
        options: &SpawnOptions,
        mut stdout: StdoutSink<'_>,
    ) -> Result<(), ExecError> {
        let (shell, flag) = invocation.dialect.launcher();
        let line = invocation.command_line();
        debug!(shell, command = %line, "spawning command");

        let mut cmd = TokioCommand::new(shell);
        cmd.arg(flag)
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(if stdout.captures() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped());
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stderr_tail = Vec::new();
        let mut out_buf = vec![0u8; READ_CHUNK_BYTES];
        let mut err_buf = vec![0u8; READ_CHUNK_BYTES];

        loop {
            tokio::select! {
                read = read_some(&mut stdout_pipe, &mut out_buf), if stdout_pipe.is_some() => {
                    match read {
                        Ok(0) => stdout_pipe = None,
                        Ok(n) => {
                            if !stdout.consume(&out_buf[..n]).await {
                                // Consumer went away; close the pipe and let
                                // the child run to completion.
                                stdout_pipe = None;
                            }
                        }
                        Err(err) => return Err(ExecError::Io(err)),
                    }
                }
                read = read_some(&mut stderr_pipe, &mut err_buf), if stderr_pipe.is_some() => {
                    match read {
                        Ok(0) | Err(_) => stderr_pipe = None,
                        Ok(n) => push_tail(&mut stderr_tail, &err_buf[..n]),
                    }
                }
                else => break,
            }
        }

        let status = child.wait().await.map_err(ExecError::Io)?;
        debug!(code = ?status.code(), "command exited");

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::NonZeroExit {
                program: invocation.program.clone(),
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr_tail).trim().to_string(),
            })
        }
    }
}

async fn read_some<R>(pipe: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match pipe {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}

/// Keep only the last `STDERR_TAIL_BYTES` of stderr.
fn push_tail(tail: &mut Vec<u8>, chunk: &[u8]) {
    tail.extend_from_slice(chunk);
    if tail.len() > STDERR_TAIL_BYTES {
        let excess = tail.len() - STDERR_TAIL_BYTES;
        tail.drain(..excess);
    }
}
