//! Buffered and streaming command runners
//!
//! An [`Executor`] holds the shared configuration (shell dialect,
//! cancellation token, strictness, spawn options) and produces the two
//! runners. A [`CommandRunner`] drives one process to completion and parses
//! its buffered output once; a [`StreamingRunner`] returns a lazy sequence
//! whose items are parsed while the process is still running. Both share the
//! same invocation resolution and cancellation-checkpoint protocol.

use std::io;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::accumulator::Accumulator;
use crate::cancel::check_cancelled;
use crate::command_spec::{CommandSource, CommandSpec, OutputStream, Parsed, Streamed};
use crate::error::ExecError;
use crate::shell::ShellDialect;
use crate::spawner::{Invocation, ProcessSpawner, ShellSpawner, SpawnOptions, StdoutSink};

/// Capacity of the pass-through channel between a streaming process and its
/// parser; bounds how far the producer can run ahead of a slow consumer.
const PASS_THROUGH_CAPACITY: usize = 16;

/// Shared configuration reused across every runner invocation an [`Executor`]
/// produces. Constructed once and immutable for the executor's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ExecConfig {
    /// Shell dialect used for quoting; platform default when `None`.
    pub dialect: Option<ShellDialect>,
    /// Externally owned cancellation token, read at checkpoints only.
    pub cancel: Option<CancellationToken>,
    /// Strictness flag forwarded to every parse step.
    pub strict: bool,
    /// Opaque spawn options forwarded verbatim to the spawner.
    pub spawn: SpawnOptions,
}

impl ExecConfig {
    /// Configuration with platform defaults and no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed shell dialect instead of the platform default.
    #[must_use]
    pub fn dialect(mut self, dialect: ShellDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Observe the given cancellation token at checkpoints.
    #[must_use]
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the strictness flag forwarded to parse steps.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the spawn options forwarded to the spawner.
    #[must_use]
    pub fn spawn(mut self, spawn: SpawnOptions) -> Self {
        self.spawn = spawn;
        self
    }
}

/// Derive the executable invocation for a description: program verbatim, each
/// argument quoted exactly once by the configured dialect.
fn resolve_invocation(spec: &CommandSpec, config: &ExecConfig) -> Invocation {
    let dialect = config.dialect.unwrap_or_else(ShellDialect::platform_default);
    Invocation {
        program: spec.program.clone(),
        args: spec.args.iter().map(|arg| dialect.quote(arg)).collect(),
        dialect,
    }
}

/// Factory for the two runners, holding the shared configuration and the
/// process spawner behind `Arc`s.
///
/// Construction has no side effects; all effects happen when a produced
/// runner is invoked. Repeated accessor calls yield independently usable
/// runners with identical behavior.
#[derive(Clone)]
pub struct Executor {
    config: Arc<ExecConfig>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl Executor {
    /// Executor backed by the default [`ShellSpawner`].
    #[must_use]
    pub fn new(config: ExecConfig) -> Self {
        Self::with_spawner(config, Arc::new(ShellSpawner::new()))
    }

    /// Executor backed by a caller-supplied spawner (test seam).
    #[must_use]
    pub fn with_spawner(config: ExecConfig, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self {
            config: Arc::new(config),
            spawner,
        }
    }

    /// Runner for void and buffered/parsed descriptions.
    #[must_use]
    pub fn runner(&self) -> CommandRunner {
        CommandRunner {
            config: Arc::clone(&self.config),
            spawner: Arc::clone(&self.spawner),
        }
    }

    /// Runner for streaming descriptions.
    #[must_use]
    pub fn streaming_runner(&self) -> StreamingRunner {
        StreamingRunner {
            config: Arc::clone(&self.config),
            spawner: Arc::clone(&self.spawner),
        }
    }
}

/// Runs one command to completion, optionally parsing its buffered stdout.
#[derive(Clone)]
pub struct CommandRunner {
    config: Arc<ExecConfig>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl CommandRunner {
    /// Execute a void description: run to completion, capture nothing.
    ///
    /// No stdout sink is allocated. Fails with [`ExecError::Cancelled`] if
    /// cancellation is observed before the spawn (no process is started) or
    /// after completion (the run is discarded).
    pub async fn run(
        &self,
        source: impl Into<CommandSource<CommandSpec>>,
    ) -> Result<(), ExecError> {
        let spec = source.into().resolve().await;
        let invocation = resolve_invocation(&spec, &self.config);
        let cancel = self.config.cancel.as_ref();

        check_cancelled(cancel)?;
        self.spawner
            .run(&invocation, &self.config.spawn, StdoutSink::Discard)
            .await?;
        check_cancelled(cancel)?;
        Ok(())
    }

    /// Execute a parsed description: run to completion, buffer stdout, apply
    /// the parse step once, and return its result.
    ///
    /// The accumulator lives only for this invocation and is released on
    /// every exit path. A completed process whose cancellation is observed
    /// before the parse step still surfaces as [`ExecError::Cancelled`] and
    /// the parse step is never invoked.
    pub async fn run_parsed<T>(
        &self,
        source: impl Into<CommandSource<Parsed<T>>>,
    ) -> Result<T, ExecError> {
        let Parsed { spec, parse } = source.into().resolve().await;
        let invocation = resolve_invocation(&spec, &self.config);
        let cancel = self.config.cancel.as_ref();

        check_cancelled(cancel)?;
        let mut sink = Accumulator::new();
        self.spawner
            .run(&invocation, &self.config.spawn, StdoutSink::Buffer(&mut sink))
            .await?;
        check_cancelled(cancel)?;

        let text = sink.text();
        check_cancelled(cancel)?;
        debug!(bytes = sink.len(), "parsing buffered command output");
        let value = parse(&text, self.config.strict).map_err(ExecError::Parse)?;
        check_cancelled(cancel)?;
        Ok(value)
    }
}

/// Runs one command that is expected to produce output indefinitely,
/// returning a lazy sequence of parsed results before the process exits.
#[derive(Clone)]
pub struct StreamingRunner {
    config: Arc<ExecConfig>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl StreamingRunner {
    /// Execute a streaming description.
    ///
    /// The returned sequence is single-consumption and finite: it ends at
    /// stdout end-of-stream on a clean exit, or with the spawner's failure as
    /// its terminal error. The process itself is driven by a detached task;
    /// this call does not wait for it to exit, so a spawn failure is
    /// delivered through the sequence rather than from this call.
    pub async fn run<T>(
        &self,
        source: impl Into<CommandSource<Streamed<T>>>,
    ) -> Result<OutputStream<T>, ExecError> {
        let Streamed { spec, parse } = source.into().resolve().await;
        let invocation = resolve_invocation(&spec, &self.config);

        check_cancelled(self.config.cancel.as_ref())?;

        let (tx, rx) = mpsc::channel::<io::Result<Vec<u8>>>(PASS_THROUGH_CAPACITY);
        // The parser gets the pass-through stream before the process starts;
        // this must return a sequence object without blocking.
        let output = parse(Box::pin(ReceiverStream::new(rx)), self.config.strict);

        let spawner = Arc::clone(&self.spawner);
        let options = self.config.spawn.clone();
        tokio::spawn(async move {
            if let Err(err) = spawner
                .run(&invocation, &options, StdoutSink::Channel(tx.clone()))
                .await
            {
                warn!(error = %err, "streamed command failed; forwarding into stream");
                // Nobody awaits this task; the stream is the only channel
                // back to the consumer. A send failure means the consumer is
                // already gone.
                let _ = tx.send(Err(io::Error::other(err))).await;
            }
        });

        Ok(output)
    }
}
