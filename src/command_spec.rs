//! Command descriptions and their response kinds
//!
//! A [`CommandSpec`] names an executable and its raw arguments. The response
//! kind is tagged by construction: a bare `CommandSpec` produces no value,
//! [`Parsed`] adds a buffered parse step, and [`Streamed`] adds an incremental
//! stream parser. Each runner accepts only the kind it can handle, so there is
//! no runtime probing of description shapes.

use std::fmt;
use std::io;
use std::pin::Pin;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream};

use crate::error::ExecError;

/// Pass-through byte stream handed to a [`Streamed`] parse function.
///
/// Yields stdout chunks as the process produces them; a spawn failure or
/// non-zero exit arrives as the terminal `Err` item.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Vec<u8>>> + Send>>;

/// Lazy, single-consumption sequence of parsed results.
pub type OutputStream<T> = BoxStream<'static, Result<T, ExecError>>;

/// Buffered parse step: full stdout text plus the strictness flag.
pub type ParseFn<T> = Box<dyn Fn(&str, bool) -> anyhow::Result<T> + Send + Sync>;

/// Streaming parse step: consumes the pass-through byte stream without
/// blocking and returns the lazy result sequence.
pub type StreamParseFn<T> = Box<dyn FnOnce(ByteStream, bool) -> OutputStream<T> + Send>;

/// A logical command: executable name plus raw (unquoted) arguments.
///
/// Arguments are kept verbatim; shell quoting is applied once, by the
/// configured dialect, when the description is resolved into an invocation.
///
/// # Example
///
/// ```rust
/// use execkit::CommandSpec;
///
/// let cmd = CommandSpec::new("git")
///     .arg("log")
///     .args(["--oneline", "-n", "10"]);
///
/// assert_eq!(cmd.program, "git");
/// assert_eq!(cmd.args.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The executable name or path, passed through verbatim.
    pub program: String,
    /// Raw arguments, quoted later by the shell dialect.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a description for the given program with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single raw argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple raw arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Attach a buffered parse step, producing a [`Parsed`] description.
    #[must_use]
    pub fn parsed<T, F>(self, parse: F) -> Parsed<T>
    where
        F: Fn(&str, bool) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Parsed {
            spec: self,
            parse: Box::new(parse),
        }
    }

    /// Attach a streaming parse step, producing a [`Streamed`] description.
    #[must_use]
    pub fn streamed<T, F>(self, parse: F) -> Streamed<T>
    where
        F: FnOnce(ByteStream, bool) -> OutputStream<T> + Send + 'static,
    {
        Streamed {
            spec: self,
            parse: Box::new(parse),
        }
    }
}

/// A command description whose stdout is buffered to completion and parsed
/// once into a `T`.
pub struct Parsed<T> {
    pub(crate) spec: CommandSpec,
    pub(crate) parse: ParseFn<T>,
}

impl<T> fmt::Debug for Parsed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parsed").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// A command description whose stdout is parsed incrementally into a lazy
/// sequence of `T` while the process runs.
pub struct Streamed<T> {
    pub(crate) spec: CommandSpec,
    pub(crate) parse: StreamParseFn<T>,
}

impl<T> fmt::Debug for Streamed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streamed").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// How a command description is supplied to a runner: ready, deferred behind
/// a future, or produced on demand.
///
/// `From<C>` covers the common ready case, so runner calls take plain
/// descriptions directly.
pub enum CommandSource<C> {
    /// The description itself.
    Ready(C),
    /// A future that resolves to the description.
    Deferred(BoxFuture<'static, C>),
    /// A zero-argument producer of the description.
    Lazy(Box<dyn FnOnce() -> C + Send>),
}

impl<C> CommandSource<C> {
    /// Defer the description behind a future.
    #[must_use]
    pub fn deferred(fut: impl Future<Output = C> + Send + 'static) -> Self {
        Self::Deferred(Box::pin(fut))
    }

    /// Produce the description on demand.
    #[must_use]
    pub fn lazy(producer: impl FnOnce() -> C + Send + 'static) -> Self {
        Self::Lazy(Box::new(producer))
    }

    /// Resolve to the concrete description, awaiting if deferred.
    pub(crate) async fn resolve(self) -> C {
        match self {
            Self::Ready(cmd) => cmd,
            Self::Deferred(fut) => fut.await,
            Self::Lazy(producer) => producer(),
        }
    }
}

impl<C> From<C> for CommandSource<C> {
    fn from(cmd: C) -> Self {
        Self::Ready(cmd)
    }
}

impl<C> fmt::Debug for CommandSource<C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(cmd) => f.debug_tuple("Ready").field(cmd).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
