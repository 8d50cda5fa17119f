//! Append-only stdout buffer for buffered execution
//!
//! One [`Accumulator`] is allocated per buffered invocation that declares a
//! parse step, written to by the process spawner, and read back exactly once
//! the process has exited. Ownership guarantees release on every exit path.

use std::borrow::Cow;
use std::fmt;

/// An append-only byte buffer exposing its contents as text on demand.
#[derive(Debug, Default)]
pub struct Accumulator {
    buffer: Vec<u8>,
}

impl Accumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of bytes.
    pub fn write(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// The accumulated bytes decoded as text, lossy on invalid UTF-8.
    ///
    /// Idempotent: repeated calls return the same text for the same writes.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Number of bytes accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}
