//! Line-oriented stream parsing
//!
//! Most streamed commands emit newline-delimited records; [`split_lines`]
//! reassembles arbitrary stdout chunks into complete lines so streaming
//! descriptions do not hand-roll the buffering. A trailing partial line at
//! end-of-stream is still yielded.

use futures::StreamExt;

use crate::command_spec::{ByteStream, CommandSpec, OutputStream, Streamed};
use crate::error::ExecError;

/// Turn a pass-through byte stream into a stream of lines.
///
/// Lines are split on `\n` with a trailing `\r` stripped, decoded lossily.
/// A forwarded spawner failure ends the stream with that failure after all
/// complete lines received before it.
pub fn split_lines(stream: ByteStream) -> OutputStream<String> {
    struct State {
        stream: ByteStream,
        buf: Vec<u8>,
        eof: bool,
        failed: bool,
    }

    let state = State {
        stream,
        buf: Vec::new(),
        eof: false,
        failed: false,
    };

    let lines = futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.failed {
                return None;
            }
            if let Some(pos) = st.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = st.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Some((Ok(String::from_utf8_lossy(&line).into_owned()), st));
            }
            if st.eof {
                if st.buf.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut st.buf);
                return Some((Ok(String::from_utf8_lossy(&line).into_owned()), st));
            }
            match st.stream.next().await {
                Some(Ok(chunk)) => st.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    st.failed = true;
                    return Some((Err(ExecError::from_stream_error(err)), st));
                }
                None => st.eof = true,
            }
        }
    });
    // Unfold panics if polled again after returning `None`; fuse it so an
    // exhausted stream keeps yielding `None` as callers expect.
    Box::pin(lines.fuse())
}

/// A streaming parse step that yields lines, for use with
/// [`CommandSpec::streamed`].
pub fn split_lines_parser()
-> impl FnOnce(ByteStream, bool) -> OutputStream<String> + Send + 'static {
    |stream, _strict| split_lines(stream)
}

impl Streamed<String> {
    /// A streaming description whose records are the command's output lines.
    #[must_use]
    pub fn lines(spec: CommandSpec) -> Self {
        spec.streamed(split_lines_parser())
    }
}
