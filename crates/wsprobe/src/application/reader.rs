//! Reader: pulls inbound frames and prints them.
//!
//! Each iteration reads one frame (already bounded to 16 KiB by the
//! [`FrameSource`]), renders it with the [`Formatter`] and hands the result to
//! the transcript.  There is no buffering between iterations.
//!
//! Any read error ends the loop, including an orderly close by the peer: a
//! graceful close looks exactly like a failure here.  The one exception is a
//! read that fails *after* the session was cancelled, which is the expected
//! way for an in-flight read to unblock during shutdown and is reported as
//! [`ReaderStop::Cancelled`].

use tokio_util::sync::CancellationToken;
use tracing::debug;

use wsprobe_core::Formatter;

use crate::application::duplex::{FrameSource, ReadError};
use crate::application::transcript::Transcript;

/// Why the reader stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderStop {
    /// The session was cancelled (interrupt).
    Cancelled,
    /// The read path failed or the peer closed the connection.
    Failed(ReadError),
}

/// Reads and prints frames until cancellation or a read error.
pub async fn run_reader<S: FrameSource>(
    source: &mut S,
    formatter: Formatter,
    transcript: &dyn Transcript,
    cancel: &CancellationToken,
) -> ReaderStop {
    let mut frames = 0u64;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = source.next_frame() => Some(result),
        };

        match next {
            None => {
                debug!("reader cancelled after {frames} frame(s)");
                return ReaderStop::Cancelled;
            }
            Some(Ok(frame)) => {
                frames += 1;
                if frame.was_truncated() {
                    debug!(
                        "frame #{frames} truncated from {} to {} bytes",
                        frame.original_len(),
                        frame.len()
                    );
                }
                let rendered = formatter.render(frame.bytes());
                transcript.inbound(&rendered);
            }
            Some(Err(e)) if cancel.is_cancelled() => {
                debug!("read ended during shutdown: {e}");
                return ReaderStop::Cancelled;
            }
            Some(Err(e)) => return ReaderStop::Failed(e),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
