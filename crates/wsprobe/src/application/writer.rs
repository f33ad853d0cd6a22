//! Writer: turns operator input into outbound frames.
//!
//! # Ordering
//!
//! 1. The initial command, if configured, is always sent first (sequence 0).
//! 2. Then each input line becomes exactly one message, in input order.
//!
//! Lines are sent verbatim; only the line terminator (`\n` or `\r\n`) is
//! removed.  Each message is echoed to the transcript once the write has
//! completed.  A line that is not valid UTF-8 cannot become a text frame: it
//! is skipped with a warning and the following lines are still sent.
//!
//! # Lifetime
//!
//! The writer stops when input ends, when the session is cancelled, or when a
//! write or an input read fails.  It never closes the connection itself: it
//! hands the sink back in its [`WriterReport`] so the session can decide.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wsprobe_core::OutboundMessage;

use crate::application::duplex::{FrameSink, WriteError};
use crate::application::transcript::Transcript;

/// Why the writer stopped.
#[derive(Debug)]
pub enum WriterStop {
    /// Input reached end-of-file.
    EndOfInput,
    /// The session's cancellation token fired.
    Cancelled,
    /// Sending a message failed; the connection is probably gone.
    WriteFailed(WriteError),
    /// Reading the input failed with an I/O error.
    InputFailed(String),
}

/// What the writer hands back when it stops.
#[derive(Debug)]
pub struct WriterReport<S> {
    /// The outbound half, returned unclosed.
    pub sink: S,
    /// Number of messages successfully sent.
    pub sent: u64,
    /// Why the writer stopped.
    pub stop: WriterStop,
}

/// Outcome of one loop iteration.
enum Step {
    Sent,
    Skipped,
    EndOfInput,
    InputFailed(String),
    WriteFailed(WriteError),
}

/// Runs the writer until input ends, cancellation, or a failure.
///
/// # Parameters
///
/// - `initial_command` – Optional first message; empty strings are skipped.
/// - `input`           – Line-oriented input, normally buffered stdin.
/// - `sink`            – Outbound half of the connection.
/// - `transcript`      – Receives a `>>` echo for every sent message.
/// - `cancel`          – Session cancellation token.
pub async fn run_writer<S, R>(
    initial_command: Option<String>,
    mut input: R,
    mut sink: S,
    transcript: Arc<dyn Transcript>,
    cancel: CancellationToken,
) -> WriterReport<S>
where
    S: FrameSink,
    R: AsyncBufRead + Unpin + Send,
{
    let mut sequence = 0u64;

    if let Some(command) = initial_command.filter(|c| !c.is_empty()) {
        let message = OutboundMessage::new(sequence, command);
        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = send_message(&mut sink, transcript.as_ref(), &message) => Some(result),
        };
        match sent {
            None => return report(sink, sequence, WriterStop::Cancelled),
            Some(Err(e)) => return report(sink, sequence, WriterStop::WriteFailed(e)),
            Some(Ok(())) => sequence += 1,
        }
    }

    let mut line = Vec::new();

    let stop = loop {
        // Reading the next line and sending it happen inside one branch so a
        // stalled peer cannot keep the writer alive past cancellation.
        let step = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            step = async {
                line.clear();
                match input.read_until(b'\n', &mut line).await {
                    Ok(0) => Step::EndOfInput,
                    Ok(_) => match String::from_utf8(strip_terminator(&line).to_vec()) {
                        Ok(text) => {
                            let message = OutboundMessage::new(sequence, text);
                            match send_message(&mut sink, transcript.as_ref(), &message).await {
                                Ok(()) => Step::Sent,
                                Err(e) => Step::WriteFailed(e),
                            }
                        }
                        Err(e) => {
                            warn!("skipping input line that is not UTF-8: {}", e.utf8_error());
                            Step::Skipped
                        }
                    },
                    Err(e) => Step::InputFailed(e.to_string()),
                }
            } => Some(step),
        };

        match step {
            None => break WriterStop::Cancelled,
            Some(Step::Sent) => sequence += 1,
            Some(Step::Skipped) => {}
            Some(Step::EndOfInput) => break WriterStop::EndOfInput,
            Some(Step::InputFailed(e)) => {
                warn!("failed to read input: {e}");
                break WriterStop::InputFailed(e);
            }
            Some(Step::WriteFailed(e)) => {
                warn!("failed to send message #{sequence}: {e}");
                break WriterStop::WriteFailed(e);
            }
        }
    };

    report(sink, sequence, stop)
}

/// Removes a trailing `\n` or `\r\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}

/// Sends one message and echoes it once the write completes.
async fn send_message<S: FrameSink>(
    sink: &mut S,
    transcript: &dyn Transcript,
    message: &OutboundMessage,
) -> Result<(), WriteError> {
    sink.send_text(&message.text).await?;
    debug!(
        "sent message #{} ({} bytes)",
        message.sequence,
        message.text.len()
    );
    transcript.outbound(&message.text);
    Ok(())
}

fn report<S>(sink: S, sent: u64, stop: WriterStop) -> WriterReport<S> {
    debug!("writer stopped after {sent} message(s): {stop:?}");
    WriterReport { sink, sent, stop }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
