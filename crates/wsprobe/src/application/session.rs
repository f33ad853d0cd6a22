//! Session: wires the writer, the reader and the shutdown event together.
//!
//! ```text
//!            ┌──────────────┐  cancel   ┌───────────────┐
//!  Ctrl+C ──▶│ shutdown trap│──────────▶│ CancellationTok│
//!            └──────────────┘           └──────┬────────┘
//!                                  observes    │    observes
//!                      ┌───────────────────────┴──────────────┐
//!                      ▼                                      ▼
//!   stdin ──▶ writer task ──▶ FrameSink        FrameSource ──▶ reader ──▶ stdout
//! ```
//!
//! The reader runs on the caller's task; the writer is spawned.  When the
//! reader stops the session decides what happens next:
//!
//! - **Cancelled** – print one `exiting` notice, wait for the writer to hand
//!   the sink back, close it best-effort and report
//!   [`SessionOutcome::Interrupted`].  Each of the two waits is bounded by
//!   [`CLOSE_GRACE`]: a peer that stopped reading can leave the writer or the
//!   Close frame stuck behind a full send buffer, and the interrupt must
//!   still end the session.
//! - **Failed** – abort the writer without draining anything and report
//!   [`SessionOutcome::ReadFailed`].
//!
//! The session never exits the process; `main.rs` maps the outcome to an exit
//! code.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufRead;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wsprobe_core::Formatter;

use crate::application::duplex::{FrameSink, FrameSource, ReadError};
use crate::application::reader::{run_reader, ReaderStop};
use crate::application::transcript::Transcript;
use crate::application::writer::{run_writer, WriterReport};

/// Notice printed once when the session ends because of an interrupt.
pub const EXIT_NOTICE: &str = "exiting";

/// Upper bound on each shutdown step: waiting for the writer, then flushing
/// the Close frame.
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Per-session settings derived from the probe configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Sent before any input line.
    pub initial_command: Option<String>,
    /// Renders inbound frames.
    pub formatter: Formatter,
}

impl From<&crate::domain::ProbeConfig> for SessionOptions {
    fn from(config: &crate::domain::ProbeConfig) -> Self {
        Self {
            initial_command: config.initial_command.clone(),
            formatter: Formatter::new(config.colour),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Ended by the shutdown event.
    Interrupted,
    /// Ended by a read error or a peer close.
    ReadFailed(ReadError),
}

/// Runs one probe session until it is interrupted or the read path fails.
///
/// # Parameters
///
/// - `sink` / `source` – The two halves of the connection.
/// - `input`           – Operator input, normally buffered stdin.
/// - `options`         – Initial command and formatter.
/// - `transcript`      – Receives the visible output.
/// - `cancel`          – Fired by the shutdown trap.
pub async fn run_session<K, S, R>(
    sink: K,
    mut source: S,
    input: R,
    options: SessionOptions,
    transcript: Arc<dyn Transcript>,
    cancel: CancellationToken,
) -> SessionOutcome
where
    K: FrameSink + 'static,
    S: FrameSource,
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let writer = tokio::spawn(run_writer(
        options.initial_command,
        input,
        sink,
        Arc::clone(&transcript),
        cancel.clone(),
    ));

    match run_reader(&mut source, options.formatter, transcript.as_ref(), &cancel).await {
        ReaderStop::Cancelled => {
            transcript.notice(EXIT_NOTICE);
            close_best_effort(writer).await;
            SessionOutcome::Interrupted
        }
        ReaderStop::Failed(e) => {
            writer.abort();
            SessionOutcome::ReadFailed(e)
        }
    }
}

/// Takes the sink back from the writer and closes it, giving up on either
/// step after [`CLOSE_GRACE`].
async fn close_best_effort<K: FrameSink>(mut writer: JoinHandle<WriterReport<K>>) {
    // The writer observes the same token, so it normally returns promptly
    // and hands back the sink whether or not input had already ended.
    let mut report = match timeout(CLOSE_GRACE, &mut writer).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            warn!("writer task ended abnormally: {e}");
            return;
        }
        Err(_) => {
            debug!("writer did not stop within {CLOSE_GRACE:?}; abandoning it");
            writer.abort();
            return;
        }
    };

    match timeout(CLOSE_GRACE, report.sink.close()).await {
        Ok(Ok(())) => debug!("connection closed"),
        Ok(Err(e)) => debug!("ignoring error while closing connection: {e}"),
        Err(_) => debug!("close did not complete within {CLOSE_GRACE:?}; giving up"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::duplex::WriteError;
    use crate::infrastructure::mock::{memory_duplex, MemoryTranscript};
    use async_trait::async_trait;
    use tokio::io::BufReader;

    /// A sink whose peer never drains anything: every send and close hangs.
    struct StalledSink;

    #[async_trait]
    impl FrameSink for StalledSink {
        async fn send_text(&mut self, _text: &str) -> Result<(), WriteError> {
            std::future::pending().await
        }

        async fn close(&mut self) -> Result<(), WriteError> {
            std::future::pending().await
        }
    }

    fn options(initial_command: Option<&str>) -> SessionOptions {
        SessionOptions {
            initial_command: initial_command.map(str::to_string),
            formatter: Formatter::new(false),
        }
    }

    #[tokio::test]
    async fn test_interrupt_prints_one_notice_and_closes_connection() {
        // Arrange: a writer waiting on input that never arrives and a reader
        // waiting on a peer that never sends.
        let (sink, source, peer) = memory_duplex();
        let (_keep_open, pending) = tokio::io::duplex(64);
        let log = Arc::new(MemoryTranscript::new());
        let cancel = CancellationToken::new();

        let session = tokio::spawn(run_session(
            sink,
            source,
            BufReader::new(pending),
            options(None),
            log.clone(),
            cancel.clone(),
        ));

        // Act: the interrupt is delivered several times.
        cancel.cancel();
        cancel.cancel();
        cancel.cancel();
        let outcome = session.await.unwrap();

        // Assert
        assert_eq!(outcome, SessionOutcome::Interrupted);
        assert_eq!(log.notices(), vec![EXIT_NOTICE]);
        assert!(peer.was_closed());
    }

    #[tokio::test]
    async fn test_interrupt_after_input_ended_still_closes_connection() {
        let (sink, source, mut peer) = memory_duplex();
        let log = Arc::new(MemoryTranscript::new());
        let cancel = CancellationToken::new();

        let session = tokio::spawn(run_session(
            sink,
            source,
            BufReader::new(&b"one\n"[..]),
            options(Some("init")),
            log.clone(),
            cancel.clone(),
        ));

        // Wait until both messages went out, then interrupt.
        assert_eq!(peer.next_sent().await.as_deref(), Some("init"));
        assert_eq!(peer.next_sent().await.as_deref(), Some("one"));
        cancel.cancel();

        assert_eq!(session.await.unwrap(), SessionOutcome::Interrupted);
        assert!(peer.was_closed());
        assert_eq!(log.outbound_messages(), vec!["init", "one"]);
    }

    #[tokio::test]
    async fn test_interrupt_finishes_even_when_the_close_never_completes() {
        // Arrange: the writer is stuck sending the initial command and the
        // close would hang too.
        let (_sink, source, _peer) = memory_duplex();
        let (_keep_open, pending) = tokio::io::duplex(64);
        let log = Arc::new(MemoryTranscript::new());
        let cancel = CancellationToken::new();

        let session = tokio::spawn(run_session(
            StalledSink,
            source,
            BufReader::new(pending),
            options(Some("init")),
            log.clone(),
            cancel.clone(),
        ));
        tokio::task::yield_now().await;

        // Act
        cancel.cancel();
        let outcome = timeout(CLOSE_GRACE * 4, session).await;

        // Assert
        let outcome = outcome.expect("session must end in bounded time").unwrap();
        assert_eq!(outcome, SessionOutcome::Interrupted);
        assert_eq!(log.notices(), vec![EXIT_NOTICE]);
        assert!(log.outbound_messages().is_empty());
    }

    #[tokio::test]
    async fn test_peer_close_ends_session_with_read_failure() {
        let (sink, source, peer) = memory_duplex();
        let (_keep_open, pending) = tokio::io::duplex(64);
        peer.deliver(b"[1,2]".to_vec());
        peer.close(1000, "bye");
        let log = Arc::new(MemoryTranscript::new());

        let outcome = run_session(
            sink,
            source,
            BufReader::new(pending),
            options(None),
            log.clone(),
            CancellationToken::new(),
        )
        .await;

        assert!(matches!(
            outcome,
            SessionOutcome::ReadFailed(ReadError::Closed { code: 1000, .. })
        ));
        assert_eq!(log.inbound_renderings(), vec![b"[\n  1,\n  2\n]".to_vec()]);
        assert!(log.notices().is_empty());
        // A failed read does not close the connection from our side.
        assert!(!peer.was_closed());
    }

    #[tokio::test]
    async fn test_session_options_follow_config() {
        let config = crate::domain::ProbeConfig {
            initial_command: Some("ping".to_string()),
            colour: false,
            ..crate::domain::ProbeConfig::default()
        };

        let opts = SessionOptions::from(&config);

        assert_eq!(opts.initial_command.as_deref(), Some("ping"));
        assert!(!opts.formatter.colour_enabled());
    }
}
