//! In-memory test doubles for the connection and the transcript.
//!
//! [`memory_duplex`] returns the two connection halves plus a [`MemoryPeer`]
//! that plays the server: it sees every text frame the client sends and can
//! push payloads, a Close frame or a transport failure towards the client.
//!
//! Both directions are independent unbounded channels, so the double honours
//! the duplex contract (one reader, one writer, neither blocking the other)
//! and can be driven from concurrent tasks.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use wsprobe_core::InboundFrame;

use crate::application::duplex::{FrameSink, FrameSource, ReadError, WriteError};
use crate::application::transcript::Transcript;

/// Something the peer pushes towards the client.
#[derive(Debug)]
enum PeerEvent {
    Payload(Vec<u8>),
    Close { code: u16, reason: String },
    Fail(String),
}

/// Creates a connected in-memory sink, source and peer.
pub fn memory_duplex() -> (MemorySink, MemorySource, MemoryPeer) {
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));

    (
        MemorySink {
            tx: sent_tx,
            closed: Arc::clone(&closed),
        },
        MemorySource { rx: inbound_rx },
        MemoryPeer {
            sent: sent_rx,
            inbound: inbound_tx,
            closed,
        },
    )
}

/// Outbound half backed by a channel to the [`MemoryPeer`].
#[derive(Debug)]
pub struct MemorySink {
    tx: UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn send_text(&mut self, text: &str) -> Result<(), WriteError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WriteError::Closed);
        }
        self.tx
            .send(text.to_string())
            .map_err(|_| WriteError::Closed)
    }

    async fn close(&mut self) -> Result<(), WriteError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Inbound half fed by the [`MemoryPeer`].
#[derive(Debug)]
pub struct MemorySource {
    rx: UnboundedReceiver<PeerEvent>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn next_frame(&mut self) -> Result<InboundFrame, ReadError> {
        match self.rx.recv().await {
            Some(PeerEvent::Payload(bytes)) => Ok(InboundFrame::from_payload(bytes)),
            Some(PeerEvent::Close { code, reason }) => Err(ReadError::Closed { code, reason }),
            Some(PeerEvent::Fail(msg)) => Err(ReadError::Transport(msg)),
            None => Err(ReadError::EndOfStream),
        }
    }
}

/// The server side of an in-memory connection.
///
/// Dropping the peer ends the client's inbound stream and makes further
/// client writes fail with [`WriteError::Closed`].
#[derive(Debug)]
pub struct MemoryPeer {
    sent: UnboundedReceiver<String>,
    inbound: UnboundedSender<PeerEvent>,
    closed: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Queues a data frame for the client.
    pub fn deliver(&self, payload: Vec<u8>) {
        // The client may already have dropped its source; nothing to do then.
        let _ = self.inbound.send(PeerEvent::Payload(payload));
    }

    /// Queues a Close frame for the client.
    pub fn close(&self, code: u16, reason: &str) {
        let _ = self.inbound.send(PeerEvent::Close {
            code,
            reason: reason.to_string(),
        });
    }

    /// Queues a transport failure for the client.
    pub fn fail(&self, message: &str) {
        let _ = self.inbound.send(PeerEvent::Fail(message.to_string()));
    }

    /// Waits for the next text frame sent by the client.
    ///
    /// Returns `None` once the client's sink has been dropped and every frame
    /// has been received.
    pub async fn next_sent(&mut self) -> Option<String> {
        self.sent.recv().await
    }

    /// Returns every text frame sent so far without waiting.
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(text) = self.sent.try_recv() {
            out.push(text);
        }
        out
    }

    /// Returns `true` once the client has closed its sink.
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// One recorded transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Outbound(String),
    Inbound(Vec<u8>),
    Notice(String),
}

/// A [`Transcript`] that records entries in memory.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl MemoryTranscript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry, in the order it was recorded.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Recorded outbound messages.
    pub fn outbound_messages(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                TranscriptEntry::Outbound(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Recorded inbound renderings.
    pub fn inbound_renderings(&self) -> Vec<Vec<u8>> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                TranscriptEntry::Inbound(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    /// Recorded notices.
    pub fn notices(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                TranscriptEntry::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, entry: TranscriptEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
    }
}

impl Transcript for MemoryTranscript {
    fn outbound(&self, text: &str) {
        self.push(TranscriptEntry::Outbound(text.to_string()));
    }

    fn inbound(&self, rendered: &[u8]) {
        self.push(TranscriptEntry::Inbound(rendered.to_vec()));
    }

    fn notice(&self, text: &str) {
        self.push(TranscriptEntry::Notice(text.to_string()));
    }
}
