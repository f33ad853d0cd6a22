//! The duplex connection contract.
//!
//! A connection is split once, right after the handshake, into an outbound
//! half ([`FrameSink`]) and an inbound half ([`FrameSource`]).
//!
//! # Contract
//!
//! - **Single concurrent reader, single concurrent writer.**  Each half is
//!   owned by exactly one task at a time; neither is shared or wrapped in a
//!   lock.
//! - **Independent directions.**  A pending `next_frame` never delays a
//!   `send_text` and vice versa.  Implementations must guarantee this without
//!   help from callers.
//! - **Closing is done through the sink**, by whoever holds it once the
//!   shutdown event has been observed.  A read that is in flight while the
//!   connection closes is expected to end with a [`ReadError`].

use async_trait::async_trait;
use thiserror::Error;

use wsprobe_core::InboundFrame;

/// Errors surfaced by [`FrameSource::next_frame`].
///
/// Every variant is fatal for the reader; no distinction is made between an
/// orderly close and a broken transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The peer sent a Close frame.
    #[error("connection closed by peer (code {code}){}", fmt_reason(.reason))]
    Closed { code: u16, reason: String },

    /// The stream ended without a Close frame.
    #[error("connection stream ended")]
    EndOfStream,

    /// The transport or framing layer reported an error.
    #[error("WebSocket read error: {0}")]
    Transport(String),
}

fn fmt_reason(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(": {reason}")
    }
}

/// Errors surfaced by [`FrameSink`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The connection is already closed.
    #[error("connection is closed")]
    Closed,

    /// The transport or framing layer reported an error.
    #[error("WebSocket write error: {0}")]
    Transport(String),
}

/// Outbound half of a duplex connection.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends `text` as one text frame, exactly as given.
    async fn send_text(&mut self, text: &str) -> Result<(), WriteError>;

    /// Starts an orderly close of the connection.
    async fn close(&mut self) -> Result<(), WriteError>;
}

/// Inbound half of a duplex connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next data frame (text or binary).
    ///
    /// Control frames are handled internally and never returned.  The payload
    /// is bounded to [`wsprobe_core::MAX_FRAME_LEN`] bytes.
    async fn next_frame(&mut self) -> Result<InboundFrame, ReadError>;
}
