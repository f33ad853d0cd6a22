//! Message types exchanged over the probe connection.
//!
//! # Frame size bound
//!
//! The probe reads every inbound message into a fixed 16 KiB window.  A
//! payload larger than [`MAX_FRAME_LEN`] is cut at exactly that many bytes and
//! the remainder is discarded.  Nothing is carried over into the next frame:
//! each [`InboundFrame`] is built from exactly one WebSocket message.

/// Maximum number of payload bytes kept from one inbound message (16 KiB).
pub const MAX_FRAME_LEN: usize = 16 * 1024;

/// A text payload issued by the operator, tagged with its issue order.
///
/// Sequence numbers start at 0 for the first message of a session and grow by
/// one for each message, so the initial command (when present) is always
/// sequence 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Position of this message in the session's outbound order.
    pub sequence: u64,
    /// The exact text to transmit.  Never trimmed or re-encoded.
    pub text: String,
}

impl OutboundMessage {
    /// Creates a new outbound message.
    pub fn new(sequence: u64, text: impl Into<String>) -> Self {
        Self {
            sequence,
            text: text.into(),
        }
    }
}

/// The payload of one inbound WebSocket message, bounded to [`MAX_FRAME_LEN`].
///
/// # Example
///
/// ```rust
/// use wsprobe_core::{InboundFrame, MAX_FRAME_LEN};
///
/// let frame = InboundFrame::from_payload(vec![b'x'; MAX_FRAME_LEN + 10]);
/// assert_eq!(frame.len(), MAX_FRAME_LEN);
/// assert!(frame.was_truncated());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    payload: Vec<u8>,
    /// Length of the payload as received, before truncation.
    original_len: usize,
}

impl InboundFrame {
    /// Builds a frame from a complete message payload, truncating it to
    /// [`MAX_FRAME_LEN`] bytes if necessary.
    pub fn from_payload(mut payload: Vec<u8>) -> Self {
        let original_len = payload.len();
        if original_len > MAX_FRAME_LEN {
            payload.truncate(MAX_FRAME_LEN);
            // Release the tail so a huge message does not pin its allocation.
            payload.shrink_to_fit();
        }
        Self {
            payload,
            original_len,
        }
    }

    /// Returns the (possibly truncated) payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the frame and returns its payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.payload
    }

    /// Number of payload bytes kept.  Never exceeds [`MAX_FRAME_LEN`].
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns `true` if the frame carries no payload bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Length of the payload as it arrived on the wire.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Returns `true` if bytes were dropped to respect [`MAX_FRAME_LEN`].
    pub fn was_truncated(&self) -> bool {
        self.original_len > self.payload.len()
    }
}
