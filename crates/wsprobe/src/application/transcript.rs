//! Where the session's visible output goes.
//!
//! The probe's standard output is a transcript of the conversation:
//!
//! ```text
//! >> {"op":"subscribe"}
//! << {
//!   "ok": true
//! }
//! ```
//!
//! The writer reports each outbound message, the reader each rendered inbound
//! frame, and the session the one-off `exiting` notice.  Implementations must
//! keep each call's output contiguous, since the writer and reader report from
//! different tasks.

/// Marker printed before every outbound message.
pub const OUTBOUND_MARKER: &str = ">>";

/// Marker printed before every inbound frame.
pub const INBOUND_MARKER: &str = "<<";

/// Sink for the user-visible session transcript.
pub trait Transcript: Send + Sync {
    /// Records a message that was just sent.
    fn outbound(&self, text: &str);

    /// Records a rendered inbound frame.  `rendered` may span several lines
    /// and may contain ANSI styling.
    fn inbound(&self, rendered: &[u8]);

    /// Records a status notice such as the shutdown message.
    fn notice(&self, text: &str);
}
