//! # wsprobe-core
//!
//! Shared, I/O-free building blocks for the `wsprobe` WebSocket probing
//! client.
//!
//! # Architecture overview (for beginners)
//!
//! `wsprobe` opens one WebSocket connection, sends whatever the operator
//! types on standard input, and pretty-prints whatever the server sends back.
//! Everything in this crate is a pure data type or a pure function, so it can
//! be tested without a network:
//!
//! - **`frame`** – The two message shapes that cross the connection: the
//!   [`OutboundMessage`] the operator issues and the size-bounded
//!   [`InboundFrame`] the server delivers.
//!
//! - **`headers`** – The ordered [`HeaderSet`] built from repeatable
//!   `-H "Name: Value"` arguments and attached to the handshake request.
//!
//! - **`format`** – The [`Formatter`] that re-indents JSON payloads and
//!   optionally colourizes them for a terminal.

pub mod format;
pub mod frame;
pub mod headers;

// Re-export the most-used types at the crate root so callers can write
// `wsprobe_core::Formatter` instead of `wsprobe_core::format::Formatter`.
pub use format::Formatter;
pub use frame::{InboundFrame, OutboundMessage, MAX_FRAME_LEN};
pub use headers::{HeaderError, HeaderSet};
