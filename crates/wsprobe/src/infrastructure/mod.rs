//! Infrastructure layer for wsprobe.
//!
//! Everything that touches the outside world lives here:
//!
//! - `connection` – WebSocket handshake and the tokio-tungstenite backed
//!   [`FrameSink`](crate::application::FrameSink) /
//!   [`FrameSource`](crate::application::FrameSource) halves.
//! - `shutdown`   – The Ctrl+C trap that posts the cancellation event.
//! - `console`    – The stdout [`Transcript`](crate::application::Transcript).
//! - `mock`       – In-memory doubles of all of the above for tests.

pub mod connection;
pub mod console;
pub mod mock;
pub mod shutdown;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use connection::{establish, ConnectError};
pub use console::ConsoleTranscript;
pub use shutdown::spawn_shutdown_trap;
