//! wsprobe library crate.
//!
//! An interactive WebSocket probing client: it opens one connection, sends
//! each line typed on standard input as a text frame, and prints every
//! inbound frame re-indented (and optionally colourized) when it is JSON.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! stdin ──▶ writer ──┐                      ┌──▶ reader ──▶ stdout
//!                    ▼                      │
//! [wsprobe]      FrameSink ══ WebSocket ══ FrameSource
//!   ├── domain/           ProbeConfig and its validation
//!   ├── application/      writer, reader, session, duplex + transcript traits
//!   └── infrastructure/
//!         ├── connection/ handshake + tokio-tungstenite halves
//!         ├── shutdown/   Ctrl+C trap posting the cancellation event
//!         ├── console/    stdout transcript
//!         └── mock/       in-memory doubles for tests
//! ```
//!
//! # Layer rules
//!
//! - `domain` performs no I/O.
//! - `application` depends on `domain` and `wsprobe-core`, and reaches the
//!   connection and terminal only through traits.
//! - `infrastructure` implements those traits with `tokio`,
//!   `tokio-tungstenite` and the standard streams.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: the concurrent session logic.
pub mod application;

/// Infrastructure layer: WebSocket connection, signals, terminal.
pub mod infrastructure;

/// Top-level error type.
pub mod error;

pub use error::ProbeError;
