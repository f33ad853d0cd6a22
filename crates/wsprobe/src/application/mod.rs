//! Application layer for wsprobe.
//!
//! The application layer coordinates the three independently paced
//! activities that share one connection:
//!
//! - the **writer**, driven by standard input,
//! - the **reader**, driven by the network,
//! - the **session**, which starts both and reacts to the shutdown event.
//!
//! It only talks to the connection through the [`FrameSink`] / [`FrameSource`]
//! traits and to the terminal through [`Transcript`], so every piece can be
//! tested with the in-memory doubles in `infrastructure::mock`.

pub mod duplex;
pub mod reader;
pub mod session;
pub mod transcript;
pub mod writer;

pub use duplex::{FrameSink, FrameSource, ReadError, WriteError};
pub use reader::{run_reader, ReaderStop};
pub use session::{run_session, SessionOptions, SessionOutcome, CLOSE_GRACE};
pub use transcript::Transcript;
pub use writer::{run_writer, WriterReport, WriterStop};
