//! Domain layer for wsprobe.
//!
//! Pure configuration types: no sockets, no tasks, no terminal.  Everything
//! here can be built and checked before a single byte touches the network,
//! which is how configuration mistakes are reported without a partial
//! connection attempt.

pub mod config;

pub use config::{ConfigError, ProbeConfig, DEFAULT_ORIGIN, DEFAULT_TARGET};
